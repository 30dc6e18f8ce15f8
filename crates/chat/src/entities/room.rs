use std::collections::HashSet;

use crate::types::ConnectionId;

/// A named broadcast scope. The public room carries no password; every
/// other room stores the opaque secret chosen at creation, immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct Room {
    name: String,
    password: Option<String>,
    members: HashSet<ConnectionId>,
}

impl Room {
    /// The reserved, always-existing public room.
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: None,
            members: HashSet::new(),
        }
    }

    /// A password-gated room.
    pub fn with_password(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: Some(password.into()),
            members: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_public(&self) -> bool {
        self.password.is_none()
    }

    /// Whether `password` unlocks this room. The public room accepts
    /// anything.
    pub fn accepts(&self, password: &str) -> bool {
        match &self.password {
            Some(secret) => secret == password,
            None => true,
        }
    }

    pub fn insert_member(&mut self, conn: ConnectionId) {
        self.members.insert(conn);
    }

    pub fn remove_member(&mut self, conn: ConnectionId) {
        self.members.remove(&conn);
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.members.contains(&conn)
    }

    pub fn members(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_public_room_accepts_any_password() {
        let room = Room::public("public");
        assert!(room.is_public());
        assert!(room.accepts(""));
        assert!(room.accepts("whatever"));
    }

    #[test]
    fn test_gated_room_checks_secret() {
        let room = Room::with_password("ops", "hunter2");
        assert!(!room.is_public());
        assert!(room.accepts("hunter2"));
        assert!(!room.accepts(""));
        assert!(!room.accepts("Hunter2"));
    }

    #[test]
    fn test_membership() {
        let mut room = Room::with_password("ops", "s");
        let conn = Uuid::new_v4();

        assert!(!room.contains(conn));
        room.insert_member(conn);
        assert!(room.contains(conn));
        room.remove_member(conn);
        assert!(!room.contains(conn));
    }
}
