//! Room registry: tracks room existence, credentials, and membership.

use std::collections::HashMap;

use crate::entities::Room;
use crate::types::{ChatResult, ConnectionId, RoomError};

/// Name of the reserved, always-existing, passwordless room.
pub const PUBLIC_ROOM: &str = "public";

/// Registry of rooms for the process lifetime. Rooms are never deleted
/// and passwords are immutable once set.
///
/// A connection belongs to the public room from connect to disconnect,
/// plus at most one non-public room; joining or creating another room
/// leaves the previous one.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        let mut rooms = HashMap::new();
        rooms.insert(PUBLIC_ROOM.to_string(), Room::public(PUBLIC_ROOM));
        Self { rooms }
    }

    /// Auto-join a fresh connection to the public room.
    pub fn connect(&mut self, conn: ConnectionId) {
        if let Some(public) = self.rooms.get_mut(PUBLIC_ROOM) {
            public.insert_member(conn);
        }
    }

    /// Drop the connection from every room.
    pub fn disconnect(&mut self, conn: ConnectionId) {
        for room in self.rooms.values_mut() {
            room.remove_member(conn);
        }
    }

    /// Register a new room and join the creating connection to it.
    pub fn create(&mut self, conn: ConnectionId, name: &str, password: &str) -> ChatResult<()> {
        if name == PUBLIC_ROOM || self.rooms.contains_key(name) {
            return Err(RoomError::already_exists(name));
        }

        self.leave_private_rooms(conn);

        let mut room = Room::with_password(name, password);
        room.insert_member(conn);
        self.rooms.insert(name.to_string(), room);
        Ok(())
    }

    /// Join an existing room. Failure never mutates membership.
    pub fn join(&mut self, conn: ConnectionId, name: &str, password: &str) -> ChatResult<()> {
        let accepted = match self.rooms.get(name) {
            Some(room) => room.accepts(password),
            None => return Err(RoomError::not_found(name)),
        };
        if !accepted {
            return Err(RoomError::wrong_password(name));
        }

        self.leave_private_rooms(conn);

        if let Some(room) = self.rooms.get_mut(name) {
            room.insert_member(conn);
        }
        Ok(())
    }

    /// Active members of `name`; empty for unknown rooms.
    pub fn members(&self, name: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(name)
            .map(|room| room.members().collect())
            .unwrap_or_default()
    }

    pub fn is_member(&self, name: &str, conn: ConnectionId) -> bool {
        self.rooms
            .get(name)
            .map(|room| room.contains(conn))
            .unwrap_or(false)
    }

    fn leave_private_rooms(&mut self, conn: ConnectionId) {
        for room in self.rooms.values_mut() {
            if !room.is_public() {
                room.remove_member(conn);
            }
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
