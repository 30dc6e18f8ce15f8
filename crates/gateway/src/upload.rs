//! File upload ingestion: store the bytes, then record the filename as
//! a file-reference chat message in the target room.

use std::path::Path;

use axum::{
    body::Bytes,
    extract::{Multipart, State},
};
use tracing::info;

use parlor_bot::CompletionBackend;

use crate::error::GatewayError;
use crate::state::GatewayState;

/// Handler for `POST /upload`. Expects a multipart form with a `file`
/// field and optional `room` and `username` fields.
pub async fn upload_file<B: CompletionBackend>(
    State(state): State<GatewayState<B>>,
    mut multipart: Multipart,
) -> Result<&'static str, GatewayError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut room: Option<String> = None;
    let mut username: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                if filename.is_empty() {
                    return Err(GatewayError::EmptyFilename);
                }
                let bytes = field.bytes().await?;
                file = Some((filename, bytes));
            }
            Some("room") => room = Some(field.text().await?),
            Some("username") => username = Some(field.text().await?),
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or(GatewayError::MissingFilePart)?;
    let filename = sanitize_filename(&filename).ok_or(GatewayError::InvalidFilename)?;

    tokio::fs::create_dir_all(&state.upload_dir).await?;
    let path = state.upload_dir.join(&filename);
    // A duplicate filename silently overwrites the stored file.
    tokio::fs::write(&path, &bytes).await?;
    info!(filename, size = bytes.len(), "upload stored");

    state.chat.record_file_message(room, username, &filename).await;

    Ok("File uploaded successfully")
}

/// Reduce a client-supplied filename to a safe basename: path
/// components are stripped, whitespace becomes underscores, and only
/// ASCII alphanumerics plus `.`, `_`, `-` survive. Returns `None` when
/// nothing safe remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = Path::new(raw).file_name()?.to_str()?;

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(sanitize_filename("report.pdf"), Some("report.pdf".to_string()));
        assert_eq!(sanitize_filename("a_b-c.1.txt"), Some("a_b-c.1.txt".to_string()));
    }

    #[test]
    fn test_path_components_are_stripped() {
        assert_eq!(
            sanitize_filename("../../etc/passwd"),
            Some("passwd".to_string())
        );
        assert_eq!(
            sanitize_filename("/var/log/syslog"),
            Some("syslog".to_string())
        );
        assert_eq!(
            sanitize_filename("..\\..\\boot.ini"),
            Some("boot.ini".to_string())
        );
    }

    #[test]
    fn test_whitespace_becomes_underscores() {
        assert_eq!(
            sanitize_filename("my summer photo.jpg"),
            Some("my_summer_photo.jpg".to_string())
        );
    }

    #[test]
    fn test_hostile_characters_are_dropped() {
        assert_eq!(
            sanitize_filename("we;rd$(name)!.sh"),
            Some("werdname.sh".to_string())
        );
    }

    #[test]
    fn test_dot_only_names_are_rejected() {
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename(""), None);
    }

    #[test]
    fn test_leading_dots_are_trimmed() {
        assert_eq!(sanitize_filename(".env"), Some("env".to_string()));
    }
}
