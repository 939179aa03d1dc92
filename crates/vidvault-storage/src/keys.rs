//! Storage name generation.
//!
//! Name format: `{unix_millis}-{sequence}-{sanitized filename}`. The per-process
//! sequence keeps two uploads of the same filename in the same millisecond apart.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

const MAX_FILENAME_LENGTH: usize = 200;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Sanitize an uploaded filename so it can be embedded in a storage name.
///
/// Path components are dropped and every character outside `[A-Za-z0-9._-]` becomes
/// `_`. Names containing `..` collapse to `invalid_filename`; names shorter than
/// three characters become `file`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    if base.contains("..") {
        return "invalid_filename".to_string();
    }

    let sanitized: String = base
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() || sanitized.len() < 3 {
        "file".to_string()
    } else {
        sanitized
    }
}

/// Generate a fresh storage name for `original_filename`.
pub fn generate_storage_name(original_filename: &str) -> String {
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        sequence,
        sanitize_filename(original_filename)
    )
}

/// Check that `storage_name` is a single path segment.
pub fn is_valid_storage_name(storage_name: &str) -> bool {
    !storage_name.is_empty()
        && !storage_name.contains("..")
        && !storage_name.contains('/')
        && !storage_name.contains('\\')
}
