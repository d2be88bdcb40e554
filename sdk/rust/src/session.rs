//! Session directory resolution
//!
//! A session token maps to `<root>/<token>`. Calls that carry no usable token
//! are grouped by UTC calendar day instead of being dropped.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Resolve the session directory for `token` at the current time
pub fn resolve(root: &Path, token: Option<&str>) -> PathBuf {
    resolve_at(root, token, Utc::now())
}

/// Resolve the session directory for `token` at `now`
pub fn resolve_at(root: &Path, token: Option<&str>, now: DateTime<Utc>) -> PathBuf {
    match token.and_then(session_component) {
        Some(name) => root.join(name),
        None => root.join(date_key(now)),
    }
}

/// `YYYY-MM-DD` in UTC
pub fn date_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// The token as a single path component, or `None` when it cannot name a
/// session (blank, `.` or `..`).
fn session_component(token: &str) -> Option<String> {
    if token.trim().is_empty() {
        return None;
    }

    let name: String = token
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();

    match name.as_str() {
        "." | ".." => None,
        _ => Some(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_token_maps_to_its_directory() {
        let root = Path::new("/logs");
        assert_eq!(
            resolve_at(root, Some("ses_42"), fixed_now()),
            PathBuf::from("/logs/ses_42")
        );
    }

    #[test]
    fn test_same_token_same_directory() {
        let root = Path::new("/logs");
        let first = resolve(root, Some("ses_abc"));
        let second = resolve(root, Some("ses_abc"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_absent_token_uses_utc_date() {
        let root = Path::new("/logs");
        assert_eq!(
            resolve_at(root, None, fixed_now()),
            PathBuf::from("/logs/2024-01-01")
        );
    }

    #[test]
    fn test_blank_token_uses_utc_date() {
        let root = Path::new("/logs");
        assert_eq!(
            resolve_at(root, Some("   "), fixed_now()),
            PathBuf::from("/logs/2024-01-01")
        );
        assert_eq!(
            resolve_at(root, Some(""), fixed_now()),
            PathBuf::from("/logs/2024-01-01")
        );
    }

    #[test]
    fn test_resolve_uses_current_date_for_missing_token() {
        let root = Path::new("/logs");
        let before = date_key(Utc::now());
        let dir = resolve(root, None);
        let after = date_key(Utc::now());
        let name = dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(name == before || name == after);
    }

    #[test]
    fn test_separators_stay_inside_root() {
        let root = Path::new("/logs");
        assert_eq!(
            resolve_at(root, Some("../etc"), fixed_now()),
            PathBuf::from("/logs/.._etc")
        );
        assert_eq!(
            resolve_at(root, Some("/abs"), fixed_now()),
            PathBuf::from("/logs/_abs")
        );
    }

    #[test]
    fn test_dot_tokens_fall_back_to_date() {
        let root = Path::new("/logs");
        assert_eq!(
            resolve_at(root, Some(".."), fixed_now()),
            PathBuf::from("/logs/2024-01-01")
        );
        assert_eq!(
            resolve_at(root, Some("."), fixed_now()),
            PathBuf::from("/logs/2024-01-01")
        );
    }

    #[test]
    fn test_date_key_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 23, 59, 59).unwrap();
        assert_eq!(date_key(now), "2025-03-09");
    }
}
