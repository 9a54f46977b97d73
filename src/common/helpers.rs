// Helper functions for safe logging and request building

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// use nightlife_client::common::safe_email_log;
/// let masked = safe_email_log("user@example.com");
/// assert_eq!(masked, "u***@example.com");
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            let first: String = parts[0].chars().take(1).collect();
            format!("{}***@{}", first, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Joins a base URL and an API path without doubling slashes
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Percent-encodes a single path segment (ids coming from user selections)
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("alice@club.io"), "a***@club.io");
        assert_eq!(safe_email_log("nope"), "***@***.***");
        assert_eq!(safe_email_log("a@b"), "***@***.***");
    }

    #[test]
    fn test_join_url_trims_slashes() {
        assert_eq!(
            join_url("http://localhost:8080/", "/api/employees"),
            "http://localhost:8080/api/employees"
        );
        assert_eq!(join_url("http://x", "api"), "http://x/api");
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
    }
}
