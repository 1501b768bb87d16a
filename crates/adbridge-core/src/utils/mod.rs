//! Utility functions

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Conservative email check: local part, `@`, dotted domain with a TLD.
pub fn is_correct_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && EMAIL_RE.is_match(email)
}

/// Account name without any `@domain` suffix
pub fn strip_domain(user_name: &str) -> &str {
    match user_name.split_once('@') {
        Some((local, _)) => local,
        None => user_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rejects() {
        assert!(!is_correct_email(""));
        assert!(!is_correct_email("   "));
        assert!(!is_correct_email("a@b"));
        assert!(!is_correct_email("no-at-sign.com"));
        assert!(!is_correct_email("a@@b.com"));
        assert!(!is_correct_email("a b@c.com"));
    }

    #[test]
    fn test_email_accepts() {
        assert!(is_correct_email("a@b.co"));
        assert!(is_correct_email("a.b@c-d.com"));
        assert!(is_correct_email("jane.doe+ad@mail.corp.com"));
    }

    #[test]
    fn test_strip_domain() {
        assert_eq!(strip_domain("jdoe@corp.com"), "jdoe");
        assert_eq!(strip_domain("jdoe"), "jdoe");
        assert_eq!(strip_domain(""), "");
    }
}
