// src/validation.rs

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,20}$").unwrap());

static LETTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]").unwrap());

static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

/// Checks basic email syntax: local part, '@', domain, and a TLD of at
/// least two letters.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Checks username syntax: 3 to 20 characters, letters, digits, and
/// underscores only.
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

/// Applies the password policy. Checks run in a fixed order and the first
/// failure wins, so the caller always gets a single actionable message.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long");
    }
    if !LETTER_RE.is_match(password) {
        return Err("Password must contain at least one letter");
    }
    if !DIGIT_RE.is_match(password) {
        return Err("Password must contain at least one number");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normal_emails() {
        assert!(is_valid_email("admin@blog.com"));
        assert!(is_valid_email("user.name+tag@sub.example.org"));
        assert!(is_valid_email("a@b.co"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("missing@tld"));
        // Single-letter TLD.
        assert!(!is_valid_email("a@b.c"));
        // Empty domain before the TLD dot.
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("spaced name@example.com"));
        assert!(!is_valid_email("user@example.com extra"));
    }

    #[test]
    fn email_allows_consecutive_dots_in_domain() {
        // The pattern is a syntax gate, not a DNS check.
        assert!(is_valid_email("a@b..com"));
    }

    #[test]
    fn accepts_valid_usernames() {
        assert!(is_valid_username("abc"));
        assert!(is_valid_username("user_name123"));
        assert!(is_valid_username("A2345678901234567890")); // exactly 20
    }

    #[test]
    fn rejects_invalid_usernames() {
        assert!(!is_valid_username("ab")); // too short
        assert!(!is_valid_username("a23456789012345678901")); // 21 chars
        assert!(!is_valid_username("user-name"));
        assert!(!is_valid_username("user name"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("héllo"));
    }

    #[test]
    fn password_length_checked_first() {
        assert_eq!(
            validate_password("ab1"),
            Err("Password must be at least 6 characters long")
        );
        // Short and missing a digit: the length message still wins.
        assert_eq!(
            validate_password("abcde"),
            Err("Password must be at least 6 characters long")
        );
    }

    #[test]
    fn password_requires_letter_and_digit() {
        assert_eq!(
            validate_password("123456"),
            Err("Password must contain at least one letter")
        );
        assert_eq!(
            validate_password("abcdef"),
            Err("Password must contain at least one number")
        );
    }

    #[test]
    fn password_accepts_mixed() {
        assert_eq!(validate_password("abc123"), Ok(()));
        assert_eq!(validate_password("admin123"), Ok(()));
    }
}
