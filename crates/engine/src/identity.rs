//! Contact identity normalization.
//!
//! Emails and phones are normalized before any comparison so that
//! "+60 12-345 6789" and "012-345 6789" dedup against each other.

use serde::Serialize;

/// Normalized contact identity for one record.
///
/// Either component may be empty; a fully empty key matches nothing and
/// never causes a dedup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityKey {
    pub email: String,
    pub phone: String,
}

impl IdentityKey {
    pub fn new(email_raw: &str, phone_raw: &str) -> Self {
        IdentityKey {
            email: normalize_email(email_raw),
            phone: normalize_phone(phone_raw),
        }
    }

    /// True when the record carries no usable contact identity.
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.phone.is_empty()
    }
}

/// Trim and lowercase. Empty stays empty.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize a phone number to Malaysian international digit form.
///
/// Strips every non-digit, then: a leading "0" is replaced by a "60"
/// prefix, an existing "60" prefix is kept, and any other run of at
/// least 8 digits gets "60" prepended. Shorter runs come back as bare
/// digits; empty stays empty.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return digits;
    }
    if let Some(rest) = digits.strip_prefix('0') {
        return format!("60{rest}");
    }
    if digits.starts_with("60") {
        return digits;
    }
    if digits.len() >= 8 {
        return format!("60{digits}");
    }
    digits
}
