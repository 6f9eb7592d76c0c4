//! Mobile number normalization.
//!
//! Users type local Syrian numbers in whatever shape they like
//! (`0912 345 678`, `+963-912-345678`, `963912345678`). The backend only ever
//! sees canonical forms derived from the last nine digits:
//!
//! - E.164: `+963` + suffix
//! - Local-DB (profiles.mobile_number): `0` + suffix
//! - synthetic auth email: `sy963<suffix>@<domain>`
//!
//! The suffix must start with `9`; anything else is rejected. That is a
//! country policy, not a parsing limitation.

use std::fmt;

/// Country calling code prepended to the suffix.
pub const COUNTRY_CODE: &str = "963";

/// Domain of the synthetic email used as the auth identifier.
pub const DEFAULT_EMAIL_DOMAIN: &str = "email.com";

const SUFFIX_LEN: usize = 9;
const EMAIL_PREFIX: &str = "sy";

/// A validated mobile number, stored as its nine-digit suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MobileNumber {
    suffix: String,
}

impl MobileNumber {
    /// Normalize raw user input. Returns `None` when fewer than nine digits
    /// remain or the last nine do not start with `9`.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() < SUFFIX_LEN {
            return None;
        }

        let suffix = &digits[digits.len() - SUFFIX_LEN..];
        if !suffix.starts_with('9') {
            return None;
        }

        Some(Self {
            suffix: suffix.to_string(),
        })
    }

    /// Recover the number from a synthetic auth email such as
    /// `sy963912345678@email.com`.
    pub fn from_synthetic_email(email: &str, domain: &str) -> Option<Self> {
        let (local, host) = email.split_once('@')?;
        if !host.eq_ignore_ascii_case(domain) {
            return None;
        }
        let digits = local.strip_prefix(EMAIL_PREFIX)?.strip_prefix(COUNTRY_CODE)?;
        if digits.len() != SUFFIX_LEN || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Self::parse(digits)
    }

    /// The nine-digit suffix, e.g. `912345678`.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// `+963912345678`
    pub fn e164(&self) -> String {
        format!("+{COUNTRY_CODE}{}", self.suffix)
    }

    /// `0912345678`, the shape stored in `profiles.mobile_number`.
    pub fn local_db(&self) -> String {
        format!("0{}", self.suffix)
    }

    /// `sy963912345678@<domain>`, the email the auth backend knows the user by.
    pub fn synthetic_email(&self, domain: &str) -> String {
        let e164 = self.e164();
        format!("{EMAIL_PREFIX}{}@{domain}", &e164[1..])
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.local_db())
    }
}

/// Digits of `raw`, keeping at most the last nine.
///
/// Used for the offline credential comparison, which skips the
/// leading-`9` rule so a cached number always matches itself.
pub fn last_nine_digits(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    let start = digits.len().saturating_sub(SUFFIX_LEN);
    digits[start..].iter().collect()
}
