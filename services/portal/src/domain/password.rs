//! Password policy applied at signup.
//!
//! Every validator runs and all failures are reported together, in this
//! order: similarity to the account's username and email, the bundled
//! common-password list, all-digit passwords, then the complexity rules.
//! The complexity rules stop at their first failure.

use std::fmt;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Characters that satisfy the special-character rule.
pub const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// A password at or above this similarity to a user attribute is rejected.
pub const MAX_SIMILARITY: f64 = 0.7;

/// Lower-cased, one per line.
const COMMON_PASSWORDS: &str = include_str!("common-passwords.txt");

/// Account attribute a password is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAttribute {
    Username,
    Email,
}

impl fmt::Display for UserAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => f.write_str("username"),
            Self::Email => f.write_str("email address"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    TooSimilar(UserAttribute),
    TooCommon,
    EntirelyNumeric,
    MinLength,
    Uppercase,
    Digit,
    Special,
}

impl fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSimilar(attr) => write!(f, "The password is too similar to the {attr}."),
            Self::TooCommon => f.write_str("This password is too common."),
            Self::EntirelyNumeric => f.write_str("This password is entirely numeric."),
            Self::MinLength => write!(
                f,
                "Password must contain at least {MIN_PASSWORD_LEN} characters"
            ),
            Self::Uppercase => f.write_str("Password must contain at least one uppercase character"),
            Self::Digit => f.write_str("Password must contain at least one digit"),
            Self::Special => f.write_str("Password must contain at least one special character"),
        }
    }
}

/// Every rule a password failed, in reporting order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordErrors(pub Vec<PasswordRule>);

impl PasswordErrors {
    pub fn rules(&self) -> &[PasswordRule] {
        &self.0
    }

    pub fn contains(&self, rule: PasswordRule) -> bool {
        self.0.contains(&rule)
    }
}

impl fmt::Display for PasswordErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

pub fn validate_password(
    password: &str,
    username: &str,
    email: &str,
) -> Result<(), PasswordErrors> {
    let mut failed = Vec::new();

    for (attr, value) in [
        (UserAttribute::Username, username),
        (UserAttribute::Email, email),
    ] {
        if too_similar(password, value) {
            failed.push(PasswordRule::TooSimilar(attr));
        }
    }
    if is_common(password) {
        failed.push(PasswordRule::TooCommon);
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        failed.push(PasswordRule::EntirelyNumeric);
    }
    if let Some(rule) = complexity(password) {
        failed.push(rule);
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(PasswordErrors(failed))
    }
}

fn complexity(password: &str) -> Option<PasswordRule> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some(PasswordRule::MinLength);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Some(PasswordRule::Uppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some(PasswordRule::Digit);
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Some(PasswordRule::Special);
    }
    None
}

fn is_common(password: &str) -> bool {
    let candidate = password.trim().to_lowercase();
    COMMON_PASSWORDS.lines().any(|line| line == candidate)
}

/// The attribute is compared whole and split on non-word characters, so
/// `alice.smith@example.com` also checks `alice`, `smith`, `example`, `com`.
fn too_similar(password: &str, value: &str) -> bool {
    let password = password.to_lowercase();
    let value = value.to_lowercase();
    if value.is_empty() {
        return false;
    }
    std::iter::once(value.as_str())
        .chain(value.split(|c: char| !(c.is_alphanumeric() || c == '_')))
        .filter(|part| !part.is_empty())
        .any(|part| similarity(&password, part) >= MAX_SIMILARITY)
}

/// Upper bound on the matching-blocks ratio: shared characters counted as a
/// multiset, `2 * shared / (len(a) + len(b))`.
fn similarity(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    let mut pool: Vec<char> = b.chars().collect();
    let mut shared = 0usize;
    for c in a.chars() {
        if let Some(pos) = pool.iter().position(|&p| p == c) {
            pool.swap_remove(pos);
            shared += 1;
        }
    }
    (2 * shared) as f64 / total as f64
}
