//! Masking helpers for credentials and bank account numbers.

/// Number of leading characters of a secret that remain visible in masked hints.
pub const SECRET_VISIBLE_CHARS: usize = 8;

/// Number of trailing digits of an account or routing number kept when masking.
pub const ACCOUNT_VISIBLE_DIGITS: usize = 4;

const ACCOUNT_MASK: &str = "••••";

/// Masks a secret for logs and error messages.
///
/// Keeps the first [`SECRET_VISIBLE_CHARS`] characters followed by `...`. Secrets too
/// short to hide anything after that prefix reveal at most half of their characters.
///
/// # Example
/// ```
/// use empire::server::util::mask::mask_secret;
///
/// assert_eq!(mask_secret("secret-token:abc123456789"), "secret-t...");
/// ```
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    let visible = if len > SECRET_VISIBLE_CHARS * 2 {
        SECRET_VISIBLE_CHARS
    } else {
        (len / 2).min(SECRET_VISIBLE_CHARS)
    };

    let prefix: String = secret.chars().take(visible).collect();
    format!("{prefix}...")
}

/// Masks a bank account or routing number down to its last four digits.
pub fn mask_account_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if digits.len() <= ACCOUNT_VISIBLE_DIGITS {
        return ACCOUNT_MASK.to_string();
    }

    let tail: String = digits[digits.len() - ACCOUNT_VISIBLE_DIGITS..].iter().collect();
    format!("{ACCOUNT_MASK}{tail}")
}
