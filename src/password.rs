//! Password strength classification.
//!
//! Four independent criteria, recomputed from scratch on every call; no state
//! and no side effects. The interface layer renders one indicator per flag.

/// Characters accepted as "special" by the strength indicator.
pub const SPECIAL_CHARS: &[char] = &['!', '%', '&', '@', '#', '$', '^', '*', '?', '_', '~'];

/// Minimum length (in characters) before a password counts as long enough.
/// The registration validator enforces the same threshold.
pub const MIN_LENGTH: usize = 6;

/// Outcome of classifying one candidate password.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PasswordStrength {
    /// Both an uppercase and a lowercase letter are present.
    pub mixed_case: bool,
    /// At least one decimal digit is present.
    pub digit: bool,
    /// At least one character from [`SPECIAL_CHARS`] is present.
    pub special_char: bool,
    /// Length is at least six characters.
    pub min_length: bool,
}

impl PasswordStrength {
    /// Classify `password` against the four criteria.
    #[must_use]
    pub fn evaluate(password: &str) -> Self {
        Self {
            mixed_case: password.chars().any(|c| c.is_ascii_lowercase())
                && password.chars().any(|c| c.is_ascii_uppercase()),
            digit: password.chars().any(|c| c.is_ascii_digit()),
            special_char: password.chars().any(|c| SPECIAL_CHARS.contains(&c)),
            min_length: password.chars().count() >= MIN_LENGTH,
        }
    }

    /// True when all four criteria hold.
    #[must_use]
    pub const fn satisfied(self) -> bool {
        self.mixed_case && self.digit && self.special_char && self.min_length
    }
}
