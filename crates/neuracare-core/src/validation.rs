//! Entry validation.
//!
//! Length is measured on the trimmed text in Unicode scalar values. An
//! empty entry passes: guarding against blank submissions is the caller's
//! concern, not the validator's.

/// Minimum length (inclusive) of a non-empty entry.
pub const MIN_ENTRY_CHARS: usize = 10;

/// Maximum length (inclusive) of an entry.
pub const MAX_ENTRY_CHARS: usize = 2000;

/// Why an entry cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("Please describe your feelings in a bit more detail (at least 10 characters).")]
    TooShort,

    #[error("Please keep your entry under 2000 characters.")]
    TooLong,
}

/// Validate a user entry.
///
/// - trimmed length 0: passes
/// - trimmed length 1..=9: [`EntryError::TooShort`]
/// - trimmed length 10..=2000: passes
/// - trimmed length > 2000: [`EntryError::TooLong`]
pub fn validate(text: &str) -> Result<(), EntryError> {
    let len = text.trim().chars().count();
    if len > 0 && len < MIN_ENTRY_CHARS {
        return Err(EntryError::TooShort);
    }
    if len > MAX_ENTRY_CHARS {
        return Err(EntryError::TooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_pass() {
        assert_eq!(validate(""), Ok(()));
        assert_eq!(validate("   \n\t "), Ok(()));
    }

    #[test]
    fn short_entries_are_rejected() {
        for len in 1..MIN_ENTRY_CHARS {
            let text = "a".repeat(len);
            assert_eq!(validate(&text), Err(EntryError::TooShort), "len {len}");
        }
        assert_eq!(validate("tired"), Err(EntryError::TooShort));
    }

    #[test]
    fn boundaries_pass() {
        assert_eq!(validate(&"a".repeat(MIN_ENTRY_CHARS)), Ok(()));
        assert_eq!(validate(&"a".repeat(MAX_ENTRY_CHARS)), Ok(()));
        assert_eq!(validate("I'm exhausted and can't focus anymore."), Ok(()));
    }

    #[test]
    fn long_entries_are_rejected() {
        assert_eq!(
            validate(&"a".repeat(MAX_ENTRY_CHARS + 1)),
            Err(EntryError::TooLong)
        );
    }

    #[test]
    fn surrounding_whitespace_is_not_counted() {
        // 9 visible characters padded well past the minimum.
        assert_eq!(validate("     exhausted     "), Err(EntryError::TooShort));
        let padded = format!("  {}  ", "a".repeat(MAX_ENTRY_CHARS));
        assert_eq!(validate(&padded), Ok(()));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 10 multi-byte characters.
        assert_eq!(validate("éééééééééé"), Ok(()));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            EntryError::TooShort.to_string(),
            "Please describe your feelings in a bit more detail (at least 10 characters)."
        );
        assert_eq!(
            EntryError::TooLong.to_string(),
            "Please keep your entry under 2000 characters."
        );
    }
}
