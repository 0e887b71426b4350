//! Filename character checks.
//!
//! Tag values such as artist and title end up in filenames. Portable players are commonly
//! formatted as exFAT, which rejects control characters and a handful of punctuation marks.

/// Punctuation exFAT does not allow in filenames.
const EXFAT_INVALID_PUNCTUATION: [char; 9] = ['"', '*', '/', ':', '<', '>', '?', '\\', '|'];

pub fn is_exfat_invalid(c: char) -> bool {
    (c as u32) < 0x20 || EXFAT_INVALID_PUNCTUATION.contains(&c)
}

/// One warning per offending character occurrence in `value`. Empty when `value` is safe.
pub fn exfat_warnings(value: &str) -> Vec<String> {
    value
        .chars()
        .filter(|&c| is_exfat_invalid(c))
        .map(|c| {
            format!(
                "{value:?} contains {} which is not a valid exFAT filename character",
                c.escape_default()
            )
        })
        .collect()
}
