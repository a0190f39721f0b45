use std::fmt;

/// A newtype that ensures athlete ids are stored in one consistent form, so
/// the barcode spelling "A123456" and the bare "123456" refer to the same
/// athlete in the history file and in result URLs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParkrunId(String);

impl ParkrunId {
    /// Normalizes a configured or scraped athlete id.
    ///
    /// Surrounding whitespace and a single leading `A`/`a` (as printed on
    /// barcodes) are removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use storage::models::ParkrunId;
    ///
    /// assert_eq!(ParkrunId::new("A123456"), ParkrunId::new(" 123456 "));
    /// assert_eq!(ParkrunId::new("a42").as_str(), "42");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        let digits = trimmed
            .strip_prefix('A')
            .or_else(|| trimmed.strip_prefix('a'))
            .unwrap_or(trimmed);
        Self(digits.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the normalized id is a non-empty run of ASCII digits.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ParkrunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_barcode_prefix() {
        assert_eq!(ParkrunId::new("A123456").as_str(), "123456");
        assert_eq!(ParkrunId::new("a123456").as_str(), "123456");
    }

    #[test]
    fn test_bare_digits_unchanged() {
        assert_eq!(ParkrunId::new("123456").as_str(), "123456");
    }

    #[test]
    fn test_only_one_prefix_removed() {
        let id = ParkrunId::new("AA12");
        assert_eq!(id.as_str(), "A12");
        assert!(!id.is_valid());
    }

    #[test]
    fn test_validity() {
        assert!(ParkrunId::new(" 42 ").is_valid());
        assert!(!ParkrunId::new("").is_valid());
        assert!(!ParkrunId::new("A").is_valid());
        assert!(!ParkrunId::new("12x4").is_valid());
    }
}
