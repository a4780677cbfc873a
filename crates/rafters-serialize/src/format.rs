//! Format Detection
//!
//! Frozen grids travel either as compact bincode or as JSON for inspection.

use std::path::Path;

// =============================================================================
// Format Enum
// =============================================================================

/// Supported encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Native binary encoding (.rgrid, .bin)
    Binary,
    /// JSON encoding (.json)
    Json,
}

impl Format {
    /// File extension written for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Binary => "rgrid",
            Format::Json => "json",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Format::Binary => "Rafters Binary",
            Format::Json => "JSON",
        }
    }

    /// True for non-text encodings.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Format::Binary)
    }

    /// All supported formats.
    #[must_use]
    pub fn all() -> &'static [Format] {
        &[Format::Binary, Format::Json]
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Format Detection
// =============================================================================

/// Picks a format from the file extension; unknown extensions are binary.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Format {
    match path.as_ref().extension().and_then(|e| e.to_str()) {
        Some("json") => Format::Json,
        _ => Format::Binary,
    }
}

/// Guesses the format from encoded bytes.
///
/// JSON documents start with `{` after optional whitespace. Returns `None`
/// for empty input.
#[must_use]
pub fn detect_format_from_bytes(bytes: &[u8]) -> Option<Format> {
    let first = bytes.iter().find(|b| !b.is_ascii_whitespace())?;
    if *first == b'{' {
        Some(Format::Json)
    } else {
        Some(Format::Binary)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format_from_extension() {
        assert_eq!(detect_format("scan.rgrid"), Format::Binary);
        assert_eq!(detect_format("scan.bin"), Format::Binary);
        assert_eq!(detect_format("scan.json"), Format::Json);
        assert_eq!(detect_format("scan"), Format::Binary);
    }

    #[test]
    fn test_format_properties() {
        assert!(Format::Binary.is_binary());
        assert!(!Format::Json.is_binary());
        assert_eq!(Format::Binary.extension(), "rgrid");
        assert_eq!(Format::all().len(), 2);
        assert_eq!(Format::Json.to_string(), "JSON");
    }

    #[test]
    fn test_detect_format_from_bytes() {
        assert_eq!(detect_format_from_bytes(b"  {\"buffer\": 1}"), Some(Format::Json));
        assert_eq!(detect_format_from_bytes(&[3, 0, 0, 0]), Some(Format::Binary));
        assert_eq!(detect_format_from_bytes(b""), None);
    }
}
