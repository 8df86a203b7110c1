//! Heading level threshold and its settings cascade.

use std::fmt;

use serde::Serialize;

/// Shallowest heading level.
pub const MIN_LEVEL: u8 = 1;

/// Deepest heading level.
pub const MAX_LEVEL: u8 = 6;

/// Deepest heading level kept in an outline.
///
/// Always within `MIN_LEVEL..=MAX_LEVEL`; out-of-range values are rejected
/// on construction so the outline builder never sees them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Threshold(u8);

impl Threshold {
    /// Fallback used when neither the document nor the process sets a level.
    pub const DEFAULT: Self = Self(MIN_LEVEL);

    /// Validate a raw level.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError::OutOfRange`] if `value` is outside `1..=6`.
    pub fn new(value: i64) -> Result<Self, ThresholdError> {
        u8::try_from(value)
            .ok()
            .filter(|level| (MIN_LEVEL..=MAX_LEVEL).contains(level))
            .map(Self)
            .ok_or(ThresholdError::OutOfRange { value })
    }

    /// Numeric level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether a heading at `level` is kept.
    #[must_use]
    pub const fn includes(self, level: u8) -> bool {
        level <= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Threshold {
    type Error = ThresholdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invalid heading level setting.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ThresholdError {
    /// Level outside the valid heading range.
    #[error("gather headings level {value} is out of range (expected a level between 1 and 6)")]
    OutOfRange {
        /// The rejected value.
        value: i64,
    },
}

/// Resolve the effective threshold for a document.
///
/// The document override wins over the process-wide default, which wins over
/// [`Threshold::DEFAULT`]. Only the selected value is validated.
///
/// # Errors
///
/// Returns [`ThresholdError::OutOfRange`] if the selected value is outside `1..=6`.
pub fn resolve_threshold(
    document_override: Option<i64>,
    global_default: Option<i64>,
) -> Result<Threshold, ThresholdError> {
    document_override
        .or(global_default)
        .map_or(Ok(Threshold::DEFAULT), Threshold::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_override_wins() {
        assert_eq!(resolve_threshold(Some(3), Some(2)).unwrap().get(), 3);
    }

    #[test]
    fn test_global_default_used_without_override() {
        assert_eq!(resolve_threshold(None, Some(2)).unwrap().get(), 2);
    }

    #[test]
    fn test_fallback_is_one() {
        assert_eq!(resolve_threshold(None, None).unwrap(), Threshold::DEFAULT);
        assert_eq!(Threshold::default().get(), 1);
    }

    #[test]
    fn test_out_of_range_override_is_reported() {
        let err = resolve_threshold(Some(7), Some(2)).unwrap_err();
        assert_eq!(err, ThresholdError::OutOfRange { value: 7 });
        assert_eq!(
            err.to_string(),
            "gather headings level 7 is out of range (expected a level between 1 and 6)"
        );
    }

    #[test]
    fn test_unselected_global_default_is_not_validated() {
        // The override shadows the bad default entirely.
        assert_eq!(resolve_threshold(Some(2), Some(0)).unwrap().get(), 2);
    }

    #[test]
    fn test_new_bounds() {
        assert!(Threshold::new(0).is_err());
        assert!(Threshold::new(-1).is_err());
        assert!(Threshold::new(i64::from(u8::MAX) + 1).is_err());
        assert_eq!(Threshold::new(1).unwrap().get(), 1);
        assert_eq!(Threshold::new(6).unwrap().get(), 6);
    }

    #[test]
    fn test_includes() {
        let threshold = Threshold::new(2).unwrap();
        assert!(threshold.includes(1));
        assert!(threshold.includes(2));
        assert!(!threshold.includes(3));
    }

    #[test]
    fn test_try_from_and_display() {
        let threshold = Threshold::try_from(4).unwrap();
        assert_eq!(threshold.to_string(), "4");
    }
}
