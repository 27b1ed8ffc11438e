//! Error taxonomy for the sizing core.
//!
//! None of these are recoverable locally: sizing is a deterministic function of
//! its inputs, so every error is a caller-input problem and propagates as-is.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SizingError {
    /// A resolution or codec label outside the supported enumeration, or one
    /// the active bitrate table has no entry for.
    #[error("Unsupported {parameter}: {value:?}")]
    UnsupportedParameter {
        parameter: &'static str,
        value: String,
    },

    /// Structurally invalid numeric input (quantity, hours, retention, ...).
    #[error("Invalid sizing input: {0}")]
    InvalidSizingInput(String),

    #[error("Sizing requirement has no camera groups")]
    EmptyRequirement,
}

impl SizingError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidSizingInput(msg.into())
    }
}

pub type SizingResult<T> = Result<T, SizingError>;

/// Reject non-finite or negative quantities.
pub(crate) fn ensure_non_negative(value: f64, name: &str) -> SizingResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SizingError::invalid(format!(
            "{name} must be a finite value >= 0, got {value}"
        )));
    }
    Ok(())
}

/// Validate daily recording hours fall within `[0, 24]`.
pub(crate) fn ensure_record_hours(hours: f64) -> SizingResult<()> {
    if !(0.0..=24.0).contains(&hours) {
        return Err(SizingError::invalid(format!(
            "record_hour must be between 0 and 24, got {hours}"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_retention(days: u32) -> SizingResult<()> {
    if days == 0 {
        return Err(SizingError::invalid("retention_days must be >= 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_hours_accepts_boundaries() {
        assert!(ensure_record_hours(0.0).is_ok());
        assert!(ensure_record_hours(12.5).is_ok());
        assert!(ensure_record_hours(24.0).is_ok());
    }

    #[test]
    fn record_hours_rejects_out_of_range_and_nan() {
        assert!(ensure_record_hours(-0.1).is_err());
        assert!(ensure_record_hours(24.01).is_err());
        assert!(ensure_record_hours(f64::NAN).is_err());
    }

    #[test]
    fn non_negative_rejects_infinite() {
        assert!(ensure_non_negative(f64::INFINITY, "bandwidth").is_err());
        assert!(ensure_non_negative(-1.0, "bandwidth").is_err());
        assert!(ensure_non_negative(0.0, "bandwidth").is_ok());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = SizingError::UnsupportedParameter {
            parameter: "codec",
            value: "VP9".into(),
        };
        assert_eq!(err.to_string(), "Unsupported codec: \"VP9\"");
        assert_eq!(
            ensure_retention(0).unwrap_err().to_string(),
            "Invalid sizing input: retention_days must be >= 1"
        );
    }
}
