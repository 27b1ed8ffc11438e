//! Sizing policy: the bitrate and hardware tables, loadable from JSON.
//!
//! Every section is `#[serde(default)]` and the bitrate maps merge entry by
//! entry over the defaults, so a policy file only needs the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bitrate::BitrateTable;
use crate::recommend::RecommendationPolicy;

/// Environment variable naming a JSON policy file.
pub const POLICY_ENV_VAR: &str = "VMS_SIZER_POLICY";

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Failed to read policy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse policy: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid policy: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingPolicy {
    pub bitrate: BitrateTable,
    pub recommendation: RecommendationPolicy,
}

impl SizingPolicy {
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks the tables are usable: positive factors, and tier / NIC
    /// ceilings strictly ascending with unbounded rows only at the end.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let b = &self.bitrate;
        positive(b.reference_fps, "bitrate.reference_fps")?;
        positive(b.fps_exponent, "bitrate.fps_exponent")?;
        for (res, mbps) in &b.base_mbps {
            positive(*mbps, &format!("bitrate.base_mbps[{res}]"))?;
        }
        for (codec, factor) in &b.codec_factor {
            positive(*factor, &format!("bitrate.codec_factor[{codec}]"))?;
        }

        let r = &self.recommendation;
        if r.tiers.is_empty() {
            return Err(PolicyError::Invalid("at least one server tier is required".into()));
        }
        if r.nic.is_empty() {
            return Err(PolicyError::Invalid("at least one NIC rule is required".into()));
        }
        for t in &r.tiers {
            if t.ram_gb == 0 {
                return Err(PolicyError::Invalid(format!("tier {} has no RAM", t.name)));
            }
        }
        ascending(
            r.tiers.iter().map(|t| t.max_cameras.map(f64::from)),
            "recommendation.tiers.max_cameras",
        )?;
        ascending(
            r.tiers.iter().map(|t| t.max_bandwidth_mbps),
            "recommendation.tiers.max_bandwidth_mbps",
        )?;
        ascending(
            r.nic.iter().map(|n| n.max_bandwidth_mbps),
            "recommendation.nic.max_bandwidth_mbps",
        )?;
        if r.nic.iter().any(|n| n.ports == 0) {
            return Err(PolicyError::Invalid("NIC rules need at least one port".into()));
        }

        positive(r.disk.increment_tb, "recommendation.disk.increment_tb")?;
        if !r.disk.overhead.is_finite() || r.disk.overhead < 0.0 {
            return Err(PolicyError::Invalid(
                "recommendation.disk.overhead must be >= 0".into(),
            ));
        }
        Ok(())
    }
}

fn positive(value: f64, name: &str) -> Result<(), PolicyError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PolicyError::Invalid(format!("{name} must be > 0, got {value}")));
    }
    Ok(())
}

fn ascending(ceilings: impl Iterator<Item = Option<f64>>, name: &str) -> Result<(), PolicyError> {
    let mut previous: Option<f64> = None;
    let mut unbounded_seen = false;
    for ceiling in ceilings {
        match ceiling {
            None => unbounded_seen = true,
            Some(_) if unbounded_seen => {
                return Err(PolicyError::Invalid(format!(
                    "{name}: bounded row after an unbounded one"
                )));
            }
            Some(value) => {
                if previous.is_some_and(|p| value <= p) {
                    return Err(PolicyError::Invalid(format!(
                        "{name} must be strictly ascending"
                    )));
                }
                previous = Some(value);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Codec, Resolution};

    #[test]
    fn default_policy_is_valid() {
        assert!(SizingPolicy::default().validate().is_ok());
    }

    #[test]
    fn partial_file_merges_with_defaults() {
        let policy = SizingPolicy::from_json_str(
            r#"{ "bitrate": { "base_mbps": { "4MP": 7.5 } }, "recommendation": { "disk": { "overhead": 0.3, "increment_tb": 4.0 } } }"#,
        )
        .unwrap();

        assert_eq!(policy.bitrate.base_mbps.get(&Resolution::Mp4), Some(&7.5));
        // Unmentioned fields keep their defaults.
        assert_eq!(policy.bitrate.reference_fps, 30.0);
        assert_eq!(policy.recommendation.tiers.len(), 5);
        assert_eq!(policy.recommendation.disk.increment_tb, 4.0);
    }

    #[test]
    fn partial_bitrate_maps_keep_unmentioned_entries() {
        let policy = SizingPolicy::from_json_str(
            r#"{ "bitrate": { "base_mbps": { "4MP": 6.5 }, "codec_factor": { "H.265": 0.5 } } }"#,
        )
        .unwrap();
        let defaults = BitrateTable::default();

        assert_eq!(policy.bitrate.base_mbps.len(), defaults.base_mbps.len());
        assert_eq!(policy.bitrate.codec_factor.len(), defaults.codec_factor.len());
        assert_eq!(policy.bitrate.codec_factor.get(&Codec::H265), Some(&0.5));

        // 2MP was not mentioned: still estimates from the default table.
        let mbps = policy.bitrate.estimate("2MP", 30, "H.264").unwrap();
        assert!((mbps - 4.0).abs() < 1e-9);
        let mbps = policy.bitrate.estimate("4MP", 30, "H.265").unwrap();
        assert!((mbps - 6.5 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_object_is_the_default_policy() {
        assert_eq!(SizingPolicy::from_json_str("{}").unwrap(), SizingPolicy::default());
    }

    #[test]
    fn rejects_descending_tiers() {
        let mut policy = SizingPolicy::default();
        policy.recommendation.tiers.swap(0, 1);
        assert!(matches!(policy.validate(), Err(PolicyError::Invalid(_))));
    }

    #[test]
    fn rejects_bounded_tier_after_unbounded() {
        let mut policy = SizingPolicy::default();
        policy.recommendation.tiers.rotate_right(1);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_factors() {
        let mut policy = SizingPolicy::default();
        policy.recommendation.disk.increment_tb = 0.0;
        assert!(policy.validate().is_err());

        let mut policy = SizingPolicy::default();
        policy.bitrate.fps_exponent = -1.0;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SizingPolicy::from_json_str("{ not json"),
            Err(PolicyError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            SizingPolicy::from_json_file("/nonexistent/vms-sizer-policy.json"),
            Err(PolicyError::Io { .. })
        ));
    }
}
