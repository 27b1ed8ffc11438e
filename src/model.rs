//! Value types flowing through the sizing pipeline.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SizingError;

/// Sensor resolution tier of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "1MP")]
    Mp1,
    #[serde(rename = "2MP")]
    Mp2,
    #[serde(rename = "3MP")]
    Mp3,
    #[serde(rename = "4MP")]
    Mp4,
    #[serde(rename = "5MP")]
    Mp5,
    #[serde(rename = "6MP")]
    Mp6,
    #[serde(rename = "8MP")]
    Mp8,
    #[serde(rename = "12MP")]
    Mp12,
}

impl Resolution {
    pub const ALL: [Resolution; 8] = [
        Self::Mp1,
        Self::Mp2,
        Self::Mp3,
        Self::Mp4,
        Self::Mp5,
        Self::Mp6,
        Self::Mp8,
        Self::Mp12,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Mp1 => "1MP",
            Self::Mp2 => "2MP",
            Self::Mp3 => "3MP",
            Self::Mp4 => "4MP",
            Self::Mp5 => "5MP",
            Self::Mp6 => "6MP",
            Self::Mp8 => "8MP",
            Self::Mp12 => "12MP",
        }
    }
}

impl FromStr for Resolution {
    type Err = SizingError;

    /// Parses labels such as `4MP`, `4 mp` or the common aliases `720p`,
    /// `1080p`, `1440p` and `4K`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let res = match key.as_str() {
            "1MP" | "720P" => Self::Mp1,
            "2MP" | "1080P" => Self::Mp2,
            "3MP" => Self::Mp3,
            "4MP" | "1440P" => Self::Mp4,
            "5MP" => Self::Mp5,
            "6MP" => Self::Mp6,
            "8MP" | "4K" => Self::Mp8,
            "12MP" => Self::Mp12,
            _ => {
                return Err(SizingError::UnsupportedParameter {
                    parameter: "resolution",
                    value: s.to_string(),
                });
            }
        };
        Ok(res)
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

/// Video compression codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Codec {
    #[serde(rename = "H.264")]
    H264,
    #[serde(rename = "H.264+")]
    H264Plus,
    #[serde(rename = "H.265")]
    H265,
    #[serde(rename = "H.265+")]
    H265Plus,
    #[serde(rename = "MJPEG")]
    Mjpeg,
}

impl Codec {
    pub const ALL: [Codec; 5] = [
        Self::H264,
        Self::H264Plus,
        Self::H265,
        Self::H265Plus,
        Self::Mjpeg,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::H264 => "H.264",
            Self::H264Plus => "H.264+",
            Self::H265 => "H.265",
            Self::H265Plus => "H.265+",
            Self::Mjpeg => "MJPEG",
        }
    }
}

impl FromStr for Codec {
    type Err = SizingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "H.265", "h265", "H-265" and "HEVC" all name the same codec.
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '.' | '-' | '_') && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let codec = match key.as_str() {
            "H264" | "AVC" => Self::H264,
            "H264+" => Self::H264Plus,
            "H265" | "HEVC" => Self::H265,
            "H265+" => Self::H265Plus,
            "MJPEG" | "MJPG" => Self::Mjpeg,
            _ => {
                return Err(SizingError::UnsupportedParameter {
                    parameter: "codec",
                    value: s.to_string(),
                });
            }
        };
        Ok(codec)
    }
}

impl Display for Codec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

/// One configuration line: `qty` identical cameras sharing stream settings
/// and recording schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraGroup {
    /// Camera brand / model label.
    pub name: String,
    /// Resolution label, parsed into [`Resolution`] only when an estimate is needed.
    pub resolution: String,
    pub fps: u32,
    /// Codec label, parsed into [`Codec`] only when an estimate is needed.
    pub codec: String,
    /// Explicit per-camera bitrate; overrides the estimate when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<f64>,
    pub qty: u32,
    /// Hours per day the cameras actively record (0–24).
    pub record_hour: f64,
    pub retention_days: u32,
}

/// A customer request to be sized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingRequirement {
    pub customer_name: String,
    pub project_name: String,
    pub location: String,
    pub assigned_person: String,
    pub camera_configs: Vec<CameraGroup>,
}

/// Recommended recording-server hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSpec {
    /// Name of the tier the CPU/RAM row was taken from.
    pub tier: String,
    pub cpu: String,
    pub ram_gb: u32,
    /// Recording capacity including RAID/filesystem overhead, in whole disk increments.
    pub hdd_tb: f64,
    /// Network interface port count.
    pub nic: u32,
}

/// Where a group's per-camera bandwidth came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitrateSource {
    Explicit,
    Estimated,
}

/// Per-group bandwidth contribution recorded alongside the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBreakdown {
    pub name: String,
    pub qty: u32,
    pub per_camera_mbps: f64,
    pub total_mbps: f64,
    pub source: BitrateSource,
}

/// The outcome of one sizing request.
///
/// Only [`crate::RequirementSizingService`] builds records; once built they
/// are read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingRecord {
    id: Uuid,
    #[serde(flatten)]
    requirement: SizingRequirement,
    created_at: DateTime<Utc>,
    /// Aggregate Mbps, rounded to 2 decimals.
    bandwidth: f64,
    storage_tb: f64,
    server_spec: ServerSpec,
    group_breakdown: Vec<GroupBreakdown>,
}

impl SizingRecord {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: Uuid,
        requirement: SizingRequirement,
        created_at: DateTime<Utc>,
        bandwidth: f64,
        storage_tb: f64,
        server_spec: ServerSpec,
        group_breakdown: Vec<GroupBreakdown>,
    ) -> Self {
        Self {
            id,
            requirement,
            created_at,
            bandwidth,
            storage_tb,
            server_spec,
            group_breakdown,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn requirement(&self) -> &SizingRequirement {
        &self.requirement
    }

    pub fn customer_name(&self) -> &str {
        &self.requirement.customer_name
    }

    pub fn project_name(&self) -> &str {
        &self.requirement.project_name
    }

    pub fn location(&self) -> &str {
        &self.requirement.location
    }

    pub fn assigned_person(&self) -> &str {
        &self.requirement.assigned_person
    }

    pub fn camera_configs(&self) -> &[CameraGroup] {
        &self.requirement.camera_configs
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn storage_tb(&self) -> f64 {
        self.storage_tb
    }

    pub fn server_spec(&self) -> &ServerSpec {
        &self.server_spec
    }

    pub fn group_breakdown(&self) -> &[GroupBreakdown] {
        &self.group_breakdown
    }

    pub fn camera_count(&self) -> u64 {
        self.camera_configs().iter().map(|g| u64::from(g.qty)).sum()
    }
}

/// Round to 2 decimal places, as reported figures are.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
