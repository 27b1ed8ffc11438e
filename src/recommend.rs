//! Tiered server hardware recommendation.
//!
//! Thresholds live in [`RecommendationPolicy`] as ordered tables, not in
//! control flow, so a site can swap them through the policy file. Every
//! ceiling is exclusive: a metric sitting exactly on a boundary lands in the
//! next tier up.

use serde::{Deserialize, Serialize};

use crate::error::{
    ensure_non_negative, ensure_record_hours, ensure_retention, SizingError, SizingResult,
};
use crate::model::{CameraGroup, ServerSpec};

/// One CPU/RAM tier. A `None` ceiling is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub name: String,
    pub cpu: String,
    pub ram_gb: u32,
    pub max_cameras: Option<u32>,
    pub max_bandwidth_mbps: Option<f64>,
}

impl TierRule {
    fn admits(&self, camera_count: u32, bandwidth_mbps: f64) -> bool {
        self.max_cameras.is_none_or(|max| camera_count < max)
            && self.max_bandwidth_mbps.is_none_or(|max| bandwidth_mbps < max)
    }
}

/// NIC port count for bandwidth below `max_bandwidth_mbps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicRule {
    pub max_bandwidth_mbps: Option<f64>,
    pub ports: u32,
}

/// How recording storage turns into installed disk capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskPolicy {
    /// RAID and filesystem overhead as a fraction (e.g. 0.2 = 20%).
    pub overhead: f64,
    /// Disk size increment, in TB. Capacity is always a whole number of these.
    pub increment_tb: f64,
}

impl Default for DiskPolicy {
    fn default() -> Self {
        Self {
            overhead: 0.20,
            increment_tb: 2.0,
        }
    }
}

impl DiskPolicy {
    /// Installed capacity for `storage_tb` of footage, rounded up to the next
    /// increment, never less than one increment.
    ///
    /// ```text
    /// hdd_tb = ceil(storage_tb * (1 + overhead) / increment_tb) * increment_tb
    /// ```
    pub fn capacity_tb(&self, storage_tb: f64) -> f64 {
        let increments = storage_tb * (1.0 + self.overhead) / self.increment_tb;
        // Trim float noise so 6.000000000000001 increments does not become 7.
        let increments = ((increments * 1e6).round() / 1e6).ceil().max(1.0);
        increments * self.increment_tb
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationPolicy {
    pub tiers: Vec<TierRule>,
    pub nic: Vec<NicRule>,
    pub disk: DiskPolicy,
}

fn tier(name: &str, cpu: &str, ram_gb: u32, cameras: Option<u32>, mbps: Option<f64>) -> TierRule {
    TierRule {
        name: name.into(),
        cpu: cpu.into(),
        ram_gb,
        max_cameras: cameras,
        max_bandwidth_mbps: mbps,
    }
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                tier("small", "Intel Core i5 (6 cores)", 16, Some(16), Some(64.0)),
                tier("medium", "Intel Core i7 (8 cores)", 32, Some(32), Some(128.0)),
                tier("large", "Intel Xeon Silver (12 cores)", 64, Some(64), Some(256.0)),
                tier("enterprise", "Intel Xeon Gold (16 cores)", 128, Some(128), Some(512.0)),
                tier("datacenter", "Dual Intel Xeon Gold (32 cores)", 256, None, None),
            ],
            nic: vec![
                NicRule { max_bandwidth_mbps: Some(800.0), ports: 1 },
                NicRule { max_bandwidth_mbps: Some(1600.0), ports: 2 },
                NicRule { max_bandwidth_mbps: Some(3200.0), ports: 4 },
                NicRule { max_bandwidth_mbps: None, ports: 8 },
            ],
            disk: DiskPolicy::default(),
        }
    }
}

impl RecommendationPolicy {
    /// First tier admitting both metrics. Falls back to the largest tier when
    /// a table has no unbounded row.
    pub fn select_tier(&self, camera_count: u32, bandwidth_mbps: f64) -> Option<&TierRule> {
        self.tiers
            .iter()
            .find(|t| t.admits(camera_count, bandwidth_mbps))
            .or(self.tiers.last())
    }

    pub fn nic_ports(&self, bandwidth_mbps: f64) -> Option<u32> {
        self.nic
            .iter()
            .find(|r| r.max_bandwidth_mbps.is_none_or(|max| bandwidth_mbps < max))
            .or(self.nic.last())
            .map(|r| r.ports)
    }

    /// Maps the sized load onto a hardware recommendation.
    ///
    /// `max_retention_days` and `record_hours` are the governing values the
    /// storage figure was computed with; they are validated, not re-applied.
    /// When `groups` is non-empty their total quantity must equal
    /// `camera_count`.
    ///
    /// # Errors
    ///
    /// [`SizingError::InvalidSizingInput`] if `camera_count` is `0`, any
    /// figure is out of range, or `groups` disagrees with `camera_count`.
    pub fn recommend(
        &self,
        camera_count: u32,
        total_bandwidth_mbps: f64,
        storage_tb: f64,
        max_retention_days: u32,
        record_hours: f64,
        groups: &[CameraGroup],
    ) -> SizingResult<ServerSpec> {
        if camera_count == 0 {
            return Err(SizingError::invalid("camera_count must be >= 1"));
        }
        ensure_non_negative(total_bandwidth_mbps, "total_bandwidth_mbps")?;
        ensure_non_negative(storage_tb, "storage_tb")?;
        ensure_retention(max_retention_days)?;
        ensure_record_hours(record_hours)?;

        if !groups.is_empty() {
            let qty = crate::bandwidth::total_camera_count(groups)?;
            if qty != camera_count {
                return Err(SizingError::invalid(format!(
                    "camera_count {camera_count} does not match group quantities ({qty})"
                )));
            }
        }

        let tier = self
            .select_tier(camera_count, total_bandwidth_mbps)
            .ok_or_else(|| SizingError::invalid("no server tiers configured"))?;
        let nic = self
            .nic_ports(total_bandwidth_mbps)
            .ok_or_else(|| SizingError::invalid("no NIC rules configured"))?;
        let hdd_tb = self.disk.capacity_tb(storage_tb);

        tracing::debug!(
            tier = %tier.name,
            camera_count,
            total_bandwidth_mbps,
            storage_tb,
            hdd_tb,
            nic,
            "Selected server tier",
        );

        Ok(ServerSpec {
            tier: tier.name.clone(),
            cpu: tier.cpu.clone(),
            ram_gb: tier.ram_gb,
            hdd_tb,
            nic,
        })
    }
}

/// Recommends hardware using the default [`RecommendationPolicy`].
pub fn recommend(
    camera_count: u32,
    total_bandwidth_mbps: f64,
    storage_tb: f64,
    max_retention_days: u32,
    record_hours: f64,
    groups: &[CameraGroup],
) -> SizingResult<ServerSpec> {
    RecommendationPolicy::default().recommend(
        camera_count,
        total_bandwidth_mbps,
        storage_tb,
        max_retention_days,
        record_hours,
        groups,
    )
}
