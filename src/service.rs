//! End-to-end sizing of one requirement.

use chrono::Utc;
use uuid::Uuid;

use crate::bandwidth::{aggregate, total_camera_count};
use crate::bitrate::fill_missing_bitrates;
use crate::config::SizingPolicy;
use crate::error::{ensure_record_hours, ensure_retention, SizingError, SizingResult};
use crate::model::{round2, CameraGroup, GroupBreakdown, SizingRecord, SizingRequirement};
use crate::storage::{governing_record_hours, governing_retention_days, storage_tb};

/// Turns a [`SizingRequirement`] into a [`SizingRecord`].
///
/// Holds only the immutable policy, so one instance can serve concurrent
/// requests without locking.
#[derive(Debug, Clone, Default)]
pub struct RequirementSizingService {
    policy: SizingPolicy,
}

impl RequirementSizingService {
    pub fn new(policy: SizingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SizingPolicy {
        &self.policy
    }

    /// Sizes a requirement.
    ///
    /// Steps, in order: validate groups, fill missing bitrates, aggregate
    /// bandwidth, compute storage with the longest retention and recording
    /// schedule, recommend hardware, then stamp a fresh id and timestamp.
    /// The first failing step aborts; no partial record is returned.
    ///
    /// # Errors
    ///
    /// - [`SizingError::EmptyRequirement`] if there are no camera groups.
    /// - [`SizingError::InvalidSizingInput`] for out-of-range group values.
    /// - [`SizingError::UnsupportedParameter`] if a group without an explicit
    ///   bitrate names an unknown resolution or codec.
    pub fn size(&self, requirement: &SizingRequirement) -> SizingResult<SizingRecord> {
        let groups = &requirement.camera_configs;
        if groups.is_empty() {
            return Err(SizingError::EmptyRequirement);
        }
        for (idx, group) in groups.iter().enumerate() {
            validate_group(group).map_err(|e| match e {
                SizingError::InvalidSizingInput(msg) => {
                    SizingError::InvalidSizingInput(format!("camera group {idx} ({}): {msg}", group.name))
                }
                other => other,
            })?;
        }

        let effective = fill_missing_bitrates(&self.policy.bitrate, groups)?;
        let total_mbps = aggregate(&effective);
        let camera_count = total_camera_count(groups)?;

        // Non-empty was checked above, so both maxima exist.
        let retention_days = governing_retention_days(groups).ok_or(SizingError::EmptyRequirement)?;
        let record_hours = governing_record_hours(groups).ok_or(SizingError::EmptyRequirement)?;

        let storage = storage_tb(total_mbps, retention_days, record_hours)?;
        let server_spec = self.policy.recommendation.recommend(
            camera_count,
            total_mbps,
            storage,
            retention_days,
            record_hours,
            groups,
        )?;

        let breakdown = effective
            .iter()
            .map(|e| GroupBreakdown {
                name: e.group.name.clone(),
                qty: e.group.qty,
                per_camera_mbps: e.per_camera_mbps,
                total_mbps: e.total_mbps(),
                source: e.source,
            })
            .collect();

        let record = SizingRecord::new(
            Uuid::new_v4(),
            requirement.clone(),
            Utc::now(),
            round2(total_mbps),
            storage,
            server_spec,
            breakdown,
        );

        tracing::info!(
            id = %record.id(),
            customer = %record.customer_name(),
            project = %record.project_name(),
            camera_count,
            bandwidth_mbps = record.bandwidth(),
            storage_tb = record.storage_tb(),
            tier = %record.server_spec().tier,
            "Sized requirement",
        );

        Ok(record)
    }
}

fn validate_group(group: &CameraGroup) -> SizingResult<()> {
    if group.qty == 0 {
        return Err(SizingError::invalid("qty must be >= 1"));
    }
    if group.fps == 0 {
        return Err(SizingError::invalid("fps must be >= 1"));
    }
    ensure_record_hours(group.record_hour)?;
    ensure_retention(group.retention_days)?;
    if let Some(kbps) = group.bitrate_kbps {
        if !kbps.is_finite() || kbps <= 0.0 {
            return Err(SizingError::invalid(format!(
                "bitrate_kbps must be > 0 when given, got {kbps}"
            )));
        }
    }
    Ok(())
}
