//! Read-only views of a [`SizingRecord`]: the plain-text report and the list
//! projection returned by searches.

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{BitrateSource, SizingRecord};

/// One row of a record listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: Uuid,
    pub project_name: String,
    pub customer_name: String,
    pub location: String,
    pub assigned_person: String,
    pub created_at: DateTime<Utc>,
}

impl From<&SizingRecord> for RecordSummary {
    fn from(r: &SizingRecord) -> Self {
        Self {
            id: r.id(),
            project_name: r.project_name().to_string(),
            customer_name: r.customer_name().to_string(),
            location: r.location().to_string(),
            assigned_person: r.assigned_person().to_string(),
            created_at: r.created_at(),
        }
    }
}

fn fmt_mbps(x: f64) -> String {
    format!("{:.2} Mbps", x)
}
fn fmt_tb(x: f64) -> String {
    format!("{:.2} TB", x)
}

impl Display for SizingRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "=== VMS Sizing Report ===")?;
        writeln!(f, "Record: {}", self.id())?;
        writeln!(f, "Created: {}", self.created_at().format("%d-%b-%Y %H:%M UTC"))?;
        writeln!(f, "Customer: {}", self.customer_name())?;
        writeln!(f, "Project: {}", self.project_name())?;
        writeln!(f, "Location: {}", self.location())?;
        writeln!(f, "Assigned person: {}", self.assigned_person())?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<20} {:>6} {:>4} {:>7} {:>5} {:>7} {:>4} {:>14}",
            "Camera", "Res", "FPS", "Codec", "Hours", "Days", "Qty", "Bandwidth"
        )?;
        for (cam, part) in self.camera_configs().iter().zip(self.group_breakdown()) {
            let marker = match part.source {
                BitrateSource::Explicit => "",
                BitrateSource::Estimated => " (est.)",
            };
            writeln!(
                f,
                "{:<20} {:>6} {:>4} {:>7} {:>5} {:>7} {:>4} {:>14}{}",
                cam.name,
                cam.resolution,
                cam.fps,
                cam.codec,
                cam.record_hour,
                cam.retention_days,
                cam.qty,
                fmt_mbps(part.total_mbps),
                marker
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Cameras:              {}", self.camera_count())?;
        writeln!(f, "= Total bandwidth:    {}", fmt_mbps(self.bandwidth()))?;
        writeln!(f, "= Recording storage:  {}", fmt_tb(self.storage_tb()))?;
        writeln!(f)?;

        let spec = self.server_spec();
        writeln!(f, "Server tier:          {}", spec.tier)?;
        writeln!(f, "CPU:                  {}", spec.cpu)?;
        writeln!(f, "RAM:                  {} GB", spec.ram_gb)?;
        writeln!(f, "HDD total:            {}", fmt_tb(spec.hdd_tb))?;
        writeln!(f, "NIC ports:            {}", spec.nic)?;

        Ok(())
    }
}
