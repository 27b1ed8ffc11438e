//! Per-camera bitrate estimation and the normalization step that gives every
//! camera group an effective bandwidth.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{SizingError, SizingResult};
use crate::model::{BitrateSource, CameraGroup, Codec, Resolution};

/// Kilobits per megabit (decimal).
pub const KBPS_PER_MBPS: f64 = 1000.0;

/// Bitrate estimation policy.
///
/// The estimate for a stream is
///
/// ```text
/// base_mbps[resolution] * (fps / reference_fps)^fps_exponent * codec_factor[codec]
/// ```
///
/// `base_mbps` is calibrated for H.264 at `reference_fps`. An `fps_exponent`
/// below 1 makes the bitrate grow sub-linearly with frame rate, since
/// inter-frame compression gets cheaper as frames get closer together.
///
/// When deserialized, `base_mbps` and `codec_factor` entries are merged over
/// the default tables, so a policy only lists the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitrateTable {
    pub reference_fps: f64,
    pub fps_exponent: f64,
    #[serde(deserialize_with = "merge_base_mbps")]
    pub base_mbps: BTreeMap<Resolution, f64>,
    #[serde(deserialize_with = "merge_codec_factor")]
    pub codec_factor: BTreeMap<Codec, f64>,
}

fn merge_base_mbps<'de, D>(deserializer: D) -> Result<BTreeMap<Resolution, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut merged = BitrateTable::default().base_mbps;
    merged.extend(BTreeMap::<Resolution, f64>::deserialize(deserializer)?);
    Ok(merged)
}

fn merge_codec_factor<'de, D>(deserializer: D) -> Result<BTreeMap<Codec, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut merged = BitrateTable::default().codec_factor;
    merged.extend(BTreeMap::<Codec, f64>::deserialize(deserializer)?);
    Ok(merged)
}

impl Default for BitrateTable {
    fn default() -> Self {
        let base_mbps = BTreeMap::from([
            (Resolution::Mp1, 2.0),
            (Resolution::Mp2, 4.0),
            (Resolution::Mp3, 5.0),
            (Resolution::Mp4, 6.0),
            (Resolution::Mp5, 8.0),
            (Resolution::Mp6, 9.0),
            (Resolution::Mp8, 12.0),
            (Resolution::Mp12, 16.0),
        ]);
        let codec_factor = BTreeMap::from([
            (Codec::H264, 1.0),
            (Codec::H264Plus, 0.70),
            (Codec::H265, 0.60),
            (Codec::H265Plus, 0.45),
            (Codec::Mjpeg, 4.0),
        ]);
        Self {
            reference_fps: 30.0,
            fps_exponent: 0.75,
            base_mbps,
            codec_factor,
        }
    }
}

impl BitrateTable {
    /// Estimates the sustained bandwidth of one camera stream, in Mbps.
    ///
    /// # Errors
    ///
    /// - [`SizingError::UnsupportedParameter`] if `resolution` or `codec` is not
    ///   a known label, or the table has no entry for it.
    /// - [`SizingError::InvalidSizingInput`] if `fps` is `0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vms_sizer::BitrateTable;
    ///
    /// let table = BitrateTable::default();
    /// let h264 = table.estimate("2MP", 30, "H.264").unwrap();
    /// let h265 = table.estimate("2MP", 30, "H.265").unwrap();
    ///
    /// assert!((h264 - 4.0).abs() < 1e-9);
    /// assert!(h265 < h264);
    /// ```
    pub fn estimate(&self, resolution: &str, fps: u32, codec: &str) -> SizingResult<f64> {
        let resolution: Resolution = resolution.parse()?;
        let codec: Codec = codec.parse()?;
        self.estimate_for(resolution, fps, codec)
    }

    /// Same as [`BitrateTable::estimate`], for already-parsed parameters.
    pub fn estimate_for(&self, resolution: Resolution, fps: u32, codec: Codec) -> SizingResult<f64> {
        if fps == 0 {
            return Err(SizingError::invalid("fps must be >= 1"));
        }
        let base = self.base_mbps.get(&resolution).ok_or_else(|| {
            SizingError::UnsupportedParameter {
                parameter: "resolution",
                value: resolution.label().to_string(),
            }
        })?;
        let factor = self
            .codec_factor
            .get(&codec)
            .ok_or_else(|| SizingError::UnsupportedParameter {
                parameter: "codec",
                value: codec.label().to_string(),
            })?;

        let fps_factor = (fps as f64 / self.reference_fps).powf(self.fps_exponent);

        Ok(base * fps_factor * factor)
    }
}

/// Estimates per-camera Mbps using the default [`BitrateTable`].
pub fn estimate(resolution: &str, fps: u32, codec: &str) -> SizingResult<f64> {
    BitrateTable::default().estimate(resolution, fps, codec)
}

/// A camera group paired with the bandwidth one of its cameras consumes.
///
/// Borrowed from the caller's request rather than written back into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveGroup<'a> {
    pub group: &'a CameraGroup,
    pub per_camera_mbps: f64,
    pub source: BitrateSource,
}

impl EffectiveGroup<'_> {
    /// Bandwidth of the whole group: `per_camera_mbps * qty`.
    pub fn total_mbps(&self) -> f64 {
        self.per_camera_mbps * self.group.qty as f64
    }
}

/// Derives an effective per-camera bandwidth for every group.
///
/// Groups with an explicit `bitrate_kbps` are converted (`kbps / 1000`) without
/// consulting the estimator, so their resolution and codec labels are not
/// checked. The rest are estimated from `(resolution, fps, codec)`.
pub fn fill_missing_bitrates<'a>(
    table: &BitrateTable,
    groups: &'a [CameraGroup],
) -> SizingResult<Vec<EffectiveGroup<'a>>> {
    groups
        .iter()
        .map(|group| {
            let (per_camera_mbps, source) = match group.bitrate_kbps {
                Some(kbps) => (kbps / KBPS_PER_MBPS, BitrateSource::Explicit),
                None => (
                    table.estimate(&group.resolution, group.fps, &group.codec)?,
                    BitrateSource::Estimated,
                ),
            };
            Ok(EffectiveGroup {
                group,
                per_camera_mbps,
                source,
            })
        })
        .collect()
}
