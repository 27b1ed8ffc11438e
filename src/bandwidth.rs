//! Bandwidth aggregation across camera groups.

use crate::bitrate::EffectiveGroup;
use crate::error::{SizingError, SizingResult};
use crate::model::CameraGroup;

/// Total network bandwidth of a request, in Mbps.
///
/// Every group contributes `per_camera_mbps * qty`; the result is the sum over
/// all groups, independent of their order.
pub fn aggregate(groups: &[EffectiveGroup<'_>]) -> f64 {
    groups.iter().map(EffectiveGroup::total_mbps).sum()
}

/// Number of physical cameras across all groups.
///
/// # Errors
///
/// [`SizingError::InvalidSizingInput`] if the total does not fit in a `u32`.
pub fn total_camera_count(groups: &[CameraGroup]) -> SizingResult<u32> {
    groups
        .iter()
        .try_fold(0u32, |acc, g| acc.checked_add(g.qty))
        .ok_or_else(|| SizingError::invalid("total camera quantity overflows u32"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitrate::{fill_missing_bitrates, BitrateTable};

    fn group(name: &str, resolution: &str, bitrate_kbps: Option<f64>, qty: u32) -> CameraGroup {
        CameraGroup {
            name: name.into(),
            resolution: resolution.into(),
            fps: 25,
            codec: "H.264".into(),
            bitrate_kbps,
            qty,
            record_hour: 24.0,
            retention_days: 30,
        }
    }

    #[test]
    fn sums_every_group_not_just_the_last() {
        let groups = vec![
            group("lobby", "2MP", Some(4000.0), 3),
            group("parking", "8MP", Some(8000.0), 2),
            group("gate", "4MP", Some(6000.0), 1),
        ];
        let effective = fill_missing_bitrates(&BitrateTable::default(), &groups).unwrap();

        // 3*4 + 2*8 + 1*6
        assert!((aggregate(&effective) - 34.0).abs() < 1e-9);
    }

    #[test]
    fn order_does_not_change_total() {
        let groups = vec![
            group("a", "2MP", None, 4),
            group("b", "8MP", Some(4096.0), 2),
            group("c", "5MP", None, 9),
        ];
        let mut reversed = groups.clone();
        reversed.reverse();

        let table = BitrateTable::default();
        let forward = aggregate(&fill_missing_bitrates(&table, &groups).unwrap());
        let backward = aggregate(&fill_missing_bitrates(&table, &reversed).unwrap());

        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn empty_aggregate_is_zero() {
        assert_eq!(aggregate(&[]), 0.0);
    }

    #[test]
    fn camera_count_sums_qty() {
        let groups = vec![group("a", "2MP", None, 4), group("b", "2MP", None, 2)];
        assert_eq!(total_camera_count(&groups).unwrap(), 6);
    }

    #[test]
    fn camera_count_overflow_is_an_error() {
        let groups = vec![
            group("a", "2MP", Some(1000.0), 3_000_000_000),
            group("b", "2MP", Some(1000.0), 3_000_000_000),
        ];
        assert!(matches!(
            total_camera_count(&groups),
            Err(SizingError::InvalidSizingInput(_))
        ));

        let at_limit = vec![group("a", "2MP", None, u32::MAX - 1), group("b", "2MP", None, 1)];
        assert_eq!(total_camera_count(&at_limit).unwrap(), u32::MAX);
    }
}
