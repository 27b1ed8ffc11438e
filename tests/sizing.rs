//! End-to-end sizing through the public API.

use assert_matches::assert_matches;
use chrono::Utc;
use vms_sizer::{
    build, estimate, search_records, BitrateSource, CameraGroup, RequirementSizingService,
    SearchCriteria, SizingError, SizingRecord, SizingRequirement, storage_tb,
};

fn requirement(camera_configs: Vec<CameraGroup>) -> SizingRequirement {
    SizingRequirement {
        customer_name: "Acme Corp".into(),
        project_name: "HQ Retrofit".into(),
        location: "Berlin".into(),
        assigned_person: "Anna".into(),
        camera_configs,
    }
}

/// (A) 4 x 4MP/15fps/H.265 estimated, 24h, 30 days.
fn group_a() -> CameraGroup {
    CameraGroup {
        name: "Dome 4MP".into(),
        resolution: "4MP".into(),
        fps: 15,
        codec: "H.265".into(),
        bitrate_kbps: None,
        qty: 4,
        record_hour: 24.0,
        retention_days: 30,
    }
}

/// (B) 2 x explicit 4096 kbps, 12h, 15 days.
fn group_b() -> CameraGroup {
    CameraGroup {
        name: "Bullet PTZ".into(),
        resolution: "2MP".into(),
        fps: 25,
        codec: "H.264".into(),
        bitrate_kbps: Some(4096.0),
        qty: 2,
        record_hour: 12.0,
        retention_days: 15,
    }
}

// Scenario: A + B, bandwidth = 4 * estimate + 2 * 4.096, storage with 30 days and 24 h.
#[test]
fn two_heterogeneous_groups_end_to_end() {
    let before = Utc::now();
    let record = RequirementSizingService::default()
        .size(&requirement(vec![group_a(), group_b()]))
        .unwrap();
    let after = Utc::now();

    let expected_mbps = 4.0 * estimate("4MP", 15, "H.265").unwrap() + 2.0 * 4.096;
    assert!((record.bandwidth() - (expected_mbps * 100.0).round() / 100.0).abs() < 1e-9);
    assert!((record.bandwidth() - 16.75).abs() < 1e-9);

    let expected_tb = storage_tb(expected_mbps, 30, 24.0).unwrap();
    assert!((record.storage_tb() - expected_tb).abs() < 1e-9);
    assert!((record.storage_tb() - 5.43).abs() < 1e-9);

    assert_eq!(record.camera_count(), 6);
    let spec = record.server_spec();
    assert_eq!(spec.tier, "small");
    assert_eq!(spec.ram_gb, 16);
    assert_eq!(spec.nic, 1);
    assert!((spec.hdd_tb - 8.0).abs() < 1e-9);

    assert!(record.created_at() >= before && record.created_at() <= after);
    assert_eq!(record.group_breakdown()[0].source, BitrateSource::Estimated);
    assert_eq!(record.group_breakdown()[1].source, BitrateSource::Explicit);
}

// Regression: the total must include every group, not just the last one processed.
#[test]
fn bandwidth_is_not_the_last_group_only() {
    let service = RequirementSizingService::default();
    let both = service.size(&requirement(vec![group_a(), group_b()])).unwrap();
    let last_only = service.size(&requirement(vec![group_b()])).unwrap();

    assert!(both.bandwidth() > last_only.bandwidth());
    assert!((last_only.bandwidth() - 8.19).abs() < 1e-9);
}

#[test]
fn group_order_does_not_change_the_result() {
    let service = RequirementSizingService::default();
    let ab = service.size(&requirement(vec![group_a(), group_b()])).unwrap();
    let ba = service.size(&requirement(vec![group_b(), group_a()])).unwrap();

    assert_eq!(ab.bandwidth(), ba.bandwidth());
    assert_eq!(ab.storage_tb(), ba.storage_tb());
    assert_eq!(ab.server_spec(), ba.server_spec());
}

#[test]
fn storage_uses_the_longest_schedule() {
    let service = RequirementSizingService::default();
    let mut short = group_b();
    short.retention_days = 7;
    short.record_hour = 8.0;
    let mut long = group_b();
    long.retention_days = 60;
    long.record_hour = 24.0;

    let record = service.size(&requirement(vec![short, long])).unwrap();
    let expected = storage_tb(4.0 * 4.096, 60, 24.0).unwrap();
    assert!((record.storage_tb() - expected).abs() < 1e-9);
}

#[test]
fn invalid_inputs_are_rejected() {
    let service = RequirementSizingService::default();

    assert_matches!(
        service.size(&requirement(vec![])),
        Err(SizingError::EmptyRequirement)
    );

    let mut hours = group_a();
    hours.record_hour = 25.0;
    assert_matches!(
        service.size(&requirement(vec![hours])),
        Err(SizingError::InvalidSizingInput(_))
    );

    let mut retention = group_a();
    retention.retention_days = 0;
    assert_matches!(
        service.size(&requirement(vec![retention])),
        Err(SizingError::InvalidSizingInput(_))
    );

    let mut resolution = group_a();
    resolution.resolution = "7MP".into();
    assert_matches!(
        service.size(&requirement(vec![resolution, group_b()])),
        Err(SizingError::UnsupportedParameter { parameter: "resolution", .. })
    );
}

#[test]
fn record_serializes_flat_and_reads_back() {
    let record = RequirementSizingService::default()
        .size(&requirement(vec![group_a(), group_b()]))
        .unwrap();

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["customer_name"], "Acme Corp");
    assert_eq!(json["camera_configs"].as_array().unwrap().len(), 2);
    assert_eq!(json["server_spec"]["tier"], "small");
    assert_eq!(json["group_breakdown"][1]["source"], "explicit");
    assert!(json["camera_configs"][0].get("bitrate_kbps").is_none());

    let back: SizingRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back.id(), record.id());
    assert_eq!(back.created_at(), record.created_at());
    assert_eq!(back.requirement(), record.requirement());
    assert_eq!(back.server_spec(), record.server_spec());
}

#[test]
fn report_lists_totals_and_hardware() {
    let record = RequirementSizingService::default()
        .size(&requirement(vec![group_a(), group_b()]))
        .unwrap();
    let text = record.to_string();

    assert!(text.starts_with("=== VMS Sizing Report ==="));
    assert!(text.contains("Customer: Acme Corp"));
    assert!(text.contains("= Total bandwidth:    16.75 Mbps"));
    assert!(text.contains("= Recording storage:  5.43 TB"));
    assert!(text.contains("HDD total:            8.00 TB"));
    assert!(text.contains("(est.)"));
}

#[test]
fn sized_record_is_found_by_its_own_fields() {
    let service = RequirementSizingService::default();
    let target = service.size(&requirement(vec![group_a()])).unwrap();
    let mut other_req = requirement(vec![group_b()]);
    other_req.customer_name = "Globex".into();
    let other = service.size(&other_req).unwrap();

    let records = vec![target.clone(), other];
    let results = search_records(&records, &build(&SearchCriteria::exact_for(&target)));

    assert_eq!(results.count, 1);
    assert_eq!(results.results[0].id, target.id());
}

#[test]
fn search_with_inverted_dates_finds_nothing() {
    let record = RequirementSizingService::default()
        .size(&requirement(vec![group_a()]))
        .unwrap();
    let now = Utc::now();
    let criteria = SearchCriteria {
        start_date: Some(now),
        end_date: Some(now - chrono::Duration::days(1)),
        ..Default::default()
    };

    assert_eq!(search_records([&record], &build(&criteria)).count, 0);
}
