#![doc = include_str!("../README.md")]

pub mod bandwidth;
pub mod bitrate;
pub mod config;
pub mod error;
pub mod model;
pub mod recommend;
pub mod report;
pub mod search;
pub mod service;
pub mod storage;

pub use bandwidth::{aggregate, total_camera_count};
pub use bitrate::{estimate, fill_missing_bitrates, BitrateTable, EffectiveGroup};
pub use config::{PolicyError, SizingPolicy, POLICY_ENV_VAR};
pub use error::{SizingError, SizingResult};
pub use model::{
    BitrateSource, CameraGroup, Codec, GroupBreakdown, Resolution, ServerSpec, SizingRecord,
    SizingRequirement,
};
pub use recommend::{recommend, DiskPolicy, NicRule, RecommendationPolicy, TierRule};
pub use report::RecordSummary;
pub use search::{build, search_records, Predicate, SearchCriteria, SearchField, SearchResults};
pub use service::RequirementSizingService;
pub use storage::{governing_record_hours, governing_retention_days, storage_tb};
