//! Search criteria over stored sizing records.
//!
//! [`build`] turns loosely-specified [`SearchCriteria`] into a [`Predicate`].
//! A predicate can be evaluated in memory ([`Predicate::matches`]) or rendered
//! into a document-store filter ([`Predicate::to_filter_document`]); both
//! readings agree.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::model::SizingRecord;
use crate::report::RecordSummary;

/// Request-level search parameters. Every field is optional; an absent (or
/// blank) field puts no constraint on its dimension. Exact-match values are
/// compared as given, surrounding whitespace included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    /// Free text matched case-insensitively against every text field.
    pub query: Option<String>,
    pub customer_name: Option<String>,
    pub project_name: Option<String>,
    pub location: Option<String>,
    pub assigned_person: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl SearchCriteria {
    /// Criteria pinning every exact-match field to the record's own values.
    pub fn exact_for(record: &SizingRecord) -> Self {
        Self {
            customer_name: Some(record.customer_name().to_string()),
            project_name: Some(record.project_name().to_string()),
            location: Some(record.location().to_string()),
            assigned_person: Some(record.assigned_person().to_string()),
            ..Self::default()
        }
    }
}

/// Text fields of a record that criteria can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    CustomerName,
    ProjectName,
    Location,
    AssignedPerson,
}

impl SearchField {
    /// Fields the free-text query is matched against.
    pub const FREE_TEXT: [SearchField; 4] = [
        Self::CustomerName,
        Self::ProjectName,
        Self::Location,
        Self::AssignedPerson,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::CustomerName => "customer_name",
            Self::ProjectName => "project_name",
            Self::Location => "location",
            Self::AssignedPerson => "assigned_person",
        }
    }

    fn value_of(self, record: &SizingRecord) -> &str {
        match self {
            Self::CustomerName => record.customer_name(),
            Self::ProjectName => record.project_name(),
            Self::Location => record.location(),
            Self::AssignedPerson => record.assigned_person(),
        }
    }
}

/// Composable matching condition over sizing records.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record.
    All,
    /// Matches no record.
    Nothing,
    /// Exact, case-sensitive equality.
    Equals { field: SearchField, value: String },
    /// Case-insensitive substring.
    Contains { field: SearchField, needle: String },
    /// `created_at` within the inclusive bounds supplied; an absent bound is open.
    CreatedBetween {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

/// Blank values count as absent. Non-blank ones are returned untouched.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Renders a bound the way `created_at` is stored, as an Extended JSON date.
fn date_bound(at: &DateTime<Utc>) -> Value {
    json!({ "$date": at.to_rfc3339_opts(SecondsFormat::AutoSi, true) })
}

/// Composes criteria into a single predicate.
///
/// - Exact-match fields present are ANDed.
/// - `query` is ORed across [`SearchField::FREE_TEXT`] and ANDed with the rest.
/// - Either date bounds `created_at`.
/// - No criteria at all yields [`Predicate::All`].
/// - `end_date < start_date` yields [`Predicate::Nothing`] rather than an error.
///
/// # Examples
///
/// ```
/// use vms_sizer::{build, Predicate, SearchCriteria};
///
/// assert_eq!(build(&SearchCriteria::default()), Predicate::All);
/// ```
pub fn build(criteria: &SearchCriteria) -> Predicate {
    if let (Some(start), Some(end)) = (criteria.start_date, criteria.end_date) {
        if end < start {
            return Predicate::Nothing;
        }
    }

    let mut clauses = Vec::new();

    if let Some(query) = present(&criteria.query).map(str::trim) {
        clauses.push(Predicate::Or(
            SearchField::FREE_TEXT
                .iter()
                .map(|&field| Predicate::Contains {
                    field,
                    needle: query.to_string(),
                })
                .collect(),
        ));
    }

    let exact = [
        (SearchField::CustomerName, &criteria.customer_name),
        (SearchField::ProjectName, &criteria.project_name),
        (SearchField::Location, &criteria.location),
        (SearchField::AssignedPerson, &criteria.assigned_person),
    ];
    for (field, value) in exact {
        if let Some(value) = present(value) {
            clauses.push(Predicate::Equals {
                field,
                value: value.to_string(),
            });
        }
    }

    if criteria.start_date.is_some() || criteria.end_date.is_some() {
        clauses.push(Predicate::CreatedBetween {
            start: criteria.start_date,
            end: criteria.end_date,
        });
    }

    match clauses.len() {
        0 => Predicate::All,
        1 => clauses.remove(0),
        _ => Predicate::And(clauses),
    }
}

impl Predicate {
    pub fn matches(&self, record: &SizingRecord) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::Equals { field, value } => field.value_of(record) == value.as_str(),
            Self::Contains { field, needle } => field
                .value_of(record)
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Self::CreatedBetween { start, end } => {
                let at = record.created_at();
                start.is_none_or(|s| at >= s) && end.is_none_or(|e| at <= e)
            }
            Self::And(clauses) => clauses.iter().all(|c| c.matches(record)),
            Self::Or(clauses) => clauses.iter().any(|c| c.matches(record)),
        }
    }

    /// Renders the predicate as a MongoDB-style filter document.
    ///
    /// Free text becomes an escaped, case-insensitive `$regex`, so user input
    /// is always matched literally. Date bounds are `{"$date": ...}` values in
    /// the same RFC 3339 form (`Z` suffix) a serialized record carries.
    pub fn to_filter_document(&self) -> Value {
        match self {
            Self::All => json!({}),
            Self::Nothing => json!({ "_id": { "$in": [] } }),
            Self::Equals { field, value } => json!({ field.key(): value }),
            Self::Contains { field, needle } => json!({
                field.key(): { "$regex": escape_regex(needle), "$options": "i" }
            }),
            Self::CreatedBetween { start, end } => {
                let mut range = Map::new();
                if let Some(start) = start {
                    range.insert("$gte".into(), date_bound(start));
                }
                if let Some(end) = end {
                    range.insert("$lte".into(), date_bound(end));
                }
                json!({ "created_at": range })
            }
            Self::And(clauses) => json!({
                "$and": clauses.iter().map(Self::to_filter_document).collect::<Vec<_>>()
            }),
            Self::Or(clauses) => json!({
                "$or": clauses.iter().map(Self::to_filter_document).collect::<Vec<_>>()
            }),
        }
    }
}

fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Response shape of a record search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub count: usize,
    pub results: Vec<RecordSummary>,
}

/// Filters `records` through `predicate`, newest first.
pub fn search_records<'a>(
    records: impl IntoIterator<Item = &'a SizingRecord>,
    predicate: &Predicate,
) -> SearchResults {
    let mut matched: Vec<&SizingRecord> = records
        .into_iter()
        .filter(|r| predicate.matches(r))
        .collect();
    matched.sort_by_key(|r| std::cmp::Reverse(r.created_at()));

    let results: Vec<RecordSummary> = matched.into_iter().map(RecordSummary::from).collect();
    SearchResults {
        count: results.len(),
        results,
    }
}
