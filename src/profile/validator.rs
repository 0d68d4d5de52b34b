// src/profile/validator.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const REQUIRED_FIELDS: &[&str] = &["cik", "company_info", "filing_metadata", "generated_at"];
const COMPANY_INFO_FIELDS: &[&str] = &["ticker", "name", "cik"];
pub(crate) const MIN_SUMMARY_CHARS: usize = 20;

pub const STATUS_VALID: &str = "VALID";
pub const STATUS_NULL: &str = "NULL_PROFILE";

/// Issue buckets. Declaration order is the matching priority used by [`categorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCategory {
    Incomplete,
    OutOfOrder,
    Inconsistent,
    Improper,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 4] = [
        IssueCategory::Incomplete,
        IssueCategory::OutOfOrder,
        IssueCategory::Inconsistent,
        IssueCategory::Improper,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            IssueCategory::Incomplete => "INCOMPLETE",
            IssueCategory::OutOfOrder => "OUT_OF_ORDER",
            IssueCategory::Inconsistent => "INCONSISTENT",
            IssueCategory::Improper => "IMPROPER",
        }
    }

    /// Category of a tagged issue text: first tag found in priority order, else Improper.
    pub fn of_text(text: &str) -> Self {
        [
            IssueCategory::Incomplete,
            IssueCategory::OutOfOrder,
            IssueCategory::Inconsistent,
        ]
        .into_iter()
        .find(|category| text.contains(category.tag()))
        .unwrap_or(IssueCategory::Improper)
    }
}

/// A validation finding, rendered as "<TAG>: <message>".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationIssue(String);

impl ValidationIssue {
    pub fn new(category: IssueCategory, message: impl fmt::Display) -> Self {
        Self(format!("{}: {}", category.tag(), message))
    }

    pub fn category(&self) -> IssueCategory {
        IssueCategory::of_text(&self.0)
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub status: String,
    pub issues: Vec<ValidationIssue>,
}

// --- Value helpers ---

/// Python-style truthiness: null, false, zero, and empty strings/arrays/objects are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Field value when present and truthy.
pub(crate) fn truthy_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| is_truthy(v))
}

fn is_missing(value: &Value, key: &str) -> bool {
    value.get(key).map_or(true, Value::is_null)
}

/// Accepts RFC 3339 timestamps, naive "T" or space separated datetimes, and plain dates.
/// Offsets are normalized to UTC.
pub fn parse_iso_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn timestamp_of(value: &Value) -> Option<NaiveDateTime> {
    value.as_str().and_then(parse_iso_timestamp)
}

// --- Checks ---
// Each check appends zero or more issues; `validate` runs them in a fixed order.

fn check_required_fields(profile: &Value, issues: &mut Vec<ValidationIssue>) {
    for field in REQUIRED_FIELDS {
        if is_missing(profile, field) {
            issues.push(ValidationIssue::new(
                IssueCategory::Incomplete,
                format!("missing required field '{}'", field),
            ));
        }
    }
}

fn check_company_info(profile: &Value, issues: &mut Vec<ValidationIssue>) {
    let Some(info) = truthy_field(profile, "company_info") else {
        return;
    };
    if !info.is_object() {
        issues.push(ValidationIssue::new(
            IssueCategory::Inconsistent,
            "company_info is not a mapping",
        ));
        return;
    }
    for field in COMPANY_INFO_FIELDS {
        if truthy_field(info, field).is_none() {
            issues.push(ValidationIssue::new(
                IssueCategory::Incomplete,
                format!("company_info.{} is missing", field),
            ));
        }
    }
}

fn check_filing_metadata(profile: &Value, issues: &mut Vec<ValidationIssue>) {
    let Some(metadata) = truthy_field(profile, "filing_metadata") else {
        return;
    };
    if !metadata.is_object() {
        issues.push(ValidationIssue::new(
            IssueCategory::Inconsistent,
            "filing_metadata is not a mapping",
        ));
        return;
    }

    for field in ["oldest_filing", "most_recent_filing", "total_filings"] {
        if is_missing(metadata, field) {
            issues.push(ValidationIssue::new(
                IssueCategory::Incomplete,
                format!("filing_metadata.{} is missing", field),
            ));
        }
    }

    // Unparsable dates are already reported (or tolerated) by the presence checks
    let (Some(oldest), Some(recent)) = (metadata.get("oldest_filing"), metadata.get("most_recent_filing")) else {
        return;
    };
    if let (Some(oldest_ts), Some(recent_ts)) = (timestamp_of(oldest), timestamp_of(recent)) {
        if oldest_ts > recent_ts {
            issues.push(ValidationIssue::new(
                IssueCategory::OutOfOrder,
                format!(
                    "oldest_filing {} is after most_recent_filing {}",
                    oldest.as_str().unwrap_or_default(),
                    recent.as_str().unwrap_or_default()
                ),
            ));
        }
    }
}

/// `report_absent` is false for a record with none of the required fields,
/// which is already fully described by the presence check.
fn check_financial_metrics(profile: &Value, report_absent: bool, issues: &mut Vec<ValidationIssue>) {
    let metrics = match profile.get("financial_metrics") {
        None | Some(Value::Null) => {
            if report_absent {
                issues.push(ValidationIssue::new(
                    IssueCategory::Incomplete,
                    "financial_metrics is missing",
                ));
            }
            return;
        }
        Some(metrics) => metrics,
    };

    let Some(map) = metrics.as_object() else {
        issues.push(ValidationIssue::new(
            IssueCategory::Incomplete,
            "financial_metrics is not a mapping",
        ));
        return;
    };
    if map.is_empty() {
        issues.push(ValidationIssue::new(
            IssueCategory::Incomplete,
            "financial_metrics is empty - no financial data extracted",
        ));
        return;
    }

    if truthy_field(metrics, "revenue_data").is_none() {
        issues.push(ValidationIssue::new(
            IssueCategory::Incomplete,
            "financial_metrics.revenue_data is missing or empty",
        ));
    }
    if truthy_field(metrics, "profitability_metrics").is_none() {
        issues.push(ValidationIssue::new(
            IssueCategory::Incomplete,
            "financial_metrics.profitability_metrics is missing or empty",
        ));
    }
}

fn check_ai_analysis(profile: &Value, issues: &mut Vec<ValidationIssue>) {
    let Some(analysis) = profile.get("ai_analysis") else {
        return; // optional
    };
    if !is_truthy(analysis) {
        issues.push(ValidationIssue::new(IssueCategory::Improper, "empty ai_analysis"));
        return;
    }
    if !analysis.is_object() {
        issues.push(ValidationIssue::new(
            IssueCategory::Improper,
            "ai_analysis is not a mapping",
        ));
        return;
    }

    let summary_len = analysis
        .get("summary")
        .and_then(Value::as_str)
        .map_or(0, |s| s.trim().chars().count());
    if summary_len < MIN_SUMMARY_CHARS {
        issues.push(ValidationIssue::new(
            IssueCategory::Improper,
            format!(
                "ai_analysis.summary is missing or shorter than {} characters",
                MIN_SUMMARY_CHARS
            ),
        ));
    }

    let has_insights = analysis
        .get("key_insights")
        .and_then(Value::as_array)
        .is_some_and(|list| !list.is_empty());
    if !has_insights {
        issues.push(ValidationIssue::new(
            IssueCategory::Improper,
            "ai_analysis.key_insights is missing or empty",
        ));
    }
}

fn check_generated_at(profile: &Value, issues: &mut Vec<ValidationIssue>) {
    let Some(generated_at) = truthy_field(profile, "generated_at") else {
        return;
    };
    if timestamp_of(generated_at).is_none() {
        issues.push(ValidationIssue::new(
            IssueCategory::Inconsistent,
            format!("generated_at is not an ISO timestamp: {}", generated_at),
        ));
    }
}

fn status_label(issues: &[ValidationIssue]) -> String {
    let mut incomplete = 0;
    let mut improper = 0;
    let mut other = 0;
    for issue in issues {
        match issue.category() {
            IssueCategory::Incomplete => incomplete += 1,
            IssueCategory::Improper => improper += 1,
            IssueCategory::OutOfOrder | IssueCategory::Inconsistent => other += 1,
        }
    }

    [(incomplete, "incomplete"), (improper, "improper"), (other, "other")]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Runs the full battery of profile checks in a fixed order.
pub fn validate(profile: Option<&Value>) -> ValidationOutcome {
    let profile = match profile {
        None | Some(Value::Null) => {
            return ValidationOutcome {
                is_valid: false,
                status: STATUS_NULL.to_string(),
                issues: vec![ValidationIssue::new(IssueCategory::Incomplete, "profile is null")],
            };
        }
        Some(profile) => profile,
    };

    let bare = REQUIRED_FIELDS.iter().all(|field| is_missing(profile, field));

    let mut issues = Vec::new();
    check_required_fields(profile, &mut issues);
    check_company_info(profile, &mut issues);
    check_filing_metadata(profile, &mut issues);
    check_financial_metrics(profile, !bare, &mut issues);
    check_ai_analysis(profile, &mut issues);
    check_generated_at(profile, &mut issues);

    if issues.is_empty() {
        return ValidationOutcome {
            is_valid: true,
            status: STATUS_VALID.to_string(),
            issues,
        };
    }

    tracing::debug!("Profile validation found {} issues", issues.len());
    ValidationOutcome {
        is_valid: false,
        status: status_label(&issues),
        issues,
    }
}

/// Partitions issues by category. Every category is present, possibly empty.
pub fn categorize(issues: &[ValidationIssue]) -> BTreeMap<IssueCategory, Vec<ValidationIssue>> {
    let mut buckets: BTreeMap<IssueCategory, Vec<ValidationIssue>> =
        IssueCategory::ALL.iter().map(|c| (*c, Vec::new())).collect();
    for issue in issues {
        buckets.entry(issue.category()).or_default().push(issue.clone());
    }
    buckets
}
