// src/profile/quality.rs
use crate::profile::validator::{
    categorize, is_truthy, truthy_field, validate, IssueCategory, ValidationIssue, MIN_SUMMARY_CHARS,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const COMPLETENESS_WEIGHT: f64 = 0.6;
const INTEGRITY_WEIGHT: f64 = 0.4;
const PENALTY_PER_ISSUE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl QualityStatus {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 95.0 => QualityStatus::Excellent,
            s if s >= 80.0 => QualityStatus::Good,
            s if s >= 60.0 => QualityStatus::Fair,
            s if s >= 40.0 => QualityStatus::Poor,
            _ => QualityStatus::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityStatus::Excellent => "Excellent",
            QualityStatus::Good => "Good",
            QualityStatus::Fair => "Fair",
            QualityStatus::Poor => "Poor",
            QualityStatus::Critical => "Critical",
        }
    }
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub overall_score: f64,
    pub completeness_pct: f64,
    pub data_integrity_score: f64,
    pub is_valid: bool,
    pub issue_count: usize,
    pub categories: BTreeMap<IssueCategory, Vec<ValidationIssue>>,
    pub status: QualityStatus,
    pub validation_status: String,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Each issue costs ten points, floored at zero.
pub fn completeness_pct(issue_count: usize) -> f64 {
    (100.0 - issue_count as f64 * PENALTY_PER_ISSUE).max(0.0)
}

/// Share of structural checks passed. A check is only attempted when its
/// top-level field is present and truthy; no attempted checks scores zero.
pub fn integrity_score(profile: Option<&Value>) -> f64 {
    let Some(profile) = profile else {
        return 0.0;
    };

    let checks: [(&str, fn(&Value) -> bool); 4] = [
        ("financial_metrics", |v| v.as_object().is_some_and(|m| !m.is_empty())),
        ("ai_analysis", |v| {
            v.get("summary")
                .and_then(Value::as_str)
                .is_some_and(|s| s.trim().chars().count() > MIN_SUMMARY_CHARS)
        }),
        ("trend_analysis", |v| (v.is_object() || v.is_array()) && is_truthy(v)),
        ("filing_metadata", |v| {
            v.get("total_filings")
                .and_then(Value::as_f64)
                .is_some_and(|n| n > 0.0)
        }),
    ];

    let mut attempted = 0;
    let mut passed = 0;
    for (field, check) in checks {
        if let Some(value) = truthy_field(profile, field) {
            attempted += 1;
            if check(value) {
                passed += 1;
            } else {
                tracing::trace!("Integrity check failed for {}", field);
            }
        }
    }

    if attempted == 0 {
        return 0.0;
    }
    100.0 * passed as f64 / attempted as f64
}

/// Scores a profile 0-100 from validation issues and structural integrity.
pub fn analyze(profile: Option<&Value>) -> QualityMetrics {
    let outcome = validate(profile);
    let issue_count = outcome.issues.len();

    let completeness = completeness_pct(issue_count);
    let integrity = integrity_score(profile);
    let overall = round1(completeness * COMPLETENESS_WEIGHT + integrity * INTEGRITY_WEIGHT);

    QualityMetrics {
        overall_score: overall,
        completeness_pct: completeness,
        data_integrity_score: integrity,
        is_valid: outcome.is_valid,
        issue_count,
        categories: categorize(&outcome.issues),
        status: QualityStatus::from_score(overall),
        validation_status: outcome.status,
    }
}

/// Invalid profiles, and valid ones scoring under `threshold`, should be rebuilt.
pub fn needs_regeneration(metrics: &QualityMetrics, threshold: f64) -> bool {
    !metrics.is_valid || metrics.overall_score < threshold
}
