// src/report/aggregator.rs
use crate::edgar::models::FilingDescriptor;
use crate::extractors::{extract_insights, segment, ItemId, Section};
use crate::report::ContentFetcher;
use serde::Serialize;
use std::collections::BTreeMap;

const ANNUAL_FAMILY: &[&str] = &["10-K", "10-Q"];

/// Keyword whose mentions are totalled across filings in the section aggregates.
const AGGREGATE_KEYWORD: &str = "risk";

pub const NO_QUALIFYING_FILINGS: &str = "No 10-K or 10-Q filings available for analysis";

// --- Data Structures ---
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub form: String,
    pub filing_date: String,
    pub report_date: String,
    pub accession_number: String,
    pub available: bool,
    pub sections: BTreeMap<ItemId, Section>,
    pub insights: Vec<String>,
}

/// Cross-filing statistics for one section. `sections_analyzed` is only
/// present when at least one filing had text for that section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionAggregate {
    pub average_word_count: u64,
    pub keyword_mentions: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections_analyzed: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    pub total_reports: usize,
    pub forms_seen: BTreeMap<String, usize>,
    pub reports: Vec<Report>,
    pub risk_summary: SectionAggregate,
    pub mdna_summary: SectionAggregate,
    pub warnings: Vec<String>,
}

/// Collapses amendments ("10-K/A", "10-KT") onto their family; anything else passes through.
pub fn normalize_form(form: &str) -> String {
    ANNUAL_FAMILY
        .iter()
        .find(|family| form.starts_with(*family))
        .map(|family| family.to_string())
        .unwrap_or_else(|| form.to_string())
}

fn is_annual_family(form: &str) -> bool {
    ANNUAL_FAMILY.iter().any(|family| form.starts_with(family))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Analyzes the most recent 10-K/10-Q filings, at most `max_reports_per_form` per family.
///
/// Skips filings without an accession number or CIK (with a warning). A failed
/// fetch yields an unavailable report with empty sections rather than an error.
pub async fn parse(
    filings: &[FilingDescriptor],
    max_reports_per_form: usize,
    fetcher: &dyn ContentFetcher,
) -> ParseResult {
    let mut candidates: Vec<&FilingDescriptor> =
        filings.iter().filter(|f| is_annual_family(&f.form)).collect();

    if candidates.is_empty() {
        tracing::warn!("{} (received {} filings)", NO_QUALIFYING_FILINGS, filings.len());
        return ParseResult {
            warnings: vec![NO_QUALIFYING_FILINGS.to_string()],
            ..ParseResult::default()
        };
    }

    // ISO dates order chronologically as strings; newest first
    candidates.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));
    tracing::info!(
        "Analyzing up to {} reports per form from {} candidate filings",
        max_reports_per_form,
        candidates.len()
    );

    let mut forms_seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut reports = Vec::new();
    let mut warnings = Vec::new();

    for filing in candidates {
        let family = normalize_form(&filing.form);
        let retained = forms_seen.get(&family).copied().unwrap_or(0);
        if retained >= max_reports_per_form {
            tracing::debug!("Cap reached for {}, skipping filing dated {}", family, filing.filing_date);
            continue;
        }

        let (Some(accession), Some(cik)) = (non_empty(&filing.accession_number), non_empty(&filing.cik)) else {
            let warning = format!(
                "Skipping {} filed {}: missing accession number or CIK",
                filing.form, filing.filing_date
            );
            tracing::warn!("{}", warning);
            warnings.push(warning);
            continue;
        };

        let content = match fetcher.fetch_content(cik, accession).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to fetch {} for CIK {}: {}", accession, cik, e);
                String::new()
            }
        };

        reports.push(build_report(filing, family.clone(), accession, &content));
        *forms_seen.entry(family).or_insert(0) += 1;
    }

    let risk_summary = summarize_section(&reports, ItemId::RiskFactors);
    let mdna_summary = summarize_section(&reports, ItemId::Mdna);

    tracing::info!("Built {} reports ({} warnings)", reports.len(), warnings.len());
    ParseResult {
        total_reports: reports.len(),
        forms_seen,
        reports,
        risk_summary,
        mdna_summary,
        warnings,
    }
}

fn build_report(filing: &FilingDescriptor, form: String, accession: &str, content: &str) -> Report {
    let sections = segment(Some(content));
    let insights = extract_insights(&sections);
    tracing::debug!(
        "Report {} ({}): {} insights, available={}",
        accession,
        form,
        insights.len(),
        !content.is_empty()
    );

    Report {
        form,
        filing_date: filing.filing_date.clone(),
        report_date: filing.report_date.clone(),
        accession_number: accession.to_string(),
        available: !content.is_empty(),
        sections,
        insights,
    }
}

/// Averages word counts and totals "risk" mentions over reports where `item` has text.
fn summarize_section(reports: &[Report], item: ItemId) -> SectionAggregate {
    let analyzed: Vec<&Section> = reports
        .iter()
        .filter_map(|r| r.sections.get(&item))
        .filter(|s| s.summary.word_count > 0)
        .collect();

    if analyzed.is_empty() {
        return SectionAggregate::default();
    }

    let total_words: usize = analyzed.iter().map(|s| s.summary.word_count).sum();
    let mentions: usize = analyzed
        .iter()
        .map(|s| s.summary.keyword_count(AGGREGATE_KEYWORD))
        .sum();
    let average = (total_words as f64 / analyzed.len() as f64).round_ties_even();

    SectionAggregate {
        average_word_count: average as u64,
        keyword_mentions: mentions as u64,
        sections_analyzed: Some(analyzed.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EdgarError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-memory fetcher; unknown accessions fail like a 404 would.
    struct StubFetcher {
        documents: HashMap<String, String>,
    }

    impl StubFetcher {
        fn new(documents: &[(&str, &str)]) -> Self {
            Self {
                documents: documents
                    .iter()
                    .map(|(acc, text)| (acc.to_string(), text.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl ContentFetcher for StubFetcher {
        async fn fetch_content(&self, _cik: &str, accession_number: &str) -> Result<String, EdgarError> {
            self.documents
                .get(accession_number)
                .cloned()
                .ok_or_else(|| EdgarError::FilingDocNotFound(accession_number.to_string()))
        }
    }

    fn filing(form: &str, date: &str, accession: Option<&str>) -> FilingDescriptor {
        FilingDescriptor {
            form: form.to_string(),
            filing_date: date.to_string(),
            report_date: String::new(),
            accession_number: accession.map(str::to_string),
            cik: Some("0000320193".to_string()),
        }
    }

    #[test]
    fn test_normalize_form() {
        assert_eq!(normalize_form("10-K"), "10-K");
        assert_eq!(normalize_form("10-K/A"), "10-K");
        assert_eq!(normalize_form("10-Q/A"), "10-Q");
        assert_eq!(normalize_form("8-K"), "8-K");
    }

    #[test]
    fn test_no_annual_filings_returns_single_warning() {
        let fetcher = StubFetcher::new(&[]);
        let filings = vec![filing("8-K", "2024-03-01", Some("a")), filing("S-1", "2023-01-01", Some("b"))];

        let result = tokio_test::block_on(parse(&filings, 3, &fetcher));

        assert_eq!(result.total_reports, 0);
        assert!(result.forms_seen.is_empty());
        assert!(result.reports.is_empty());
        assert_eq!(result.warnings, vec![NO_QUALIFYING_FILINGS.to_string()]);
        assert_eq!(result.risk_summary, SectionAggregate::default());
    }

    #[test]
    fn test_cap_keeps_most_recent_and_normalizes_amendments() {
        let fetcher = StubFetcher::new(&[("old", "Item 1A. risk"), ("new", "Item 1A. new risk")]);
        let filings = vec![
            filing("10-K", "2024-01-01", Some("old")),
            filing("10-K/A", "2025-01-01", Some("new")),
        ];

        let result = tokio_test::block_on(parse(&filings, 1, &fetcher));

        assert_eq!(result.total_reports, 1);
        assert_eq!(result.reports[0].accession_number, "new");
        assert_eq!(result.reports[0].form, "10-K");
        assert_eq!(result.forms_seen.get("10-K"), Some(&1));
        assert!(result.warnings.is_empty(), "capped filings are dropped silently");
    }

    #[test]
    fn test_caps_are_per_family_and_ordered_newest_first() {
        let fetcher = StubFetcher::new(&[("k1", "x"), ("k2", "x"), ("q1", "x"), ("q2", "x"), ("q3", "x")]);
        let filings = vec![
            filing("10-Q", "2024-05-01", Some("q1")),
            filing("10-K", "2023-02-01", Some("k1")),
            filing("10-Q", "2024-08-01", Some("q2")),
            filing("10-K", "2024-02-01", Some("k2")),
            filing("10-Q", "2024-11-01", Some("q3")),
            filing("8-K", "2024-12-01", Some("e1")),
        ];

        let result = tokio_test::block_on(parse(&filings, 2, &fetcher));

        let order: Vec<&str> = result.reports.iter().map(|r| r.accession_number.as_str()).collect();
        assert_eq!(order, vec!["q3", "q2", "k2", "k1"]);
        assert_eq!(result.forms_seen.get("10-Q"), Some(&2));
        assert_eq!(result.forms_seen.get("10-K"), Some(&2));
        assert_eq!(result.total_reports, 4);
    }

    #[test]
    fn test_missing_identifiers_warn_without_consuming_cap() {
        let fetcher = StubFetcher::new(&[("ok", "Item 7. Revenue grew.")]);
        let mut no_cik = filing("10-K", "2025-03-01", Some("no-cik"));
        no_cik.cik = None;
        let filings = vec![
            filing("10-K", "2025-06-01", None),
            no_cik,
            filing("10-K", "2024-03-01", Some("ok")),
        ];

        let result = tokio_test::block_on(parse(&filings, 1, &fetcher));

        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("2025-06-01"));
        assert_eq!(result.total_reports, 1);
        assert_eq!(result.reports[0].accession_number, "ok");
        assert_eq!(result.reports[0].insights, vec![crate::extractors::insights::REVENUE_EMPHASIS]);
    }

    #[test]
    fn test_failed_fetch_yields_unavailable_report() {
        let fetcher = StubFetcher::new(&[]);
        let filings = vec![filing("10-Q", "2024-05-01", Some("missing"))];

        let result = tokio_test::block_on(parse(&filings, 3, &fetcher));

        assert_eq!(result.total_reports, 1);
        let report = &result.reports[0];
        assert!(!report.available);
        assert_eq!(report.sections.len(), 5);
        assert!(report.sections.values().all(|s| s.text.is_empty()));
        assert!(report.insights.is_empty());
        assert!(result.warnings.is_empty(), "fetch failures are not surfaced as warnings");
    }

    #[test]
    fn test_section_aggregates_use_risk_keyword_only() {
        let fetcher = StubFetcher::new(&[
            // 1A: 4 words, 2 risk mentions; 7: 3 words
            ("a", "Item 1A. Risk and more risk\nItem 7. cash revenue growth"),
            // 1A: 3 words, 1 risk mention (inside "risky"); no MD&A
            ("b", "Item 1A. quite risky litigation"),
            // No sections at all
            ("c", "plain text without anchors"),
        ]);
        let filings = vec![
            filing("10-K", "2024-01-01", Some("a")),
            filing("10-K", "2023-01-01", Some("b")),
            filing("10-K", "2022-01-01", Some("c")),
        ];

        let result = tokio_test::block_on(parse(&filings, 5, &fetcher));

        assert_eq!(
            result.risk_summary,
            SectionAggregate {
                average_word_count: 4, // round(3.5) ties to even
                keyword_mentions: 3,
                sections_analyzed: Some(2),
            }
        );
        assert_eq!(
            result.mdna_summary,
            SectionAggregate {
                average_word_count: 3,
                keyword_mentions: 0,
                sections_analyzed: Some(1),
            }
        );
    }

    #[test]
    fn test_empty_aggregate_omits_sections_analyzed() {
        let json = serde_json::to_value(SectionAggregate::default()).unwrap();
        assert_eq!(json, serde_json::json!({"average_word_count": 0, "keyword_mentions": 0}));
    }
}
