// src/extractors/section.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

// --- Constants ---
const SNIPPET_CHARS: usize = 256;

/// Fixed vocabulary counted in every section. Matching is substring-based, not word-bounded.
pub const KEYWORD_TERMS: &[&str] = &[
    "risk",
    "revenue",
    "growth",
    "cash",
    "debt",
    "litigation",
    "cyber",
    "competition",
    "regulation",
    "liquidity",
];

/// Canonical disclosure items, declared in document order.
/// The derived `Ord` follows that order, so maps keyed by `ItemId` iterate canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ItemId {
    #[serde(rename = "1")]
    Business,
    #[serde(rename = "1A")]
    RiskFactors,
    #[serde(rename = "7")]
    Mdna,
    #[serde(rename = "7A")]
    MarketRisk,
    #[serde(rename = "8")]
    FinancialStatements,
}

impl ItemId {
    pub const ALL: [ItemId; 5] = [
        ItemId::Business,
        ItemId::RiskFactors,
        ItemId::Mdna,
        ItemId::MarketRisk,
        ItemId::FinancialStatements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemId::Business => "1",
            ItemId::RiskFactors => "1A",
            ItemId::Mdna => "7",
            ItemId::MarketRisk => "7A",
            ItemId::FinancialStatements => "8",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ItemId::Business => "Business",
            ItemId::RiskFactors => "Risk Factors",
            ItemId::Mdna => {
                "Management's Discussion and Analysis of Financial Condition and Results of Operations"
            }
            ItemId::MarketRisk => "Quantitative and Qualitative Disclosures About Market Risk",
            ItemId::FinancialStatements => "Financial Statements and Supplementary Data",
        }
    }
}

// --- Data Structures ---
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub word_count: usize,
    pub keyword_counts: BTreeMap<&'static str, usize>,
    pub snippet: String,
}

impl SectionSummary {
    /// Count for one vocabulary term; unknown terms count as zero.
    pub fn keyword_count(&self, term: &str) -> usize {
        self.keyword_counts.get(term).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub item_id: ItemId,
    pub title: String,
    pub text: String,
    pub summary: SectionSummary,
}

// --- Regex Patterns (Lazy Static) ---
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Per item: the start anchor, and the stop anchor built from the items that follow it.
/// The last item has no stop anchor and runs to the end of the text.
static ITEM_PATTERNS: Lazy<Vec<(ItemId, Regex, Option<Regex>)>> = Lazy::new(|| {
    let order = ItemId::ALL;
    order
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let start = Regex::new(&anchor_pattern(&[*item])).unwrap();
            let later = &order[idx + 1..];
            let stop = (!later.is_empty()).then(|| Regex::new(&anchor_pattern(later)).unwrap());
            (*item, start, stop)
        })
        .collect()
});

/// "Item <id>" followed by punctuation, a dash, whitespace or the end of text,
/// so "Item 1" never matches "Item 1A" or "Item 10".
fn anchor_pattern(items: &[ItemId]) -> String {
    let ids = items
        .iter()
        .map(|item| regex::escape(item.as_str()))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"(?i)\bitem\s+(?:{})(?:[\.:\-–—\s]|$)", ids)
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Text of one item: everything after its first anchor up to the first later-item anchor.
fn extract_item_text(text: &str, start: &Regex, stop: Option<&Regex>) -> String {
    let Some(anchor) = start.find(text) else {
        return String::new();
    };
    let body = &text[anchor.end()..];
    let end = stop
        .and_then(|re| re.find(body))
        .map(|m| m.start())
        .unwrap_or(body.len());
    body[..end].trim().to_string()
}

// --- Segmenter & Summarizer ---

/// Splits raw filing text into the five canonical sections.
/// Best effort: malformed text yields empty sections, never an error.
pub fn segment(raw_text: Option<&str>) -> BTreeMap<ItemId, Section> {
    let text = normalize_line_endings(raw_text.unwrap_or_default());

    ITEM_PATTERNS
        .iter()
        .map(|(item, start, stop)| {
            let section_text = extract_item_text(&text, start, stop.as_ref());
            if section_text.is_empty() {
                tracing::debug!("No text found for Item {}", item.as_str());
            } else {
                tracing::trace!("Item {}: {} bytes", item.as_str(), section_text.len());
            }
            let summary = summarize(&section_text);
            (
                *item,
                Section {
                    item_id: *item,
                    title: item.title().to_string(),
                    text: section_text,
                    summary,
                },
            )
        })
        .collect()
}

/// Count of maximal word-character runs.
pub fn word_count(text: &str) -> usize {
    WORD_RE.find_iter(text.trim()).count()
}

/// Case-insensitive, non-overlapping substring occurrences of `term`.
pub fn keyword_count(text: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(&term.to_lowercase()).count()
}

pub fn summarize(text: &str) -> SectionSummary {
    let trimmed = text.trim();

    let keyword_counts = KEYWORD_TERMS
        .iter()
        .map(|term| (*term, keyword_count(trimmed, term)))
        .collect();

    SectionSummary {
        word_count: word_count(trimmed),
        keyword_counts,
        snippet: trimmed.chars().take(SNIPPET_CHARS).collect(),
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_10K: &str = "ANNUAL REPORT\r\n\
        Item 1. Business\r\n\
        We sell widgets and grow revenue.\r\n\
        Item 1A. Risk Factors\r\n\
        Cyber attacks and litigation are a risk. Other risks exist.\r\n\
        Item 7. Management's Discussion\r\n\
        Revenue rose. Cash flow from operations improved.\r\n\
        Item 7A. Market Risk\r\n\
        Interest rate risk.\r\n\
        Item 8. Financial Statements\r\n\
        Balance sheet follows.";

    #[test]
    fn test_segment_always_yields_canonical_sections() {
        for input in [None, Some(""), Some("no anchors here at all"), Some(SAMPLE_10K)] {
            let sections = segment(input);
            let ids: Vec<ItemId> = sections.keys().copied().collect();
            assert_eq!(ids, ItemId::ALL.to_vec());
            for (id, section) in &sections {
                assert_eq!(section.item_id, *id);
                assert_eq!(section.title, id.title());
                assert_eq!(section.summary.keyword_counts.len(), KEYWORD_TERMS.len());
            }
        }
    }

    #[test]
    fn test_segment_splits_sample_filing() {
        let sections = segment(Some(SAMPLE_10K));

        assert_eq!(sections[&ItemId::Business].text, "Business\nWe sell widgets and grow revenue.");
        assert!(sections[&ItemId::RiskFactors].text.starts_with("Risk Factors\nCyber attacks"));
        assert!(!sections[&ItemId::RiskFactors].text.contains("Revenue rose"));
        assert!(sections[&ItemId::Mdna].text.ends_with("Cash flow from operations improved."));
        assert_eq!(sections[&ItemId::MarketRisk].text, "Market Risk\nInterest rate risk.");
        assert_eq!(
            sections[&ItemId::FinancialStatements].text,
            "Financial Statements\nBalance sheet follows."
        );
    }

    #[test]
    fn test_item_7_stops_before_7a() {
        let text = "Item 7. MD&A text here. Item 7A. Market risk text. Item 8. Statements.";
        let sections = segment(Some(text));
        assert_eq!(sections[&ItemId::Mdna].text, "MD&A text here.");
        assert_eq!(sections[&ItemId::MarketRisk].text, "Market risk text.");
    }

    #[test]
    fn test_item_never_stops_at_earlier_item() {
        // Item 1A runs past the later "Item 1." anchor; only 7, 7A and 8 can end it.
        let text = "Item 1A. Risks first. Item 1. Business body. Item 1A: repeated. Item 7. MD&A.";
        let sections = segment(Some(text));
        assert_eq!(sections[&ItemId::Business].text, "Business body.");
        assert_eq!(
            sections[&ItemId::RiskFactors].text,
            "Risks first. Item 1. Business body. Item 1A: repeated."
        );
        assert_eq!(sections[&ItemId::Mdna].text, "MD&A.");
    }

    #[test]
    fn test_anchor_is_case_insensitive_and_ignores_item_10() {
        let text = "ITEM 8 - financial data\nITEM 10. Directors";
        let sections = segment(Some(text));
        assert_eq!(sections[&ItemId::FinancialStatements].text, "- financial data\nITEM 10. Directors");
        assert_eq!(sections[&ItemId::Business].text, "");
    }

    #[test]
    fn test_anchor_accepts_en_and_em_dashes() {
        let text = "Item 1A\u{2014}Risk Factors: cyber risk.\nItem 7\u{2013}MD&A: revenue grew.\nItem 8";
        let sections = segment(Some(text));
        assert_eq!(sections[&ItemId::RiskFactors].text, "Risk Factors: cyber risk.");
        assert_eq!(sections[&ItemId::Mdna].text, "MD&A: revenue grew.");
        assert_eq!(sections[&ItemId::FinancialStatements].text, "");
    }

    #[test]
    fn test_bare_anchor_at_end_of_text_stops_section() {
        let sections = segment(Some("Item 1. Widgets and gadgets. Item 1A"));
        assert_eq!(sections[&ItemId::Business].text, "Widgets and gadgets.");
        assert_eq!(sections[&ItemId::RiskFactors].text, "");
        assert_eq!(segment(Some("Item 10"))[&ItemId::Business].text, "");
    }

    #[test]
    fn test_missing_items_are_empty() {
        let sections = segment(Some("Item 7. Only MD&A is present."));
        assert_eq!(sections[&ItemId::Business].text, "");
        assert_eq!(sections[&ItemId::Business].summary.word_count, 0);
        assert_eq!(sections[&ItemId::Mdna].text, "Only MD&A is present.");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("net-income rose 5.2%"), 5);
    }

    #[test]
    fn test_keyword_count_is_case_insensitive_substring() {
        assert_eq!(keyword_count("RISK risk", "risk"), 2);
        assert_eq!(keyword_count("Risky business; riskier still", "risk"), 2);
        assert_eq!(keyword_count("anything", ""), 0);
    }

    #[test]
    fn test_summarize_empty_input() {
        let summary = summarize("");
        assert_eq!(summary.word_count, 0);
        assert_eq!(summary.snippet, "");
        assert!(summary.keyword_counts.values().all(|c| *c == 0));
    }

    #[test]
    fn test_summarize_counts_and_snippet() {
        let long_text = format!("  Cyber risk. {}", "é".repeat(400));
        let summary = summarize(&long_text);
        assert_eq!(summary.keyword_count("cyber"), 1);
        assert_eq!(summary.keyword_count("risk"), 1);
        assert_eq!(summary.keyword_count("unknown"), 0);
        assert_eq!(summary.snippet.chars().count(), 256);
        assert!(summary.snippet.starts_with("Cyber risk."));
    }
}
