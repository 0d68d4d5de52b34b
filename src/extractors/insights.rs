// src/extractors/insights.rs
use crate::extractors::section::{ItemId, Section};
use std::collections::BTreeMap;

pub const CYBERSECURITY_RISK: &str = "Cybersecurity risk disclosed in Risk Factors";
pub const LITIGATION_RISK: &str = "Litigation risk disclosed in Risk Factors";
pub const REVENUE_EMPHASIS: &str = "MD&A emphasizes revenue performance";
pub const CASH_FLOW_DISCUSSION: &str = "MD&A discusses cash flow";

/// Fixed-vocabulary flags drawn from Risk Factors (1A) and MD&A (7), in a fixed order.
pub fn extract_insights(sections: &BTreeMap<ItemId, Section>) -> Vec<String> {
    let lowered = |item: ItemId| {
        sections
            .get(&item)
            .map(|s| s.text.to_lowercase())
            .unwrap_or_default()
    };
    let risk_text = lowered(ItemId::RiskFactors);
    let mdna_text = lowered(ItemId::Mdna);

    let mut insights = Vec::new();
    if risk_text.contains("cyber") {
        insights.push(CYBERSECURITY_RISK.to_string());
    }
    if risk_text.contains("litigation") || risk_text.contains("lawsuit") {
        insights.push(LITIGATION_RISK.to_string());
    }
    if mdna_text.contains("revenue") {
        insights.push(REVENUE_EMPHASIS.to_string());
    }
    // Both words anywhere in MD&A, not necessarily the phrase "cash flow"
    if mdna_text.contains("cash") && mdna_text.contains("flow") {
        insights.push(CASH_FLOW_DISCUSSION.to_string());
    }

    tracing::debug!("Extracted {} insights", insights.len());
    insights
}
