// src/edgar/models.rs
use serde::{Deserialize, Serialize};

/// Subset of the EDGAR company submission index we rely on.
/// Example: https://data.sec.gov/submissions/CIK0000320193.json
#[derive(Debug, Deserialize)]
pub struct CompanySubmission {
    pub cik: String,
    pub name: String,
    pub filings: Filings,
}

#[derive(Debug, Deserialize)]
pub struct Filings {
    pub recent: FilingsList,
}

/// Column-oriented filing list: index `i` of every vector describes the same filing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingsList {
    #[serde(default)]
    pub accession_number: Vec<String>,
    #[serde(default)]
    pub filing_date: Vec<String>,
    #[serde(default)]
    pub report_date: Vec<String>,
    #[serde(default)]
    pub form: Vec<String>,
}

/// One filing as handed to the report aggregator.
/// Accession number and CIK may be missing in hand-assembled descriptor files;
/// the aggregator warns about and skips those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingDescriptor {
    pub form: String,
    pub filing_date: String,
    #[serde(default)]
    pub report_date: String,
    #[serde(default)]
    pub accession_number: Option<String>,
    #[serde(default)]
    pub cik: Option<String>,
}

impl CompanySubmission {
    /// Flattens the columnar `recent` list into descriptors. Rows without a form
    /// or filing date are dropped; missing report dates become empty strings.
    pub fn into_descriptors(self) -> Vec<FilingDescriptor> {
        let recent = self.filings.recent;
        let cik = self.cik;

        recent
            .accession_number
            .iter()
            .enumerate()
            .filter_map(|(i, accession)| {
                let form = recent.form.get(i)?;
                let filing_date = recent.filing_date.get(i)?;
                Some(FilingDescriptor {
                    form: form.clone(),
                    filing_date: filing_date.clone(),
                    report_date: recent.report_date.get(i).cloned().unwrap_or_default(),
                    accession_number: Some(accession.clone()),
                    cik: Some(cik.clone()),
                })
            })
            .collect()
    }
}

/// Builds the URL of the complete submission text file for a filing.
pub fn submission_text_url(cik: &str, accession_number: &str) -> String {
    let cik_trimmed = cik.trim_start_matches('0');
    let acc_no_dashes = accession_number.replace('-', "");
    format!(
        "https://www.sec.gov/Archives/edgar/data/{}/{}/{}.txt",
        cik_trimmed, acc_no_dashes, accession_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_into_descriptors() {
        let json = r#"{
            "cik": "320193",
            "name": "Apple Inc.",
            "tickers": ["AAPL"],
            "filings": {
                "recent": {
                    "accessionNumber": ["0000320193-24-000123", "0000320193-24-000081"],
                    "filingDate": ["2024-11-01", "2024-08-02"],
                    "reportDate": ["2024-09-28", "2024-06-29"],
                    "form": ["10-K", "10-Q"],
                    "primaryDocument": ["aapl-20240928.htm", "aapl-20240629.htm"]
                }
            }
        }"#;

        let submission: CompanySubmission = serde_json::from_str(json).unwrap();
        let descriptors = submission.into_descriptors();

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].form, "10-K");
        assert_eq!(descriptors[0].report_date, "2024-09-28");
        assert_eq!(descriptors[1].accession_number.as_deref(), Some("0000320193-24-000081"));
        assert_eq!(descriptors[1].cik.as_deref(), Some("320193"));
    }

    #[test]
    fn test_descriptor_accepts_missing_identifiers() {
        let json = r#"[{"form": "10-K", "filingDate": "2024-01-01"}]"#;
        let filings: Vec<FilingDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(filings[0].accession_number, None);
        assert_eq!(filings[0].cik, None);
        assert_eq!(filings[0].report_date, "");
    }

    #[test]
    fn test_submission_text_url() {
        assert_eq!(
            submission_text_url("0000320193", "0000320193-24-000123"),
            "https://www.sec.gov/Archives/edgar/data/320193/000032019324000123/0000320193-24-000123.txt"
        );
    }
}
