use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{analysis::AnalysisReport, known::KnownAllergen};

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub ingredients: Vec<String>,
}

/// Either raw label text (OCR output) or an already split list.
#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub ingredients: Vec<String>,
    pub analysis: AnalysisReport,
}

#[derive(Debug, Serialize)]
pub struct SynonymsResponse {
    pub name: String,
    pub synonyms: BTreeSet<String>,
}

#[derive(Debug, Serialize)]
pub struct AllergenInfoResponse {
    pub source: &'static str,
    pub info: KnownAllergen,
}
