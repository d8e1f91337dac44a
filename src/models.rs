use serde::{Deserialize, Serialize};

/// Dense identifier handed out by the intern table, starting at 0.
pub type ProductId = u32;

/// Fields the elaborate-review counter reads from a JSON line. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewLine {
    #[serde(rename = "reviewerID")]
    pub reviewer_id: Option<String>,
    #[serde(rename = "reviewText")]
    pub review_text: Option<String>,
}

/// Fields the rating ingestor reads from a JSON line.
#[derive(Debug, Default, Deserialize)]
pub struct RatingLine {
    pub asin: Option<String>,
    pub overall: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rating {
    pub product: ProductId,
    pub rating: f32,
}

/// One line of the `--products` dump.
#[derive(Debug, Serialize)]
pub struct ProductEntry<'a> {
    pub id: ProductId,
    pub asin: &'a str,
}

/// Per-run counters, logged once the input is exhausted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub lines: u64,
    pub accepted: u64,
    pub missing_field: u64,
    pub malformed: u64,
    pub rejected: u64,
}
