use crate::extract::{decode_rating, ParseMode};
use crate::intern::{InternError, InternTable, MAX_KEY_LEN};
use crate::models::{ProductId, Rating, ScanStats};
use std::collections::TryReserveError;
use std::io::{self, BufRead};

/// Record limit of the original fixed arrays.
pub const MAX_RECORDS: usize = 7_000_000;

/// Records printed after ingestion as a sanity check.
pub const PREVIEW_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// `None` lets the rating log grow without bound.
    pub max_records: Option<usize>,
    pub max_key_len: usize,
    pub mode: ParseMode,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_records: Some(MAX_RECORDS),
            max_key_len: MAX_KEY_LEN,
            mode: ParseMode::Auto,
        }
    }
}

#[derive(Debug)]
pub enum IngestError {
    CapacityExceeded { limit: usize },
    Intern(InternError),
    Alloc(TryReserveError),
    Io(io::Error),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::CapacityExceeded { limit } => {
                write!(f, "rating log is full ({} records)", limit)
            }
            IngestError::Intern(err) => write!(f, "{}", err),
            IngestError::Alloc(err) => write!(f, "failed to grow rating log: {}", err),
            IngestError::Io(err) => write!(f, "failed to read input: {}", err),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::CapacityExceeded { .. } => None,
            IngestError::Intern(err) => Some(err),
            IngestError::Alloc(err) => Some(err),
            IngestError::Io(err) => Some(err),
        }
    }
}

impl From<InternError> for IngestError {
    fn from(err: InternError) -> Self {
        IngestError::Intern(err)
    }
}

impl From<io::Error> for IngestError {
    fn from(err: io::Error) -> Self {
        IngestError::Io(err)
    }
}

/// Append-only ratings in acceptance order.
#[derive(Debug, Default)]
pub struct RatingLog {
    records: Vec<Rating>,
    limit: Option<usize>,
}

impl RatingLog {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            records: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, product: ProductId, rating: f32) -> Result<(), IngestError> {
        if let Some(limit) = self.limit {
            if self.records.len() >= limit {
                return Err(IngestError::CapacityExceeded { limit });
            }
        }
        self.records.try_reserve(1).map_err(IngestError::Alloc)?;
        self.records.push(Rating { product, rating });
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Rating> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[Rating] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rating> {
        self.records.iter()
    }
}

#[derive(Debug)]
pub struct Ingested {
    pub products: InternTable,
    pub ratings: RatingLog,
    pub stats: ScanStats,
}

/// Reads every rating line of `reader`, interning product ids as it goes.
///
/// Lines without both a non-negative rating and a product id are dropped.
/// Over-long product ids are skipped with a warning. A full log or a failed
/// allocation stops the run.
pub fn ingest<R: BufRead>(reader: R, config: &IngestConfig) -> Result<Ingested, IngestError> {
    let mut products = InternTable::with_max_key_len(config.max_key_len);
    let mut ratings = RatingLog::new(config.max_records);
    let mut stats = ScanStats::default();

    for bytes in reader.split(b'\n') {
        let bytes = bytes?;
        stats.lines += 1;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line.trim_end_matches('\r'),
            Err(err) => {
                stats.malformed += 1;
                log::warn!("Skipping line {}: {}", stats.lines, err);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let fields = match decode_rating(line, config.mode) {
            Some(fields) => fields,
            None => {
                stats.malformed += 1;
                continue;
            }
        };
        let rating = match fields.rating {
            Some(rating) if rating >= 0.0 && !fields.asin.is_empty() => rating,
            _ => {
                stats.missing_field += 1;
                log::trace!("line {} has no usable asin/overall pair", stats.lines);
                continue;
            }
        };

        let product = match products.intern(&fields.asin) {
            Ok(product) => product,
            Err(err @ InternError::TooLong { .. }) => {
                stats.rejected += 1;
                log::warn!("Skipping line {}: asin {:?}: {}", stats.lines, fields.asin, err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        ratings.push(product, rating)?;
        stats.accepted += 1;
    }

    log::info!(
        "Ingested {} of {} lines: {} distinct products, {} missing a field, {} malformed, {} rejected",
        stats.accepted,
        stats.lines,
        products.len(),
        stats.missing_field,
        stats.malformed,
        stats.rejected
    );
    Ok(Ingested {
        products,
        ratings,
        stats,
    })
}
