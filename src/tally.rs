use crate::classify::{is_elaborate, ELABORATE_MIN_WORDS};
use crate::extract::{decode_review, ParseMode};
use crate::models::ScanStats;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

/// Reviewers need at least this many elaborate reviews to be reported.
pub const MIN_ELABORATE_REVIEWS: u32 = 5;

#[derive(Debug, Clone)]
pub struct CounterConfig {
    pub min_words: usize,
    pub min_reviews: u32,
    pub mode: ParseMode,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            min_words: ELABORATE_MIN_WORDS,
            min_reviews: MIN_ELABORATE_REVIEWS,
            mode: ParseMode::Auto,
        }
    }
}

/// Elaborate review count per reviewer.
#[derive(Debug, Default)]
pub struct ReviewerTally {
    counts: HashMap<String, u32>,
}

impl ReviewerTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, reviewer_id: &str) {
        match self.counts.get_mut(reviewer_id) {
            Some(count) => *count = count.saturating_add(1),
            None => {
                self.counts.insert(reviewer_id.to_owned(), 1);
            }
        }
    }

    pub fn count(&self, reviewer_id: &str) -> u32 {
        self.counts.get(reviewer_id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Reviewers at or above `min_reviews`, sorted so repeated runs write identical files.
    pub fn qualifying(&self, min_reviews: u32) -> Vec<&str> {
        let mut reviewers = self
            .counts
            .iter()
            .filter(|(_id, count)| **count >= min_reviews)
            .map(|(id, _count)| id.as_str())
            .collect::<Vec<_>>();
        reviewers.sort_unstable();
        reviewers
    }
}

#[derive(Debug)]
pub struct ReviewScan {
    pub tally: ReviewerTally,
    pub stats: ScanStats,
}

/// Tallies elaborate reviews per reviewer over every line of `reader`.
pub fn scan_reviews<R: BufRead>(reader: R, config: &CounterConfig) -> io::Result<ReviewScan> {
    let mut tally = ReviewerTally::new();
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

        let fields = match decode_review(line, config.mode) {
            Some(fields) => fields,
            None => {
                stats.malformed += 1;
                continue;
            }
        };
        if fields.reviewer_id.is_empty() || fields.review_text.is_empty() {
            stats.missing_field += 1;
            log::trace!("line {} is missing reviewerID or reviewText", stats.lines);
            continue;
        }

        stats.accepted += 1;
        if is_elaborate(&fields.review_text, config.min_words) {
            tally.record(&fields.reviewer_id);
        }
    }

    log::info!(
        "Scanned {} lines: {} reviews, {} missing a field, {} malformed, {} reviewers with elaborate reviews",
        stats.lines,
        stats.accepted,
        stats.missing_field,
        stats.malformed,
        tally.len()
    );
    Ok(ReviewScan { tally, stats })
}

pub fn write_reviewers<W: Write>(mut out: W, reviewers: &[&str]) -> io::Result<()> {
    for reviewer in reviewers {
        writeln!(out, "{}", reviewer)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn line(reviewer: &str, words: usize) -> String {
        format!(
            r#"{{"reviewerID": "{}", "asin": "B001", "reviewText": "{}", "overall": 5.0}}"#,
            reviewer,
            vec!["good"; words].join(" ")
        )
    }

    fn scan(lines: &[String], config: &CounterConfig) -> ReviewScan {
        scan_reviews(Cursor::new(lines.join("\n")), config).unwrap()
    }

    #[test]
    fn test_tally_record() {
        let mut tally = ReviewerTally::new();
        assert_eq!(tally.count("R1"), 0);
        tally.record("R1");
        tally.record("R1");
        tally.record("R2");
        assert_eq!(tally.count("R1"), 2);
        assert_eq!(tally.count("R2"), 1);
        assert_eq!(tally.len(), 2);
        assert_eq!(tally.qualifying(2), vec!["R1"]);
        assert_eq!(tally.qualifying(1), vec!["R1", "R2"]);
    }

    #[test]
    fn test_short_reviews_are_not_counted() {
        let lines = vec![line("R1", 49), line("R1", 50), line("R2", 10)];
        let scan = scan(&lines, &CounterConfig::default());
        assert_eq!(scan.tally.count("R1"), 1);
        assert_eq!(scan.tally.count("R2"), 0);
        assert_eq!(scan.stats.accepted, 3);
    }

    #[test]
    fn test_empty_text_leaves_tally_untouched() {
        let lines = vec![
            r#"{"reviewerID": "R1", "reviewText": ""}"#.to_owned(),
            r#"{"reviewerID": "R1"}"#.to_owned(),
            r#"{"reviewText": "orphan text"}"#.to_owned(),
        ];
        for mode in [ParseMode::Auto, ParseMode::Json, ParseMode::Scrape] {
            let config = CounterConfig {
                min_words: 0,
                mode,
                ..CounterConfig::default()
            };
            let scan = scan(&lines, &config);
            assert!(scan.tally.is_empty(), "mode {:?}", mode);
            assert_eq!(scan.stats.missing_field, 3, "mode {:?}", mode);
        }
    }

    #[test]
    fn test_malformed_lines() {
        let lines = vec![
            "garbage".to_owned(),
            String::new(),
            line("R1", 60),
        ];
        let json = scan(
            &lines,
            &CounterConfig {
                mode: ParseMode::Json,
                ..CounterConfig::default()
            },
        );
        assert_eq!(json.stats.lines, 3);
        assert_eq!(json.stats.malformed, 1);
        assert_eq!(json.tally.count("R1"), 1);

        let auto = scan(&lines, &CounterConfig::default());
        assert_eq!(auto.stats.malformed, 0);
        assert_eq!(auto.stats.missing_field, 1);
    }

    #[test]
    fn test_configurable_thresholds() {
        let lines = vec![line("R1", 3), line("R1", 3)];
        let config = CounterConfig {
            min_words: 3,
            min_reviews: 2,
            mode: ParseMode::Scrape,
        };
        let scan = scan(&lines, &config);
        assert_eq!(scan.tally.qualifying(config.min_reviews), vec!["R1"]);
    }

    #[test]
    fn test_write_reviewers() {
        let mut out = Vec::new();
        write_reviewers(&mut out, &["A", "B"]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A\nB\n");
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut input = Vec::new();
        for _ in 0..3 {
            input.extend_from_slice(line("R1", 60).as_bytes());
            input.push(b'\n');
        }
        input.extend_from_slice(b"{\"reviewerID\": \"R9\", \"reviewText\": \"caf\xe9\"}\n");
        input.extend_from_slice(b"\xff\xfe\x00binary\n");
        for _ in 0..2 {
            input.extend_from_slice(line("R1", 60).as_bytes());
            input.push(b'\n');
        }

        for mode in [ParseMode::Auto, ParseMode::Json, ParseMode::Scrape] {
            let config = CounterConfig {
                mode,
                ..CounterConfig::default()
            };
            let scan = scan_reviews(Cursor::new(input.clone()), &config).unwrap();
            assert_eq!(scan.stats.lines, 7, "mode {:?}", mode);
            assert_eq!(scan.stats.malformed, 2, "mode {:?}", mode);
            assert_eq!(scan.tally.count("R9"), 0);
            assert_eq!(scan.tally.qualifying(config.min_reviews), vec!["R1"]);
        }
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = format!("{}\r\n{}\r\n", line("R1", 50), line("R2", 50));
        let scan = scan_reviews(Cursor::new(input.into_bytes()), &CounterConfig::default()).unwrap();
        assert_eq!(scan.stats.malformed, 0);
        assert_eq!(scan.tally.count("R1"), 1);
        assert_eq!(scan.tally.count("R2"), 1);
    }

    #[test]
    fn test_record_saturates() {
        let mut tally = ReviewerTally::new();
        tally.counts.insert("R1".to_owned(), u32::MAX - 1);
        tally.record("R1");
        tally.record("R1");
        assert_eq!(tally.count("R1"), u32::MAX);
    }
}
