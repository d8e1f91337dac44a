use crate::models::{RatingLine, ReviewLine};
use std::borrow::Cow;

/// How a line is turned into fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ParseMode {
    /// Decode as JSON, fall back to scraping when the line is not valid JSON.
    #[default]
    Auto,
    /// Decode as JSON only; anything else is malformed.
    Json,
    /// Literal substring search only.
    Scrape,
}

#[derive(Debug, PartialEq)]
pub struct ReviewFields<'a> {
    pub reviewer_id: Cow<'a, str>,
    pub review_text: Cow<'a, str>,
}

#[derive(Debug, PartialEq)]
pub struct RatingFields<'a> {
    pub asin: Cow<'a, str>,
    pub rating: Option<f32>,
}

/// Text between `"<key>": "` and the next `"`, or `""` when either is missing.
pub fn extract_field<'a>(line: &'a str, key: &str) -> &'a str {
    let pattern = format!("\"{}\": \"", key);
    let start = match line.find(&pattern) {
        Some(idx) => idx + pattern.len(),
        None => return "",
    };
    let rest = &line[start..];
    match rest.find('"') {
        Some(end) => &rest[..end],
        None => "",
    }
}

/// Parses the longest numeric prefix after leading whitespace, 0 when there is none.
pub fn parse_float_prefix(s: &str) -> f32 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return 0.0;
    }

    // exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

/// Comma-token scan for `"overall"` and `"asin"`. A later token overwrites an earlier one.
pub fn scrape_rating(line: &str) -> RatingFields<'_> {
    let mut fields = RatingFields {
        asin: Cow::Borrowed(""),
        rating: None,
    };

    for token in line.split(',').filter(|token| !token.is_empty()) {
        if token.contains("\"overall\"") {
            if let Some(colon) = token.find(':') {
                fields.rating = Some(parse_float_prefix(&token[colon + 1..]));
            }
        } else if token.contains("\"asin\"") {
            if let Some(colon) = token.find(':') {
                let value = token[colon + 1..].trim_start_matches(|c| c == ' ' || c == '"');
                let end = value.find('"').unwrap_or(value.len());
                fields.asin = Cow::Borrowed(&value[..end]);
            }
        }
    }
    fields
}

pub fn scrape_review(line: &str) -> ReviewFields<'_> {
    ReviewFields {
        reviewer_id: Cow::Borrowed(extract_field(line, "reviewerID")),
        review_text: Cow::Borrowed(extract_field(line, "reviewText")),
    }
}

/// `None` means the line is malformed under `mode`.
pub fn decode_review(line: &str, mode: ParseMode) -> Option<ReviewFields<'_>> {
    if mode == ParseMode::Scrape {
        return Some(scrape_review(line));
    }
    match serde_json::from_str::<ReviewLine>(line) {
        Ok(record) => Some(ReviewFields {
            reviewer_id: Cow::Owned(record.reviewer_id.unwrap_or_default()),
            review_text: Cow::Owned(record.review_text.unwrap_or_default()),
        }),
        Err(err) => {
            log::trace!("not json ({}): {}", err, line);
            match mode {
                ParseMode::Json => None,
                _ => Some(scrape_review(line)),
            }
        }
    }
}

/// `None` means the line is malformed under `mode`.
pub fn decode_rating(line: &str, mode: ParseMode) -> Option<RatingFields<'_>> {
    if mode == ParseMode::Scrape {
        return Some(scrape_rating(line));
    }
    match serde_json::from_str::<RatingLine>(line) {
        Ok(record) => Some(RatingFields {
            asin: Cow::Owned(record.asin.unwrap_or_default()),
            rating: record.overall,
        }),
        Err(err) => {
            log::trace!("not json ({}): {}", err, line);
            match mode {
                ParseMode::Json => None,
                _ => Some(scrape_rating(line)),
            }
        }
    }
}
