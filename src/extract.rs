//! Regex field extraction for W-2 text.
//!
//! Input is plain text already pulled out of a document by an upstream
//! extraction step; this module locates the labeled box amounts (Boxes 1, 2,
//! 3, 5, 16, 17), Box 12 code/amount pairs, and the tax year, and returns a
//! [`ParsedW2`]. Extraction is best-effort: a box that cannot be found is
//! simply absent, and the validator reports on what is missing.
//!
//! PDF text extraction is noisy, so amounts are matched in two passes —
//! once against the raw text and once against a normalized copy with
//! whitespace runs squashed and split-thousands amounts (`5 262 70`)
//! rejoined into decimal form.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::ParsedW2;

/// A dollar amount: comma-grouped decimal (`52,345.67`) or the
/// split-thousands form some PDF extractors produce (`5 262 70`).
const AMOUNT: &str = r"([0-9][0-9,]*\.[0-9]{2}|[0-9]{1,3}[ \t]+[0-9]{3}[ \t]+[0-9]{2})";

static SPLIT_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\s+[0-9]{3}\s+[0-9]{2}$").expect("hardcoded regex pattern is valid")
});

static SPLIT_AMOUNT_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9]{1,3})\s+([0-9]{3})\s+([0-9]{2})\b")
        .expect("hardcoded regex pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded regex pattern is valid"));

static BOX12_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b12(?P<slot>[abcd])?\s*[:\-]?\s*(?P<code>[A-Za-z]{{1,2}})\s+\$?{AMOUNT}"
    ))
    .expect("hardcoded regex pattern is valid")
});

static BOX12_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<code>[A-Za-z]{{1,2}})\s*[-:]?\s*box\s*12[^0-9$]{{0,50}}\$?{AMOUNT}"
    ))
    .expect("hardcoded regex pattern is valid")
});

static TAX_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])(20[0-4][0-9])(?:[^0-9]|$)").expect("hardcoded regex pattern is valid")
});

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).expect("hardcoded regex pattern is valid")
}

/// Build the match attempts for one box: label-then-amount in raw text,
/// amount-then-label (truncated PDF layouts), and a wider-gap fallback
/// used against normalized text.
fn keyword_patterns(keywords: &[&str]) -> Vec<Regex> {
    let mut patterns = Vec::new();
    for kw in keywords {
        patterns.push(rx(&format!(r"(?i)(?:{kw})[^0-9$]{{0,120}}\$?{AMOUNT}")));
        patterns.push(rx(&format!(r"(?i)\$?{AMOUNT}[^0-9A-Za-z]{{0,120}}(?:{kw})")));
        patterns.push(rx(&format!(r"(?i)(?:{kw})[^0-9$]{{0,180}}\$?{AMOUNT}")));
    }
    patterns
}

static BOX1: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    keyword_patterns(&[
        r"(?:box\s*1|\b1\b)\s*wages(?:,?\s*tips)?(?:,?\s*other\s*compensation)?",
        r"box\s*1\s*of\s*w-?2",
    ])
});

static BOX2: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    keyword_patterns(&[
        r"(?:box\s*2|\b2\b)\s*federal\s*income\s*tax\s*withheld",
        r"box\s*2\s*of\s*w-?2",
    ])
});

static BOX3: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    keyword_patterns(&[
        r"(?:box\s*3|\b3\b)\s*social\s*security\s*wages",
        r"box\s*3\s*of\s*w-?2",
    ])
});

static BOX5: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    keyword_patterns(&[
        r"(?:box\s*5|\b5\b)\s*medicare\s*wages(?:\s*and\s*tips)?",
        r"box\s*5\s*of\s*w-?2",
    ])
});

static BOX16: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    keyword_patterns(&[
        r"state\s*wages(?:,?\s*tips)?(?:,?\s*etc\.?)*",
        r"(?:box\s*16|\b16\b)\s*state\s*wages",
    ])
});

static BOX17: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    keyword_patterns(&[
        r"state\s*income\s*tax",
        r"(?:box\s*17|\b17\b)\s*state\s*income\s*tax",
    ])
});

/// Parse a matched amount token into a number. Handles comma grouping and
/// the split-thousands form.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let token = raw.trim();
    let joined;
    let token = if SPLIT_AMOUNT.is_match(token) {
        let parts: Vec<&str> = token.split_whitespace().collect();
        joined = format!("{}{}.{}", parts[0], parts[1], parts[2]);
        &joined
    } else {
        token
    };
    token.replace(',', "").parse::<f64>().ok()
}

/// Squash whitespace noise and rejoin split-money sequences so the labeled
/// patterns can match text mangled by PDF extraction.
fn normalize(text: &str) -> String {
    let squashed = WHITESPACE_RUN.replace_all(text, " ");
    SPLIT_AMOUNT_INLINE
        .replace_all(&squashed, "$1,$2.$3")
        .trim()
        .to_string()
}

fn first_amount(text: &str, patterns: &[Regex]) -> Option<f64> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            if let Some(value) = caps.get(1).and_then(|m| parse_amount(m.as_str())) {
                return Some(value);
            }
        }
    }
    None
}

fn extract_by_keywords(raw: &str, normalized: &str, patterns: &[Regex]) -> Option<f64> {
    first_amount(raw, patterns).or_else(|| first_amount(normalized, patterns))
}

/// Box 12 code/amount pairs with their slot letter when the text names one.
/// Duplicate (code, amount) pairs are dropped, first occurrence wins.
fn extract_box12(text: &str) -> Vec<(Option<char>, String, f64)> {
    let mut entries = Vec::new();
    let mut seen: HashSet<(String, u64)> = HashSet::new();

    for line in text.lines() {
        for caps in BOX12_SLOT.captures_iter(line) {
            let slot = caps
                .name("slot")
                .and_then(|m| m.as_str().chars().next());
            let code = match caps.name("code") {
                Some(m) => m.as_str().to_uppercase(),
                None => continue,
            };
            let amount = match caps.get(3).and_then(|m| parse_amount(m.as_str())) {
                Some(v) => v,
                None => continue,
            };
            if seen.insert((code.clone(), amount.to_bits())) {
                entries.push((slot, code, amount));
            }
        }
        for caps in BOX12_INLINE.captures_iter(line) {
            let code = match caps.name("code") {
                Some(m) => m.as_str().to_uppercase(),
                None => continue,
            };
            let amount = match caps.get(2).and_then(|m| parse_amount(m.as_str())) {
                Some(v) => v,
                None => continue,
            };
            if seen.insert((code.clone(), amount.to_bits())) {
                entries.push((None, code, amount));
            }
        }
    }

    entries
}

/// Detect the stated tax year, preferring the file name over document text.
pub fn detect_tax_year(file_name: Option<&str>, text: &str) -> Option<u16> {
    let from = |haystack: &str| {
        TAX_YEAR
            .captures(haystack)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u16>().ok())
    };
    file_name.and_then(from).or_else(|| from(text))
}

/// Parse W-2 box fields out of plain document text.
///
/// Returns a [`ParsedW2`] keyed by box identifier ("1", "2", "3", "5",
/// "12a".."12d", "16", "17"). Box 12 entries without an explicit slot
/// letter fill the first free slot in order.
pub fn parse_w2_text(text: &str, file_name: Option<&str>) -> ParsedW2 {
    let normalized = normalize(text);
    let mut parsed = ParsedW2::new(detect_tax_year(file_name, text));

    let boxes: [(&str, &[Regex]); 6] = [
        ("1", &BOX1),
        ("2", &BOX2),
        ("3", &BOX3),
        ("5", &BOX5),
        ("16", &BOX16),
        ("17", &BOX17),
    ];
    for (box_id, patterns) in boxes {
        if let Some(value) = extract_by_keywords(text, &normalized, patterns) {
            parsed.set_amount(box_id, value);
        }
    }

    for (slot, code, amount) in extract_box12(text) {
        let box_id = match slot {
            Some(letter) => format!("12{}", letter),
            None => match ['a', 'b', 'c', 'd']
                .iter()
                .find(|l| !parsed.boxes.contains_key(&format!("12{}", l)))
            {
                Some(letter) => format!("12{}", letter),
                None => continue, // all four slots taken
            },
        };
        if !parsed.boxes.contains_key(&box_id) {
            parsed.set_code(&box_id, &code, amount);
        }
    }

    parsed
}
