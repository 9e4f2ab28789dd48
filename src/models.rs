//! Core data models for W-2 field validation.
//!
//! These types represent the parsed form that flows from the extraction
//! layer into the validator, and the advisory findings that flow back out
//! to the caller for display.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single parsed box value.
///
/// Serialized untagged so an external extraction step can hand over a plain
/// JSON map: numbers become [`BoxValue::Amount`], `{"code": .., "amount": ..}`
/// objects become [`BoxValue::Code`], and anything that stayed a string
/// becomes [`BoxValue::Text`] (reported as PARSE_ERROR by the validator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoxValue {
    /// A dollar amount, e.g. Box 1 wages.
    Amount(f64),
    /// A Box 12 entry: coded benefit plus its amount, e.g. `("D", 2000.00)`.
    Code { code: String, amount: f64 },
    /// Raw text that could not be parsed as an amount.
    Text(String),
}

impl BoxValue {
    /// The numeric amount carried by this value, if it parsed as one.
    pub fn amount(&self) -> Option<f64> {
        match self {
            BoxValue::Amount(v) => Some(*v),
            BoxValue::Code { amount, .. } => Some(*amount),
            BoxValue::Text(_) => None,
        }
    }
}

/// A W-2 form as produced by field extraction: a box-id → value mapping
/// ("1", "2", "12a", "16", ...) plus the stated tax year when detected.
///
/// A `BTreeMap` keeps iteration order deterministic, so repeated validation
/// of the same input yields an identical report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedW2 {
    #[serde(default)]
    pub tax_year: Option<u16>,
    #[serde(default)]
    pub boxes: BTreeMap<String, BoxValue>,
}

impl ParsedW2 {
    pub fn new(tax_year: Option<u16>) -> Self {
        Self {
            tax_year,
            boxes: BTreeMap::new(),
        }
    }

    /// Record a dollar amount for a box.
    pub fn set_amount(&mut self, box_id: &str, amount: f64) {
        self.boxes
            .insert(box_id.to_string(), BoxValue::Amount(amount));
    }

    /// Record a Box 12 code/amount pair under its slot ("12a".."12d").
    pub fn set_code(&mut self, box_id: &str, code: &str, amount: f64) {
        self.boxes.insert(
            box_id.to_string(),
            BoxValue::Code {
                code: code.to_string(),
                amount,
            },
        );
    }

    /// Record raw text for a box that did not parse as an amount.
    pub fn set_text(&mut self, box_id: &str, raw: &str) {
        self.boxes
            .insert(box_id.to_string(), BoxValue::Text(raw.to_string()));
    }

    pub fn get(&self, box_id: &str) -> Option<&BoxValue> {
        self.boxes.get(box_id)
    }

    /// Numeric amount for a box, if present and parseable.
    pub fn amount(&self, box_id: &str) -> Option<f64> {
        self.boxes.get(box_id).and_then(BoxValue::amount)
    }
}

/// Closed warning taxonomy. Callers branch on the variant, never on the
/// message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    MissingBox,
    NegativeAmount,
    ZeroWithholding,
    WithholdingOutOfRange,
    WageLimitExceeded,
    MissingStateWages,
    ParseError,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::MissingBox => "MISSING_BOX",
            WarningKind::NegativeAmount => "NEGATIVE_AMOUNT",
            WarningKind::ZeroWithholding => "ZERO_WITHHOLDING",
            WarningKind::WithholdingOutOfRange => "WITHHOLDING_OUT_OF_RANGE",
            WarningKind::WageLimitExceeded => "WAGE_LIMIT_EXCEEDED",
            WarningKind::MissingStateWages => "MISSING_STATE_WAGES",
            WarningKind::ParseError => "PARSE_ERROR",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strongly a finding should be surfaced. Ratio heuristics are `Info`;
/// structural findings are `Warn`. All findings are advisory — none fails
/// the validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
}

/// A single advisory finding. Immutable once produced; never mutates the
/// [`ParsedW2`] it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub severity: Severity,
    /// The box this finding is about, when it concerns a single box.
    pub box_id: Option<String>,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
        };
        write!(f, "[{}] {}: {}", level, self.kind, self.message)
    }
}

/// The full result of one validation pass: every triggered warning, in rule
/// order, plus a count-based summary for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Whether any warning of the given kind was emitted.
    pub fn contains(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    /// All warnings of the given kind.
    pub fn of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    /// Count-based summary line, e.g. `3 warnings found`.
    pub fn summary(&self) -> String {
        match self.warnings.len() {
            0 => "no warnings found".to_string(),
            1 => "1 warning found".to_string(),
            n => format!("{} warnings found", n),
        }
    }
}
