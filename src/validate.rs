//! The W-2 validation rule set.
//!
//! [`validate`] is a pure function of the parsed form and the
//! [`ValidationConfig`]: no I/O, no shared state, no mutation of its input.
//! Every rule is advisory — a malformed field yields a PARSE_ERROR finding
//! for that box and the remaining rules still run, so validation always
//! completes and returns a full report.
//!
//! Rules are evaluated in a fixed order and boxes in sorted key order, so
//! identical input always produces an identical report.

use crate::config::ValidationConfig;
use crate::models::{BoxValue, ParsedW2, Severity, ValidationReport, Warning, WarningKind};

/// How a box looks to the rules: absent, a usable number, or text that
/// failed to parse (already reported as PARSE_ERROR, unusable here).
enum Field {
    Missing,
    Amount(f64),
    Malformed,
}

fn field(parsed: &ParsedW2, box_id: &str) -> Field {
    match parsed.get(box_id) {
        None => Field::Missing,
        Some(BoxValue::Amount(v)) => Field::Amount(*v),
        Some(BoxValue::Code { amount, .. }) => Field::Amount(*amount),
        Some(BoxValue::Text(_)) => Field::Malformed,
    }
}

fn box_label(box_id: &str) -> &'static str {
    match box_id {
        "1" => "wages, tips, other compensation",
        "2" => "federal income tax withheld",
        "3" => "social security wages",
        "5" => "medicare wages and tips",
        "16" => "state wages",
        "17" => "state income tax",
        other if other.starts_with("12") => "box 12 code",
        _ => "amount",
    }
}

fn warn(kind: WarningKind, box_id: Option<&str>, message: String) -> Warning {
    let severity = match kind {
        WarningKind::ZeroWithholding | WarningKind::WithholdingOutOfRange => Severity::Info,
        _ => Severity::Warn,
    };
    Warning {
        kind,
        severity,
        box_id: box_id.map(str::to_string),
        message,
    }
}

/// Apply the full rule set to a parsed form and return every triggered
/// warning. Never fails: an empty report simply means nothing triggered.
pub fn validate(parsed: &ParsedW2, config: &ValidationConfig) -> ValidationReport {
    let mut warnings = Vec::new();

    // Malformed values first: report and treat the box as unusable below.
    for (box_id, value) in &parsed.boxes {
        if let BoxValue::Text(raw) = value {
            warnings.push(warn(
                WarningKind::ParseError,
                Some(box_id),
                format!(
                    "box {} value {:?} is not a numeric amount; verify extraction quality",
                    box_id, raw
                ),
            ));
        }
    }

    // Boxes 1 and 2 are required on any filled-in W-2.
    for box_id in ["1", "2"] {
        if let Field::Missing = field(parsed, box_id) {
            warnings.push(warn(
                WarningKind::MissingBox,
                Some(box_id),
                format!(
                    "box {} ({}) was not detected; verify the source document and extraction",
                    box_id,
                    box_label(box_id)
                ),
            ));
        }
    }

    for (box_id, value) in &parsed.boxes {
        if let Some(amount) = value.amount() {
            if amount < 0.0 {
                warnings.push(warn(
                    WarningKind::NegativeAmount,
                    Some(box_id),
                    format!(
                        "box {} ({}) is negative ({:.2}), which is unusual for W-2 amounts",
                        box_id,
                        box_label(box_id),
                        amount
                    ),
                ));
            }
        }
    }

    // Withholding plausibility: heuristic only, never blocks validation.
    if let (Field::Amount(wages), Field::Amount(withheld)) =
        (field(parsed, "1"), field(parsed, "2"))
    {
        if wages > 0.0 {
            let band = &config.withholding;
            let ratio = withheld / wages;
            if ratio <= band.zero_ratio {
                warnings.push(warn(
                    WarningKind::ZeroWithholding,
                    Some("2"),
                    "box 2 withholding is zero while box 1 wages are positive; \
                     confirm withholding setup and payroll records"
                        .to_string(),
                ));
            } else if ratio < band.low_ratio || ratio > band.high_ratio {
                warnings.push(warn(
                    WarningKind::WithholdingOutOfRange,
                    Some("2"),
                    format!(
                        "federal withholding ratio {:.3} falls outside the plausible band \
                         [{:.2}, {:.2}]; review for possible data issues",
                        ratio, band.low_ratio, band.high_ratio
                    ),
                ));
            }
        }
    }

    // Social Security wage-base check. Skipped when the year is unknown or
    // not covered by the configured table.
    if let (Some(year), Field::Amount(ss_wages)) = (parsed.tax_year, field(parsed, "3")) {
        if let Some(limit) = config.wage_limit(year) {
            if ss_wages > limit {
                warnings.push(warn(
                    WarningKind::WageLimitExceeded,
                    Some("3"),
                    format!(
                        "box 3 ({:.2}) exceeds the {} social security wage limit ({:.2})",
                        ss_wages, year, limit
                    ),
                ));
            }
        }
    }

    // State consistency: withholding without corresponding wages.
    if let Field::Amount(state_tax) = field(parsed, "17") {
        let state_wages_present = matches!(field(parsed, "16"), Field::Amount(v) if v != 0.0);
        if state_tax > 0.0 && !state_wages_present {
            warnings.push(warn(
                WarningKind::MissingStateWages,
                Some("16"),
                "box 17 state withholding is present but box 16 state wages are absent or zero"
                    .to_string(),
            ));
        }
    }

    ValidationReport { warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ValidationConfig {
        ValidationConfig::default()
    }

    fn filled(tax_year: Option<u16>, amounts: &[(&str, f64)]) -> ParsedW2 {
        let mut parsed = ParsedW2::new(tax_year);
        for (box_id, amount) in amounts {
            parsed.set_amount(box_id, *amount);
        }
        parsed
    }

    #[test]
    fn missing_box2_is_reported() {
        let parsed = filled(None, &[("1", 1000.0)]);
        let report = validate(&parsed, &config());
        let missing: Vec<_> = report.of_kind(WarningKind::MissingBox).collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].box_id.as_deref(), Some("2"));
    }

    #[test]
    fn empty_form_reports_both_required_boxes() {
        let report = validate(&ParsedW2::default(), &config());
        assert_eq!(report.of_kind(WarningKind::MissingBox).count(), 2);
    }

    #[test]
    fn negative_amount_names_exactly_that_box() {
        let parsed = filled(None, &[("1", 1000.0), ("2", 100.0), ("5", -12.5)]);
        let report = validate(&parsed, &config());
        let negatives: Vec<_> = report.of_kind(WarningKind::NegativeAmount).collect();
        assert_eq!(negatives.len(), 1);
        assert_eq!(negatives[0].box_id.as_deref(), Some("5"));
        assert!(negatives[0].message.contains("-12.50"));
    }

    #[test]
    fn zero_withholding_with_positive_wages() {
        let parsed = filled(None, &[("1", 1000.0), ("2", 0.0)]);
        let report = validate(&parsed, &config());
        assert!(report.contains(WarningKind::ZeroWithholding));
        assert!(!report.contains(WarningKind::WithholdingOutOfRange));
    }

    #[test]
    fn high_withholding_ratio_is_out_of_range() {
        let parsed = filled(None, &[("1", 1000.0), ("2", 800.0)]);
        let report = validate(&parsed, &config());
        assert!(report.contains(WarningKind::WithholdingOutOfRange));
        assert!(!report.contains(WarningKind::ZeroWithholding));
    }

    #[test]
    fn implausibly_low_but_nonzero_ratio_is_out_of_range() {
        // Between zero_ratio (0.001) and low_ratio (0.02).
        let parsed = filled(None, &[("1", 10_000.0), ("2", 50.0)]);
        let report = validate(&parsed, &config());
        assert!(report.contains(WarningKind::WithholdingOutOfRange));
        assert!(!report.contains(WarningKind::ZeroWithholding));
    }

    #[test]
    fn plausible_ratio_is_quiet() {
        let parsed = filled(None, &[("1", 1000.0), ("2", 150.0)]);
        let report = validate(&parsed, &config());
        assert!(report.is_clean());
    }

    #[test]
    fn wage_limit_boundary_is_exclusive() {
        let limit = config().wage_limit(2024).unwrap();

        let at_limit = filled(Some(2024), &[("1", 1.0), ("2", 0.15), ("3", limit)]);
        let report = validate(&at_limit, &config());
        assert!(!report.contains(WarningKind::WageLimitExceeded));

        let over_limit = filled(Some(2024), &[("1", 1.0), ("2", 0.15), ("3", limit + 0.01)]);
        let report = validate(&over_limit, &config());
        assert!(report.contains(WarningKind::WageLimitExceeded));
    }

    #[test]
    fn wage_limit_skipped_for_unknown_year() {
        let parsed = filled(Some(1999), &[("1", 1.0), ("2", 0.15), ("3", 1_000_000.0)]);
        let report = validate(&parsed, &config());
        assert!(!report.contains(WarningKind::WageLimitExceeded));
    }

    #[test]
    fn state_withholding_without_state_wages() {
        let parsed = filled(None, &[("1", 1000.0), ("2", 150.0), ("17", 200.0)]);
        let report = validate(&parsed, &config());
        assert!(report.contains(WarningKind::MissingStateWages));

        let zero_wages = filled(
            None,
            &[("1", 1000.0), ("2", 150.0), ("16", 0.0), ("17", 200.0)],
        );
        let report = validate(&zero_wages, &config());
        assert!(report.contains(WarningKind::MissingStateWages));
    }

    #[test]
    fn state_wages_present_is_quiet() {
        let parsed = filled(
            None,
            &[("1", 1000.0), ("2", 150.0), ("16", 1000.0), ("17", 200.0)],
        );
        let report = validate(&parsed, &config());
        assert!(!report.contains(WarningKind::MissingStateWages));
    }

    #[test]
    fn malformed_value_reports_parse_error_and_completes() {
        let mut parsed = filled(None, &[("1", 1000.0), ("17", 200.0)]);
        parsed.set_text("2", "n/a");
        let report = validate(&parsed, &config());

        let parse_errors: Vec<_> = report.of_kind(WarningKind::ParseError).collect();
        assert_eq!(parse_errors.len(), 1);
        assert_eq!(parse_errors[0].box_id.as_deref(), Some("2"));
        // Box 2 is present (just unusable), so it is not reported missing,
        // and the rest of the rules still ran.
        assert!(!report.contains(WarningKind::MissingBox));
        assert!(report.contains(WarningKind::MissingStateWages));
    }

    #[test]
    fn worked_example_flags_only_zero_withholding() {
        let mut parsed = filled(
            Some(2024),
            &[
                ("1", 10_000.0),
                ("2", 0.0),
                ("3", 10_000.0),
                ("5", 10_000.0),
                ("16", 10_000.0),
                ("17", 200.0),
            ],
        );
        parsed.set_code("12a", "D", 500.0);

        let report = validate(&parsed, &config());
        assert!(report.contains(WarningKind::ZeroWithholding));
        assert!(!report.contains(WarningKind::MissingBox));
        assert!(!report.contains(WarningKind::WageLimitExceeded));
        assert!(!report.contains(WarningKind::MissingStateWages));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.summary(), "1 warning found");
    }

    #[test]
    fn validation_is_idempotent() {
        let mut parsed = filled(Some(2023), &[("1", 50_000.0), ("2", 0.0), ("17", 75.0)]);
        parsed.set_text("5", "illegible");

        let first = validate(&parsed, &config());
        let second = validate(&parsed, &config());
        assert_eq!(first, second);
    }

    #[test]
    fn advisory_findings_are_info_severity() {
        let parsed = filled(None, &[("1", 1000.0), ("2", 0.0)]);
        let report = validate(&parsed, &config());
        assert!(report
            .of_kind(WarningKind::ZeroWithholding)
            .all(|w| w.severity == Severity::Info));
    }
}
