//! # W-2 Agent
//!
//! Deterministic field extraction and validation for W-2 tax forms.
//!
//! Given plain text already extracted from a W-2 document, this crate parses
//! the labeled box amounts into a [`models::ParsedW2`] map and runs a fixed
//! advisory rule set over it, returning a [`models::ValidationReport`] of
//! warnings for the caller to display.
//!
//! ```text
//! ┌────────────┐   ┌─────────┐   ┌──────────┐   ┌────────────┐
//! │ plain text │──▶│ extract │──▶│ ParsedW2 │──▶│  validate   │──▶ report
//! └────────────┘   └─────────┘   └──────────┘   └────────────┘
//!                                      ▲
//!                        JSON field map from an external
//!                        extraction step also deserializes here
//! ```
//!
//! Validation is a pure function: it never mutates its input, never performs
//! I/O, and never fails — findings are returned as data, and an empty report
//! means nothing triggered. Thresholds (the SSA wage-limit table and the
//! withholding plausibility band) come from an explicit
//! [`config::ValidationConfig`], loadable from TOML.
//!
//! ## Quick start
//!
//! ```
//! use w2_agent::{config::ValidationConfig, extract, validate};
//!
//! let text = "1 Wages, tips, other compensation 52,345.67\n\
//!             2 Federal income tax withheld 6,789.01";
//! let parsed = extract::parse_w2_text(text, Some("employee-2024-w2.txt"));
//! let report = validate::validate(&parsed, &ValidationConfig::default());
//! println!("{}", report.summary());
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Parsed form, warning taxonomy, validation report |
//! | [`config`] | Wage-limit table and plausibility band (TOML) |
//! | [`extract`] | Regex field extraction from plain W-2 text |
//! | [`validate`] | The advisory rule set |

pub mod config;
pub mod extract;
pub mod models;
pub mod validate;
