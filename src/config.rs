use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Validator configuration: the SSA wage-limit table and the withholding
/// plausibility band. Passed explicitly so [`crate::validate::validate`]
/// stays a pure function with no ambient state.
#[derive(Debug, Deserialize, Clone)]
pub struct ValidationConfig {
    /// Tax year → Social Security wage-base limit. Keys are year strings
    /// ("2024") since TOML table keys are strings. Box 3 amounts above the
    /// limit for the stated year trigger WAGE_LIMIT_EXCEEDED.
    #[serde(default = "default_ssa_wage_limits")]
    pub ssa_wage_limits: BTreeMap<String, f64>,
    #[serde(default)]
    pub withholding: WithholdingBand,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ssa_wage_limits: default_ssa_wage_limits(),
            withholding: WithholdingBand::default(),
        }
    }
}

impl ValidationConfig {
    /// The SSA wage-base limit for a tax year, if the table covers it.
    pub fn wage_limit(&self, year: u16) -> Option<f64> {
        self.ssa_wage_limits.get(&year.to_string()).copied()
    }
}

/// Plausibility band for the federal-withholding-to-wages ratio
/// (Box 2 / Box 1). Heuristic thresholds, not a fixed contract; override
/// them in TOML when the defaults fit the data poorly.
#[derive(Debug, Deserialize, Clone)]
pub struct WithholdingBand {
    /// Ratios at or below this are reported as ZERO_WITHHOLDING.
    #[serde(default = "default_zero_ratio")]
    pub zero_ratio: f64,
    /// Ratios below this (but above `zero_ratio`) are implausibly low.
    #[serde(default = "default_low_ratio")]
    pub low_ratio: f64,
    /// Ratios above this are implausibly high.
    #[serde(default = "default_high_ratio")]
    pub high_ratio: f64,
}

impl Default for WithholdingBand {
    fn default() -> Self {
        Self {
            zero_ratio: default_zero_ratio(),
            low_ratio: default_low_ratio(),
            high_ratio: default_high_ratio(),
        }
    }
}

fn default_zero_ratio() -> f64 {
    0.001
}
fn default_low_ratio() -> f64 {
    0.02
}
fn default_high_ratio() -> f64 {
    0.60
}

// SSA-published wage-base limits for recent tax years.
fn default_ssa_wage_limits() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("2020".to_string(), 137_700.0),
        ("2021".to_string(), 142_800.0),
        ("2022".to_string(), 147_000.0),
        ("2023".to_string(), 160_200.0),
        ("2024".to_string(), 168_600.0),
        ("2025".to_string(), 176_100.0),
    ])
}

pub fn load_config(path: &Path) -> Result<ValidationConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: ValidationConfig =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ValidationConfig) -> Result<()> {
    let band = &config.withholding;
    if band.zero_ratio < 0.0 {
        anyhow::bail!("withholding.zero_ratio must be >= 0");
    }
    if band.zero_ratio >= band.low_ratio {
        anyhow::bail!("withholding.zero_ratio must be below withholding.low_ratio");
    }
    if band.low_ratio >= band.high_ratio {
        anyhow::bail!("withholding.low_ratio must be below withholding.high_ratio");
    }
    if band.high_ratio > 1.0 {
        anyhow::bail!("withholding.high_ratio must be <= 1.0");
    }

    for (year, limit) in &config.ssa_wage_limits {
        if year.parse::<u16>().is_err() {
            anyhow::bail!("ssa_wage_limits key '{}' is not a year", year);
        }
        if *limit <= 0.0 {
            anyhow::bail!("ssa_wage_limits.{} must be > 0", year);
        }
    }

    Ok(())
}
