use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::layout::{FontFamily, Margins};
use crate::printer::PrinterProfile;

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Width used when a job does not name one.
    pub default_width_mm: f64,
    pub margins: Margins,
    pub font: FontFamily,
    pub printer: PrinterProfile,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Margins::default();
        let config = Config {
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_width_mm: env_or("LABEL_WIDTH_MM", 38.0)?,
            margins: Margins {
                left_mm: env_or("LABEL_MARGIN_LEFT_MM", defaults.left_mm)?,
                right_mm: env_or("LABEL_MARGIN_RIGHT_MM", defaults.right_mm)?,
                top_mm: env_or("LABEL_MARGIN_TOP_MM", defaults.top_mm)?,
                bottom_mm: env_or("LABEL_MARGIN_BOTTOM_MM", defaults.bottom_mm)?,
            },
            font: match std::env::var("LABEL_FONT") {
                Ok(raw) => raw
                    .parse::<FontFamily>()
                    .map_err(|e| anyhow!(e))
                    .context("LABEL_FONT must be 'sans' or 'sans-condensed'")?,
                Err(_) => FontFamily::Sans,
            },
            printer: PrinterProfile::new(
                std::env::var("PRINTER_NAME").unwrap_or_else(|_| "QL-560".to_string()),
            ),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let m = &self.margins;
        if [m.left_mm, m.right_mm, m.top_mm, m.bottom_mm]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(anyhow!("label margins must be finite and non-negative"));
        }
        if !self.default_width_mm.is_finite() || self.default_width_mm <= m.horizontal_mm() {
            return Err(anyhow!(
                "LABEL_WIDTH_MM ({}) must exceed the side margins ({} mm)",
                self.default_width_mm,
                m.horizontal_mm()
            ));
        }
        Ok(())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Defaults without touching the process environment.
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            default_width_mm: 38.0,
            margins: Margins::default(),
            font: FontFamily::Sans,
            printer: PrinterProfile::new("QL-560".to_string()),
        }
    }
}
