use std::path::Path;

use serde::Deserialize;

use crate::error::ReconError;

pub const DEFAULT_PAGE_SIZE: usize = 50;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Column mapping and view defaults. Every key is optional; an empty file
/// yields the stock Teamsters / Wellcentra headers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    pub name: String,
    pub teamsters: TeamstersColumns,
    pub wellcentra: WellcentraColumns,
    pub view: ViewConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: "Teamsters vs Wellcentra".into(),
            teamsters: TeamstersColumns::default(),
            wellcentra: WellcentraColumns::default(),
            view: ViewConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// How price cells given as text are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceFormat {
    /// Leading decimal number only: `"12.50 USD"` is 12.5, `"$12.50"` is no
    /// price and `"1,234.50"` is 1.
    #[default]
    Plain,
    /// Also accept a leading `$` and `,` thousands separators; the rest of
    /// the cell must be a number.
    Currency,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeamstersColumns {
    pub drug_name: String,
    /// Canonical price column.
    pub price: String,
    pub generic_name: String,
    pub ndc: String,
    pub awp: String,
    pub price_format: PriceFormat,
}

impl Default for TeamstersColumns {
    fn default() -> Self {
        Self {
            drug_name: "Drug Name".into(),
            price: "TOTAL COST".into(),
            generic_name: "Generic Name".into(),
            ndc: "NDC".into(),
            awp: "AWP".into(),
            price_format: PriceFormat::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WellcentraColumns {
    pub drug_name: String,
    /// Canonical price column.
    pub price: String,
    pub ndc: String,
    pub wac: String,
    pub awp: String,
    pub source_country: String,
    pub price_format: PriceFormat,
}

impl Default for WellcentraColumns {
    fn default() -> Self {
        Self {
            drug_name: "Drug Name".into(),
            price: "Lowest Price".into(),
            ndc: "NDC".into(),
            wac: "WAC Price".into(),
            awp: "AWP".into(),
            source_country: "Source Column".into(),
            price_format: PriceFormat::Plain,
        }
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub page_size: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing + validation
// ---------------------------------------------------------------------------

impl ReconConfig {
    /// Parse and validate a TOML config string.
    pub fn from_toml(s: &str) -> Result<Self, ReconError> {
        let config: Self = toml::from_str(s).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReconError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let t = &self.teamsters;
        let w = &self.wellcentra;
        let columns = [
            ("teamsters.drug_name", &t.drug_name),
            ("teamsters.price", &t.price),
            ("teamsters.generic_name", &t.generic_name),
            ("teamsters.ndc", &t.ndc),
            ("teamsters.awp", &t.awp),
            ("wellcentra.drug_name", &w.drug_name),
            ("wellcentra.price", &w.price),
            ("wellcentra.ndc", &w.ndc),
            ("wellcentra.wac", &w.wac),
            ("wellcentra.awp", &w.awp),
            ("wellcentra.source_country", &w.source_country),
        ];
        for (key, column) in columns {
            if column.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        if t.drug_name == t.price {
            return Err(ReconError::ConfigValidation(
                "teamsters.drug_name and teamsters.price must be different columns".into(),
            ));
        }
        if w.drug_name == w.price {
            return Err(ReconError::ConfigValidation(
                "wellcentra.drug_name and wellcentra.price must be different columns".into(),
            ));
        }

        if self.view.page_size == 0 {
            return Err(ReconError::ConfigValidation("view.page_size must be at least 1".into()));
        }

        Ok(())
    }
}
