//! # Application Configuration
//!
//! Configuration lives in a single YAML file, `fleet_config.yaml`, at the root of the
//! data directory. A default file is written on first launch.
//!
//! ```yaml
//! data_format_version: "1.0"
//! report:
//!   font_path: /usr/share/fonts/truetype/dejavu/DejaVuSans.ttf
//!   font_family: DejaVu Sans
//!   page_width: 595.28
//!   page_height: 841.89
//!   margin: 56.0
//! timeline:
//!   min_label_spacing: 25.0
//!   ...
//! validation:
//!   phone_length_on_create: 12
//!   phone_length_on_edit: 11
//!   ...
//! ```

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::timeline::TimelineConfig;

pub const CONFIG_FILE_NAME: &str = "fleet_config.yaml";

/// Environment variable that overrides the default data directory
pub const DATA_DIR_ENV: &str = "FLEET_RECORDS_DATA_DIR";

const DEFAULT_DIRECTORY_NAME: &str = "Fleet Records";

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Data format version for future migrations
    pub data_format_version: String,
    pub report: ReportConfig,
    pub timeline: TimelineConfig,
    pub validation: ValidationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_format_version: "1.0".to_string(),
            report: ReportConfig::default(),
            timeline: TimelineConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

/// Settings for report documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// TrueType font able to render the working character set
    pub font_path: Option<PathBuf>,
    pub font_family: String,
    /// Page size in points (A4 by default)
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_family: "DejaVu Sans".to_string(),
            page_width: 595.28,
            page_height: 841.89,
            margin: 56.0,
        }
    }
}

/// Limits applied to form input before anything is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Required phone length when a driver is created
    pub phone_length_on_create: usize,
    /// Required phone length when a driver is edited
    pub phone_length_on_edit: usize,
    pub max_plate_length: usize,
    pub max_mileage: u32,
    pub min_year: i32,
    pub max_year: i32,
    pub max_amount: Decimal,
    pub max_experience_years: u32,
    pub max_house_number: u32,
    pub max_postal_index: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            phone_length_on_create: 12,
            phone_length_on_edit: 11,
            max_plate_length: 9,
            max_mileage: 999_999,
            min_year: 1900,
            max_year: 2100,
            max_amount: Decimal::new(999_999_999, 2),
            max_experience_years: 100,
            max_house_number: 9999,
            max_postal_index: 999_999,
        }
    }
}

impl AppConfig {
    /// Load the configuration from the data directory, writing the defaults if absent
    pub fn load_or_create(data_directory: &Path) -> Result<Self> {
        let config_path = data_directory.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: AppConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            debug!("Loaded configuration from {:?}", config_path);
            Ok(config)
        } else {
            let config = AppConfig::default();
            config.save(data_directory)?;
            info!("Created default configuration at {:?}", config_path);
            Ok(config)
        }
    }

    /// Write the configuration atomically using a temp file
    pub fn save(&self, data_directory: &Path) -> Result<()> {
        if !data_directory.exists() {
            fs::create_dir_all(data_directory)?;
        }

        let config_path = data_directory.join(CONFIG_FILE_NAME);
        let yaml_content = serde_yaml::to_string(self)?;

        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        Ok(())
    }
}

/// Resolve where the record store lives.
///
/// Order: explicit path, then `FLEET_RECORDS_DATA_DIR`, then `~/Documents/Fleet Records`,
/// then `~/Fleet Records`.
pub fn resolve_data_directory(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.trim().is_empty() {
            info!("Using data directory from {}: {}", DATA_DIR_ENV, path);
            return Ok(PathBuf::from(path.trim()));
        }
    }

    if let Some(documents) = dirs::document_dir() {
        return Ok(documents.join(DEFAULT_DIRECTORY_NAME));
    }

    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DIRECTORY_NAME))
        .ok_or_else(|| anyhow!("Could not determine a data directory"))
}
