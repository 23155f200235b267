//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! policies from YAML files.

use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};

use super::types::{
    HolidayEntry, HolidayFile, PayrollConfig, PayrollRules, PolicyFile, PolicyMetadata,
    SeasonalFile, SeasonalTimes,
};

/// Loads and provides access to a payroll policy.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query the rules, seasonal estimates and holidays.
///
/// # Directory Structure
///
/// ```text
/// config/israel/
/// ├── policy.yaml     # Metadata and calculation rules
/// ├── seasonal.yaml   # Estimated Sabbath times per month
/// └── holidays/
///     └── 2025.yaml   # Official holidays for that year
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/israel").unwrap();
/// println!("Policy: {}", loader.policy().name);
/// println!("Friday norm: {}", loader.rules().norms.friday);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/israel")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The rules fail validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy_path = path.join("policy.yaml");
        let policy = Self::load_yaml::<PolicyFile>(&policy_path)?;
        policy.rules.validate()?;

        let seasonal_path = path.join("seasonal.yaml");
        let seasonal = Self::load_yaml::<SeasonalFile>(&seasonal_path)?;
        Self::check_seasonal(&seasonal.months)?;

        let holidays_dir = path.join("holidays");
        let holidays = Self::load_holidays(&holidays_dir)?;

        let config = PayrollConfig::new(policy.policy, policy.rules, seasonal.months, holidays);

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Every month must appear exactly once.
    fn check_seasonal(months: &[SeasonalTimes]) -> EngineResult<()> {
        for month in 1..=12 {
            let count = months.iter().filter(|m| m.month == month).count();
            if count != 1 {
                return Err(EngineError::InvalidConfig {
                    field: "seasonal.months".to_string(),
                    message: format!("month {} appears {} times, expected once", month, count),
                });
            }
        }
        Ok(())
    }

    /// Loads all holiday files from the holidays directory.
    fn load_holidays(holidays_dir: &Path) -> EngineResult<Vec<HolidayEntry>> {
        let dir_str = holidays_dir.display().to_string();

        let entries = fs::read_dir(holidays_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut holidays = Vec::new();
        let mut files = 0;

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let file = Self::load_yaml::<HolidayFile>(&path)?;
                if let Some(stray) = file.holidays.iter().find(|h| h.date.year() != file.year) {
                    return Err(EngineError::InvalidConfig {
                        field: path.display().to_string(),
                        message: format!("holiday {} is outside year {}", stray.date, file.year),
                    });
                }
                holidays.extend(file.holidays);
                files += 1;
            }
        }

        if files == 0 {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no holiday files found)", dir_str),
            });
        }

        Ok(holidays)
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the policy metadata.
    pub fn policy(&self) -> &PolicyMetadata {
        self.config.policy()
    }

    /// Returns the calculation rules.
    pub fn rules(&self) -> &PayrollRules {
        self.config.rules()
    }

    /// Returns the seasonal estimate for a month, if configured.
    pub fn seasonal_for(&self, month: u32) -> Option<&SeasonalTimes> {
        self.config.seasonal().iter().find(|s| s.month == month)
    }

    /// Returns the holiday on a date, if any.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::ConfigLoader;
    /// use chrono::NaiveDate;
    ///
    /// let loader = ConfigLoader::load("./config/israel")?;
    /// let date = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
    /// if let Some(holiday) = loader.holiday_on(date) {
    ///     println!("{} is {}", date, holiday.name);
    /// }
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn holiday_on(&self, date: NaiveDate) -> Option<&HolidayEntry> {
        self.config.holidays().iter().find(|h| h.date == date)
    }
}
