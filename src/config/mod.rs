//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load payroll policies from YAML files,
//! including policy metadata, calculation rules, seasonal Sabbath estimates and
//! official holiday tables.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/israel").unwrap();
//! println!("Loaded policy: {}", config.policy().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CompensatoryPolicy, DailyNorms, HolidayEntry, HolidayFile, MonthlyContractPolicy,
    OvertimeTiers, PayrollConfig, PayrollRules, PolicyFile, PolicyMetadata, PremiumRates,
    SeasonalFile, SeasonalTimes, ShiftWindow, StatutoryCaps,
};
