//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during wage calculation.
//! Statutory cap breaches are not errors; they are reported as data on the
//! monthly summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::NoActiveContract {
///     employee_id: "emp_042".to_string(),
/// };
/// assert_eq!(error.to_string(), "No active compensation contract for employee 'emp_042'");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds a value the engine cannot use.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The employee has no active compensation contract.
    #[error("No active compensation contract for employee '{employee_id}'")]
    NoActiveContract {
        /// The employee without an active contract.
        employee_id: String,
    },

    /// A compensation contract is internally inconsistent.
    #[error("Invalid contract '{contract_id}': {message}")]
    InvalidContract {
        /// The contract that failed validation.
        contract_id: Uuid,
        /// A description of the problem.
        message: String,
    },

    /// A contract id did not resolve to a stored contract.
    #[error("Contract not found: {contract_id}")]
    ContractNotFound {
        /// The missing contract id.
        contract_id: Uuid,
    },

    /// A second active contract would exist for the same employee.
    #[error("Employee '{employee_id}' already has an active contract; activation of {contract_id} rejected")]
    UniquenessViolation {
        /// The employee whose unique active slot is taken.
        employee_id: String,
        /// The contract whose activation lost.
        contract_id: Uuid,
    },

    /// The calendar provider could not classify a date.
    #[error("Calendar unavailable for {date}: {message}")]
    CalendarUnavailable {
        /// The date being classified.
        date: NaiveDate,
        /// A description of the provider failure.
        message: String,
    },

    /// A work interval was malformed.
    #[error("Invalid interval '{interval_id}': {message}")]
    InvalidInterval {
        /// The ID of the invalid interval.
        interval_id: String,
        /// A description of what made the interval invalid.
        message: String,
    },

    /// A compensatory day entry id did not resolve.
    #[error("Compensatory day entry not found: {entry_id}")]
    LedgerEntryNotFound {
        /// The missing entry id.
        entry_id: Uuid,
    },

    /// A compensatory day entry was already redeemed.
    #[error("Compensatory day entry {entry_id} was already redeemed")]
    AlreadyRedeemed {
        /// The entry id.
        entry_id: Uuid,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// Coarse classification of [`EngineError`] used in batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Missing or invalid configuration, including a missing active contract.
    Configuration,
    /// The calendar provider failed.
    CalendarUnavailable,
    /// Malformed input records.
    DataIntegrity,
    /// A uniqueness or state-transition conflict.
    Conflict,
    /// A referenced record does not exist.
    NotFound,
    /// Anything else raised while calculating.
    Calculation,
}

impl EngineError {
    /// Returns the taxonomy class of this error.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::error::{EngineError, ErrorClass};
    ///
    /// let error = EngineError::InvalidInterval {
    ///     interval_id: "wl_1".to_string(),
    ///     message: "end before start".to_string(),
    /// };
    /// assert_eq!(error.class(), ErrorClass::DataIntegrity);
    /// ```
    pub fn class(&self) -> ErrorClass {
        match self {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. }
            | EngineError::NoActiveContract { .. }
            | EngineError::InvalidContract { .. } => ErrorClass::Configuration,
            EngineError::CalendarUnavailable { .. } => ErrorClass::CalendarUnavailable,
            EngineError::InvalidInterval { .. } => ErrorClass::DataIntegrity,
            EngineError::UniquenessViolation { .. } | EngineError::AlreadyRedeemed { .. } => {
                ErrorClass::Conflict
            }
            EngineError::ContractNotFound { .. } | EngineError::LedgerEntryNotFound { .. } => {
                ErrorClass::NotFound
            }
            EngineError::CalculationError { .. } => ErrorClass::Calculation,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
