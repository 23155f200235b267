//! Compensation contract model.
//!
//! A contract is the pay configuration governing an employee's
//! calculations: either an hourly rate or a monthly base salary.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PayrollRules;
use crate::error::{EngineError, EngineResult};

/// Default currency for newly built contracts.
pub const DEFAULT_CURRENCY: &str = "ILS";

/// How an employee's pay is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    /// Paid per hour worked.
    Hourly,
    /// Paid a monthly salary prorated by attendance, plus premiums.
    Monthly,
}

/// A per-employee compensation contract.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{CalculationType, Contract};
/// use rust_decimal::Decimal;
///
/// let contract = Contract::hourly("emp_001", Decimal::new(110, 0));
/// assert_eq!(contract.calculation_type, CalculationType::Hourly);
/// assert!(contract.is_active);
/// assert!(contract.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Unique identifier for the contract.
    pub id: Uuid,
    /// The employee the contract belongs to.
    pub employee_id: String,
    /// Hourly or monthly.
    pub calculation_type: CalculationType,
    /// Hourly rate, required for hourly contracts.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Monthly base salary, required for monthly contracts.
    #[serde(default)]
    pub base_salary: Option<Decimal>,
    /// ISO currency code.
    pub currency: String,
    /// Whether this contract is the employee's active one.
    pub is_active: bool,
}

impl Contract {
    /// Builds an active hourly contract.
    pub fn hourly(employee_id: impl Into<String>, hourly_rate: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            calculation_type: CalculationType::Hourly,
            hourly_rate: Some(hourly_rate),
            base_salary: None,
            currency: DEFAULT_CURRENCY.to_string(),
            is_active: true,
        }
    }

    /// Builds an active monthly contract.
    pub fn monthly(employee_id: impl Into<String>, base_salary: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            calculation_type: CalculationType::Monthly,
            hourly_rate: None,
            base_salary: Some(base_salary),
            currency: DEFAULT_CURRENCY.to_string(),
            is_active: true,
        }
    }

    /// Checks that the contract carries the amount its type needs.
    pub fn validate(&self) -> EngineResult<()> {
        let (field, amount) = match self.calculation_type {
            CalculationType::Hourly => ("hourly_rate", self.hourly_rate),
            CalculationType::Monthly => ("base_salary", self.base_salary),
        };

        match amount {
            Some(value) if value > Decimal::ZERO => {}
            Some(value) => {
                return Err(EngineError::InvalidContract {
                    contract_id: self.id,
                    message: format!("{} must be positive, got {}", field, value),
                });
            }
            None => {
                return Err(EngineError::InvalidContract {
                    contract_id: self.id,
                    message: format!("{} is required for {:?} contracts", field, self.calculation_type),
                });
            }
        }

        if self.currency.len() != 3 {
            return Err(EngineError::InvalidContract {
                contract_id: self.id,
                message: format!("currency '{}' is not an ISO code", self.currency),
            });
        }

        Ok(())
    }

    /// Returns the rate premium tiers are multiplied against.
    ///
    /// Hourly contracts use their rate directly. Monthly contracts use
    /// `base_salary / hours_divisor`, rounded to 4 decimal places.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::PayrollRules;
    /// use payroll_engine::models::Contract;
    /// use rust_decimal::Decimal;
    ///
    /// let contract = Contract::monthly("emp_002", Decimal::new(9100, 0));
    /// let rate = contract.effective_hourly_rate(&PayrollRules::default()).unwrap();
    /// assert_eq!(rate, Decimal::new(50, 0)); // 9100 / 182
    /// ```
    pub fn effective_hourly_rate(&self, rules: &PayrollRules) -> EngineResult<Decimal> {
        self.validate()?;
        match self.calculation_type {
            CalculationType::Hourly => Ok(self.hourly_rate.unwrap_or_default()),
            CalculationType::Monthly => {
                let salary = self.base_salary.unwrap_or_default();
                let divisor = rules.monthly.hours_divisor;
                salary
                    .checked_div(divisor)
                    .filter(|_| divisor > Decimal::ZERO)
                    .map(|rate| rate.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero))
                    .ok_or_else(|| EngineError::InvalidConfig {
                        field: "monthly.hours_divisor".to_string(),
                        message: format!("cannot derive an hourly rate with divisor {}", divisor),
                    })
            }
        }
    }
}
