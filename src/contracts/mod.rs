//! Compensation contract registry.
//!
//! Holds every contract and guarantees that each employee has at most one
//! active contract at any instant. The unique active index lives beside
//! the records inside one lock, so checking and switching the active
//! contract happen in a single transaction.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::Contract;

#[derive(Debug, Default)]
struct RegistryState {
    contracts: BTreeMap<Uuid, Contract>,
    active: HashMap<String, Uuid>,
}

impl RegistryState {
    /// Makes `contract_id` the only active contract of its employee.
    fn switch_active(&mut self, contract_id: Uuid) -> EngineResult<Contract> {
        let employee_id = self
            .contracts
            .get(&contract_id)
            .map(|c| c.employee_id.clone())
            .ok_or(EngineError::ContractNotFound { contract_id })?;

        if let Some(previous) = self.active.insert(employee_id.clone(), contract_id) {
            if previous != contract_id {
                if let Some(old) = self.contracts.get_mut(&previous) {
                    old.is_active = false;
                }
                info!(
                    employee_id = %employee_id,
                    deactivated = %previous,
                    activated = %contract_id,
                    "Active contract replaced"
                );
            }
        }

        let contract = self
            .contracts
            .get_mut(&contract_id)
            .ok_or(EngineError::ContractNotFound { contract_id })?;
        contract.is_active = true;
        Ok(contract.clone())
    }
}

/// In-memory store of compensation contracts.
///
/// # Example
///
/// ```
/// use payroll_engine::contracts::ContractRegistry;
/// use payroll_engine::models::Contract;
/// use rust_decimal::Decimal;
///
/// let registry = ContractRegistry::new();
/// let first = Contract::hourly("emp_001", Decimal::new(40, 0));
/// let second = Contract::hourly("emp_001", Decimal::new(45, 0));
/// registry.insert(first.clone()).unwrap();
/// registry.insert(second.clone()).unwrap();
///
/// let active = registry.active_for("emp_001").unwrap();
/// assert_eq!(active.id, second.id);
/// assert!(!registry.get(first.id).unwrap().is_active);
/// ```
#[derive(Debug, Default)]
pub struct ContractRegistry {
    state: RwLock<RegistryState>,
}

impl ContractRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, RegistryState>> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, RegistryState>> {
        self.state.write().map_err(poisoned)
    }

    /// Stores a contract. An active contract replaces the employee's
    /// current one in the same transaction.
    pub fn insert(&self, contract: Contract) -> EngineResult<()> {
        contract.validate()?;
        let mut state = self.write()?;

        if state.contracts.contains_key(&contract.id) {
            return Err(EngineError::InvalidContract {
                contract_id: contract.id,
                message: "a contract with this id is already registered".to_string(),
            });
        }

        let id = contract.id;
        let activate = contract.is_active;
        let mut stored = contract;
        stored.is_active = false;
        state.contracts.insert(id, stored);

        if activate {
            state.switch_active(id)?;
        }
        Ok(())
    }

    /// Activates a contract, deactivating every other contract of the
    /// same employee.
    pub fn activate(&self, contract_id: Uuid) -> EngineResult<Contract> {
        self.write()?.switch_active(contract_id)
    }

    /// Activates a contract only if the employee's active contract is still
    /// `expected_active`.
    ///
    /// A caller that read the active contract and then lost a race to a
    /// concurrent activation receives [`EngineError::UniquenessViolation`]
    /// instead of silently overwriting the winner.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::contracts::ContractRegistry;
    /// use payroll_engine::error::EngineError;
    /// use payroll_engine::models::Contract;
    /// use rust_decimal::Decimal;
    ///
    /// let registry = ContractRegistry::new();
    /// let mut a = Contract::hourly("emp_001", Decimal::new(40, 0));
    /// let mut b = Contract::hourly("emp_001", Decimal::new(50, 0));
    /// a.is_active = false;
    /// b.is_active = false;
    /// registry.insert(a.clone()).unwrap();
    /// registry.insert(b.clone()).unwrap();
    ///
    /// // Both callers saw no active contract; only the first wins.
    /// registry.activate_expecting(a.id, None).unwrap();
    /// let lost = registry.activate_expecting(b.id, None);
    /// assert!(matches!(lost, Err(EngineError::UniquenessViolation { .. })));
    /// ```
    pub fn activate_expecting(
        &self,
        contract_id: Uuid,
        expected_active: Option<Uuid>,
    ) -> EngineResult<Contract> {
        let mut state = self.write()?;
        let employee_id = state
            .contracts
            .get(&contract_id)
            .map(|c| c.employee_id.clone())
            .ok_or(EngineError::ContractNotFound { contract_id })?;

        let current = state.active.get(&employee_id).copied();
        if current != expected_active && current != Some(contract_id) {
            warn!(
                employee_id = %employee_id,
                contract_id = %contract_id,
                "Concurrent activation detected"
            );
            return Err(EngineError::UniquenessViolation {
                employee_id,
                contract_id,
            });
        }

        state.switch_active(contract_id)
    }

    /// Deactivates a contract. The employee is left without an active one.
    pub fn deactivate(&self, contract_id: Uuid) -> EngineResult<Contract> {
        let mut state = self.write()?;
        let contract = state
            .contracts
            .get_mut(&contract_id)
            .ok_or(EngineError::ContractNotFound { contract_id })?;
        contract.is_active = false;
        let contract = contract.clone();

        if state.active.get(&contract.employee_id) == Some(&contract_id) {
            state.active.remove(&contract.employee_id);
        }
        Ok(contract)
    }

    /// Loads persisted contracts as they are.
    ///
    /// Nothing is stored if the batch, together with the registry's current
    /// state, would leave an employee with two active contracts.
    pub fn import(&self, contracts: Vec<Contract>) -> EngineResult<()> {
        for contract in &contracts {
            contract.validate()?;
        }

        let mut state = self.write()?;
        let mut active = state.active.clone();

        for contract in &contracts {
            if state.contracts.contains_key(&contract.id) {
                return Err(EngineError::InvalidContract {
                    contract_id: contract.id,
                    message: "a contract with this id is already registered".to_string(),
                });
            }
            if contract.is_active {
                if let Some(existing) = active.insert(contract.employee_id.clone(), contract.id) {
                    if existing != contract.id {
                        return Err(EngineError::UniquenessViolation {
                            employee_id: contract.employee_id.clone(),
                            contract_id: contract.id,
                        });
                    }
                }
            }
        }

        let count = contracts.len();
        for contract in contracts {
            state.contracts.insert(contract.id, contract);
        }
        state.active = active;

        info!(count, "Contracts imported");
        Ok(())
    }

    /// Returns the employee's active contract.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoActiveContract`] naming the employee.
    pub fn active_for(&self, employee_id: &str) -> EngineResult<Contract> {
        let state = self.read()?;
        state
            .active
            .get(employee_id)
            .and_then(|id| state.contracts.get(id))
            .cloned()
            .ok_or_else(|| EngineError::NoActiveContract {
                employee_id: employee_id.to_string(),
            })
    }

    /// Every contract of an employee, active or not, ordered by id.
    pub fn contracts_for(&self, employee_id: &str) -> EngineResult<Vec<Contract>> {
        Ok(self
            .read()?
            .contracts
            .values()
            .filter(|c| c.employee_id == employee_id)
            .cloned()
            .collect())
    }

    /// Returns a contract by id.
    pub fn get(&self, contract_id: Uuid) -> EngineResult<Contract> {
        self.read()?
            .contracts
            .get(&contract_id)
            .cloned()
            .ok_or(EngineError::ContractNotFound { contract_id })
    }
}

fn poisoned<T>(_: PoisonError<T>) -> EngineError {
    EngineError::CalculationError {
        message: "contract registry lock poisoned".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::{Arc, Barrier};

    fn hourly(employee: &str, rate: i64) -> Contract {
        Contract::hourly(employee, Decimal::new(rate, 0))
    }

    fn inactive(employee: &str, rate: i64) -> Contract {
        let mut contract = hourly(employee, rate);
        contract.is_active = false;
        contract
    }

    fn active_count(registry: &ContractRegistry, employee: &str) -> usize {
        registry
            .contracts_for(employee)
            .unwrap()
            .iter()
            .filter(|c| c.is_active)
            .count()
    }

    /// CR-001: activating a second contract leaves exactly one active
    #[test]
    fn test_cr_001_second_activation_replaces_first() {
        let registry = ContractRegistry::new();
        let first = inactive("emp_001", 40);
        let second = inactive("emp_001", 45);
        registry.insert(first.clone()).unwrap();
        registry.insert(second.clone()).unwrap();

        registry.activate(first.id).unwrap();
        registry.activate(second.id).unwrap();

        assert_eq!(active_count(&registry, "emp_001"), 1);
        assert_eq!(registry.active_for("emp_001").unwrap().id, second.id);
    }

    /// CR-002: no active contract is a configuration error naming the employee
    #[test]
    fn test_cr_002_missing_active_contract() {
        let registry = ContractRegistry::new();
        registry.insert(inactive("emp_001", 40)).unwrap();

        match registry.active_for("emp_001") {
            Err(EngineError::NoActiveContract { employee_id }) => assert_eq!(employee_id, "emp_001"),
            other => panic!("Expected NoActiveContract, got {:?}", other),
        }
    }

    /// CR-003: stale optimistic activation loses
    #[test]
    fn test_cr_003_stale_expectation_is_rejected() {
        let registry = ContractRegistry::new();
        let current = hourly("emp_001", 40);
        let candidate = inactive("emp_001", 50);
        registry.insert(current.clone()).unwrap();
        registry.insert(candidate.clone()).unwrap();

        let result = registry.activate_expecting(candidate.id, None);
        assert!(matches!(result, Err(EngineError::UniquenessViolation { .. })));
        assert_eq!(registry.active_for("emp_001").unwrap().id, current.id);

        registry.activate_expecting(candidate.id, Some(current.id)).unwrap();
        assert_eq!(registry.active_for("emp_001").unwrap().id, candidate.id);
    }

    /// CR-004: concurrent activations keep the invariant
    #[test]
    fn test_cr_004_concurrent_activations() {
        let registry = Arc::new(ContractRegistry::new());
        let contracts: Vec<Contract> = (0..8).map(|i| inactive("emp_001", 40 + i)).collect();
        for contract in &contracts {
            registry.insert(contract.clone()).unwrap();
        }

        let barrier = Arc::new(Barrier::new(contracts.len()));
        let results: Vec<EngineResult<Contract>> = std::thread::scope(|scope| {
            let handles: Vec<_> = contracts
                .iter()
                .map(|contract| {
                    let registry = Arc::clone(&registry);
                    let barrier = Arc::clone(&barrier);
                    let id = contract.id;
                    scope.spawn(move || {
                        barrier.wait();
                        registry.activate_expecting(id, None)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners: Vec<&Contract> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(active_count(&registry, "emp_001"), 1);
        assert_eq!(registry.active_for("emp_001").unwrap().id, winners[0].id);
    }

    /// CR-005: import refuses two active contracts for one employee
    #[test]
    fn test_cr_005_import_enforces_uniqueness() {
        let registry = ContractRegistry::new();
        let result = registry.import(vec![hourly("emp_001", 40), hourly("emp_001", 45)]);

        assert!(matches!(result, Err(EngineError::UniquenessViolation { .. })));
        assert!(registry.contracts_for("emp_001").unwrap().is_empty());
    }

    #[test]
    fn test_import_against_existing_active() {
        let registry = ContractRegistry::new();
        registry.insert(hourly("emp_001", 40)).unwrap();
        let result = registry.import(vec![hourly("emp_001", 45), inactive("emp_002", 30)]);
        assert!(result.is_err());
        assert!(registry.contracts_for("emp_002").unwrap().is_empty());
    }

    #[test]
    fn test_import_keeps_inactive_history() {
        let registry = ContractRegistry::new();
        registry
            .import(vec![inactive("emp_001", 35), hourly("emp_001", 40), hourly("emp_002", 30)])
            .unwrap();
        assert_eq!(registry.contracts_for("emp_001").unwrap().len(), 2);
        assert_eq!(active_count(&registry, "emp_001"), 1);
        assert!(registry.active_for("emp_002").is_ok());
    }

    #[test]
    fn test_deactivate() {
        let registry = ContractRegistry::new();
        let contract = hourly("emp_001", 40);
        registry.insert(contract.clone()).unwrap();

        let deactivated = registry.deactivate(contract.id).unwrap();
        assert!(!deactivated.is_active);
        assert!(registry.active_for("emp_001").is_err());
    }

    #[test]
    fn test_invalid_contract_is_not_stored() {
        let registry = ContractRegistry::new();
        let mut contract = hourly("emp_001", 40);
        contract.hourly_rate = None;
        assert!(registry.insert(contract.clone()).is_err());
        assert!(matches!(
            registry.get(contract.id),
            Err(EngineError::ContractNotFound { .. })
        ));
    }

    #[test]
    fn test_activate_unknown_contract() {
        let registry = ContractRegistry::new();
        assert!(matches!(
            registry.activate(Uuid::new_v4()),
            Err(EngineError::ContractNotFound { .. })
        ));
    }
}
