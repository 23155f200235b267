//! Payroll Calculation Engine
//!
//! This crate calculates gross wages under Israeli labor-law rules: tiered
//! daily overtime, Sabbath and holiday premiums, night-shift norms,
//! statutory hour caps, and the accrual of compensatory days off.
//!
//! The pure calculators live in [`calculation`]; [`engine`] wires them to
//! a calendar, an attendance source, a contract registry, a record store
//! and the compensatory day [`ledger`].

#![warn(missing_docs)]

pub mod calculation;
pub mod calendar;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod models;
