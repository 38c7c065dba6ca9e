//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for the deposit pool.
//! NO I/O, NO external calls.
//!
//! ## Components
//!
//! - `value_objects`: Address, ContractName, U256, wei units
//! - `entities`: DepositSettings, notifications, receipts
//! - `invariants`: policy checks and excess arithmetic
//! - `unit_of_work`: compensation journal for all-or-nothing operations
//! - `errors`: DepositPoolError, CollaboratorError

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod unit_of_work;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use unit_of_work::*;
pub use value_objects::*;
