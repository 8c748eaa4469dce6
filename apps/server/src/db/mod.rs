//! Database layer
//!
//! Write helpers take `&mut PgConnection` so they compose inside one transaction
//! ([`TransactionRunner`]). Read-side repositories hold the pool.

pub mod address;
pub mod lookup;
pub mod patients;
pub mod sessions;
pub mod transaction;

pub use address::{AddressInput, Reclaimed};
pub use lookup::LookupTable;
pub use patients::{MedicalLink, NewPatient, PatientRepository};
pub use sessions::{NewPrescription, NewService, NewSession, SessionPurge, SessionRepository};
pub use transaction::TransactionRunner;
