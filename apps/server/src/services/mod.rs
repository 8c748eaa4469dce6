//! Business logic layer
//!
//! Services validate input, run write workflows inside a single transaction and
//! shape read results for the API.

pub mod formatting;
pub mod images;
pub mod patients;
pub mod sessions;
pub mod validation;

pub use patients::PatientService;
pub use sessions::SessionService;
