//! Persistence gateway over the zoo records schema.
//!
//! # Responsibility
//! - Define the record CRUD contract (`ZooRepository`).
//! - Isolate SQLite query details from services, search and reports.
//!
//! # Invariants
//! - Repository writes enforce `Record::validate()` and reference checks
//!   before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Validation`,
//!   `ReferentialIntegrity`) in addition to DB transport errors.

pub mod table;
pub mod zoo_repo;
