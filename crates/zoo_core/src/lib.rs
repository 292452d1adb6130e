//! Core domain logic for the zoo records system.
//! This crate is the single source of truth for record invariants.
//!
//! Layers, leaves first: `model` (record types), `db` (connection and
//! schema), `repo` (persistence gateway), `search`, `service` (CRUD facade
//! and pedigree resolver), `report`, `refresh`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod refresh;
pub mod repo;
pub mod report;
pub mod search;
pub mod service;

pub use config::ZooConfig;
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LogTarget,
};
pub use model::{
    Animal, AnimalCaretaker, AnimalFeed, Employee, Enclosure, Feed, HealthRecord, Kind, Offspring,
    Position, Record, RecordId, Sex, Species, ValidationError, UNSAVED_ID,
};
pub use refresh::ListingRefresher;
pub use repo::table::Table;
pub use repo::zoo_repo::{
    IntegrityViolation, RepoError, RepoResult, SqliteZooRepository, ZooRepository,
};
pub use report::{
    build_report, export_report, paginate, Report, ReportError, ReportKind, ReportRequest,
};
pub use search::{search, search_kind, search_or_empty, Listing, SearchError, SearchOutcome};
pub use service::pedigree_service::{
    Pedigree, PedigreeEntry, PedigreeLine, PedigreeService, DEFAULT_PEDIGREE_DEPTH,
};
pub use service::zoo_service::ZooService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
