//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI/report layers decoupled from storage details.

pub mod pedigree_service;
pub mod zoo_service;
