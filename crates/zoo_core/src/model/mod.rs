//! Zoo records domain model.
//!
//! # Responsibility
//! - Define the record kinds persisted by the core and their relationships.
//! - Provide pure validation for field-level invariants.
//!
//! # Invariants
//! - Every record is identified by an integer `RecordId` assigned by storage.
//! - References between records are plain ids; resolution happens in `repo`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod animal;
pub mod care;
pub mod lineage;
pub mod staff;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub use animal::{Animal, Enclosure, Species};
pub use care::{AnimalFeed, Feed, HealthRecord};
pub use lineage::Offspring;
pub use staff::{AnimalCaretaker, Employee, Position};
pub use validation::ValidationError;

/// Storage-assigned row identifier.
pub type RecordId = i64;

/// Id carried by records that have not been persisted yet.
///
/// `create` ignores the id on input and returns the assigned one.
pub const UNSAVED_ID: RecordId = 0;

/// Record kind tag used to dispatch CRUD, search and report operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Species,
    Enclosure,
    Position,
    Animal,
    Employee,
    HealthRecord,
    Feed,
    AnimalFeed,
    Offspring,
    AnimalCaretaker,
}

impl Kind {
    /// All kinds in schema dependency order (referenced kinds first).
    pub const ALL: [Kind; 10] = [
        Kind::Species,
        Kind::Enclosure,
        Kind::Position,
        Kind::Animal,
        Kind::Employee,
        Kind::HealthRecord,
        Kind::Feed,
        Kind::AnimalFeed,
        Kind::Offspring,
        Kind::AnimalCaretaker,
    ];

    /// Storage table backing this kind.
    pub fn table_name(self) -> &'static str {
        match self {
            Kind::Species => "species",
            Kind::Enclosure => "enclosure",
            Kind::Position => "position",
            Kind::Animal => "animal",
            Kind::Employee => "employee",
            Kind::HealthRecord => "health_record",
            Kind::Feed => "feed",
            Kind::AnimalFeed => "animal_feed",
            Kind::Offspring => "offspring",
            Kind::AnimalCaretaker => "animal_caretaker",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for Kind {
    type Err = String;

    /// Accepts table names plus the common plural/short forms used by the CLI.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        let kind = match normalized.as_str() {
            "species" => Kind::Species,
            "enclosure" | "enclosures" => Kind::Enclosure,
            "position" | "positions" => Kind::Position,
            "animal" | "animals" => Kind::Animal,
            "employee" | "employees" | "staff" => Kind::Employee,
            "health_record" | "health_records" | "health" => Kind::HealthRecord,
            "feed" | "feeds" => Kind::Feed,
            "animal_feed" | "animal_feeds" | "feeding" => Kind::AnimalFeed,
            "offspring" | "lineage" => Kind::Offspring,
            "animal_caretaker" | "animal_caretakers" | "caretaker" | "caretakers" => {
                Kind::AnimalCaretaker
            }
            other => return Err(format!("unknown record kind `{other}`")),
        };
        Ok(kind)
    }
}

/// Biological sex, restricted to exactly two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Storage representation; matches the `CHECK (sex IN (...))` constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

impl Display for Sex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Male" => Ok(Sex::Male),
            "Female" => Ok(Sex::Female),
            other => Err(ValidationError::InvalidSex(other.to_string())),
        }
    }
}

/// Non-null foreign key carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Referencing column on the record's own table.
    pub column: &'static str,
    /// Kind of the referenced row.
    pub target: Kind,
    /// Referenced row id.
    pub id: RecordId,
}

/// Sex the referenced animal must have for the reference to be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRequirement {
    pub column: &'static str,
    pub animal_id: RecordId,
    pub sex: Sex,
}

/// Common behavior of every persisted record kind.
pub trait Record: Clone + std::fmt::Debug {
    /// Kind tag of this record type.
    const KIND: Kind;

    /// Storage id; `UNSAVED_ID` before creation.
    fn id(&self) -> RecordId;

    /// Checks field-level invariants that need no storage access.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Non-null references that must resolve to existing rows.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Sex constraints on referenced animals.
    fn parent_requirements(&self) -> Vec<ParentRequirement> {
        Vec::new()
    }

    /// Sex this record must keep while offspring rows name it as a parent.
    fn parent_sex(&self) -> Option<Sex> {
        None
    }
}

pub(crate) fn reference(column: &'static str, target: Kind, id: RecordId) -> Reference {
    Reference { column, target, id }
}
