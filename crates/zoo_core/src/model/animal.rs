//! Animals and the species/enclosure records they belong to.
//!
//! # Invariants
//! - `Animal.species_id` is required; `enclosure_id` may be `None`
//!   (animal not assigned to an enclosure).
//! - `Animal.date_of_arrival` is never earlier than `date_of_birth`.
//! - `Enclosure.size` is a finite area in square meters, greater than zero.

use super::validation::{require_positive, require_text};
use super::{reference, Kind, Record, RecordId, Reference, Sex, ValidationError, UNSAVED_ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub id: RecordId,
    pub name: String,
}

impl Species {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
        }
    }
}

impl Record for Species {
    const KIND: Kind = Kind::Species;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enclosure {
    pub id: RecordId,
    pub name: String,
    /// Area in square meters.
    pub size: f64,
    pub location: String,
    pub description: String,
}

impl Enclosure {
    pub fn new(name: impl Into<String>, size: f64, location: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            size,
            location: location.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Record for Enclosure {
    const KIND: Kind = Kind::Enclosure;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "name", &self.name)?;
        require_positive(Self::KIND, "size", self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
    pub id: RecordId,
    pub name: String,
    pub species_id: RecordId,
    /// `None` while the animal is not assigned to an enclosure.
    pub enclosure_id: Option<RecordId>,
    pub date_of_birth: NaiveDate,
    pub date_of_arrival: NaiveDate,
    pub sex: Sex,
}

impl Animal {
    /// Creates an unassigned animal that arrived on its birth date.
    ///
    /// Use struct update syntax or the setters to fill the remaining fields.
    pub fn new(
        name: impl Into<String>,
        species_id: RecordId,
        sex: Sex,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            species_id,
            enclosure_id: None,
            date_of_birth,
            date_of_arrival: date_of_birth,
            sex,
        }
    }

    pub fn in_enclosure(mut self, enclosure_id: RecordId) -> Self {
        self.enclosure_id = Some(enclosure_id);
        self
    }

    pub fn arrived_on(mut self, date_of_arrival: NaiveDate) -> Self {
        self.date_of_arrival = date_of_arrival;
        self
    }
}

impl Record for Animal {
    const KIND: Kind = Kind::Animal;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "name", &self.name)?;
        if self.date_of_arrival < self.date_of_birth {
            return Err(ValidationError::DateOrder {
                kind: Self::KIND,
                earlier: "date_of_birth",
                later: "date_of_arrival",
            });
        }
        Ok(())
    }

    fn references(&self) -> Vec<Reference> {
        let mut refs = vec![reference("species_id", Kind::Species, self.species_id)];
        if let Some(enclosure_id) = self.enclosure_id {
            refs.push(reference("enclosure_id", Kind::Enclosure, enclosure_id));
        }
        refs
    }

    fn parent_sex(&self) -> Option<Sex> {
        Some(self.sex)
    }
}
