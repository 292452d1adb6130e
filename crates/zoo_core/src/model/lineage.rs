//! Offspring records linking a young animal to its parents.
//!
//! # Invariants
//! - `mother_id`, when set, references an animal with `Sex::Female`.
//! - `father_id`, when set, references an animal with `Sex::Male`.
//! - `animal_id`, when set, is the animal this offspring row describes. Rows
//!   without it are matched to animals by name.

use super::validation::require_text;
use super::{
    reference, Kind, ParentRequirement, Record, RecordId, Reference, Sex, ValidationError,
    UNSAVED_ID,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Offspring parent columns and the sex each one requires.
pub(crate) const PARENT_COLUMNS: [(&str, Sex); 2] =
    [("mother_id", Sex::Female), ("father_id", Sex::Male)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offspring {
    pub id: RecordId,
    pub name: String,
    pub mother_id: Option<RecordId>,
    pub father_id: Option<RecordId>,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
    pub animal_id: Option<RecordId>,
}

impl Offspring {
    pub fn new(name: impl Into<String>, sex: Sex, date_of_birth: NaiveDate) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            mother_id: None,
            father_id: None,
            date_of_birth,
            sex,
            animal_id: None,
        }
    }

    pub fn with_parents(
        mut self,
        mother_id: Option<RecordId>,
        father_id: Option<RecordId>,
    ) -> Self {
        self.mother_id = mother_id;
        self.father_id = father_id;
        self
    }

    pub fn for_animal(mut self, animal_id: RecordId) -> Self {
        self.animal_id = Some(animal_id);
        self
    }
}

impl Record for Offspring {
    const KIND: Kind = Kind::Offspring;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "name", &self.name)
    }

    fn references(&self) -> Vec<Reference> {
        [
            ("mother_id", self.mother_id),
            ("father_id", self.father_id),
            ("animal_id", self.animal_id),
        ]
        .into_iter()
        .filter_map(|(column, id)| id.map(|id| reference(column, Kind::Animal, id)))
        .collect()
    }

    fn parent_requirements(&self) -> Vec<ParentRequirement> {
        PARENT_COLUMNS
            .iter()
            .zip([self.mother_id, self.father_id])
            .filter_map(|(&(column, sex), parent)| {
                parent.map(|animal_id| ParentRequirement {
                    column,
                    animal_id,
                    sex,
                })
            })
            .collect()
    }
}
