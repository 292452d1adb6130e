//! Staff records: positions, employees and caretaker assignments.
//!
//! # Invariants
//! - `Employee.position_id` is optional; a blank position is `None`.
//! - `AnimalCaretaker` is a pure join row; both references are required.

use super::validation::{check_phone, require_text};
use super::{reference, Kind, Record, RecordId, Reference, ValidationError, UNSAVED_ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Job title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: RecordId,
    pub name: String,
}

impl Position {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
        }
    }
}

impl Record for Position {
    const KIND: Kind = Kind::Position;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: RecordId,
    pub name: String,
    pub position_id: Option<RecordId>,
    pub phone: String,
    pub hire_date: NaiveDate,
}

impl Employee {
    pub fn new(name: impl Into<String>, hire_date: NaiveDate) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            position_id: None,
            phone: String::new(),
            hire_date,
        }
    }

    pub fn with_position(mut self, position_id: RecordId) -> Self {
        self.position_id = Some(position_id);
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }
}

impl Record for Employee {
    const KIND: Kind = Kind::Employee;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "name", &self.name)?;
        check_phone(&self.phone)
    }

    fn references(&self) -> Vec<Reference> {
        self.position_id
            .map(|id| reference("position_id", Kind::Position, id))
            .into_iter()
            .collect()
    }
}

/// Assignment of one employee as caretaker of one animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalCaretaker {
    pub id: RecordId,
    pub employee_id: RecordId,
    pub animal_id: RecordId,
}

impl AnimalCaretaker {
    pub fn new(employee_id: RecordId, animal_id: RecordId) -> Self {
        Self {
            id: UNSAVED_ID,
            employee_id,
            animal_id,
        }
    }
}

impl Record for AnimalCaretaker {
    const KIND: Kind = Kind::AnimalCaretaker;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            reference("employee_id", Kind::Employee, self.employee_id),
            reference("animal_id", Kind::Animal, self.animal_id),
        ]
    }
}
