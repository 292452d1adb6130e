//! Feeding plans and health checkups.
//!
//! # Invariants
//! - `AnimalFeed.daily_amount` is a finite, non-negative mass in kilograms.
//! - `HealthRecord` always belongs to exactly one animal.

use super::validation::{require_non_negative, require_text};
use super::{reference, Kind, Record, RecordId, Reference, ValidationError, UNSAVED_ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: RecordId,
    pub name: String,
    pub description: String,
}

impl Feed {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            description: description.into(),
        }
    }
}

impl Record for Feed {
    const KIND: Kind = Kind::Feed;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "name", &self.name)
    }
}

/// Daily ration of one feed for one animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalFeed {
    pub id: RecordId,
    pub animal_id: RecordId,
    pub feed_id: RecordId,
    /// Kilograms per day.
    pub daily_amount: f64,
}

impl AnimalFeed {
    pub fn new(animal_id: RecordId, feed_id: RecordId, daily_amount: f64) -> Self {
        Self {
            id: UNSAVED_ID,
            animal_id,
            feed_id,
            daily_amount,
        }
    }
}

impl Record for AnimalFeed {
    const KIND: Kind = Kind::AnimalFeed;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_negative(Self::KIND, "daily_amount", self.daily_amount)
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            reference("animal_id", Kind::Animal, self.animal_id),
            reference("feed_id", Kind::Feed, self.feed_id),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: RecordId,
    pub animal_id: RecordId,
    pub checkup_date: NaiveDate,
    pub notes: String,
}

impl HealthRecord {
    pub fn new(animal_id: RecordId, checkup_date: NaiveDate, notes: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            animal_id,
            checkup_date,
            notes: notes.into(),
        }
    }
}

impl Record for HealthRecord {
    const KIND: Kind = Kind::HealthRecord;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    fn references(&self) -> Vec<Reference> {
        vec![reference("animal_id", Kind::Animal, self.animal_id)]
    }
}
