//! Record use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for core callers.
//! - Offer field-by-field edits on top of full-record repository updates.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::{Animal, AnimalCaretaker, HealthRecord, Kind, Record, RecordId};
use crate::repo::table::Table;
use crate::repo::zoo_repo::{RepoError, RepoResult, ZooRepository};
use chrono::NaiveDate;

/// Use-case service wrapper for zoo record operations.
pub struct ZooService<R: ZooRepository> {
    repo: R,
}

impl<R: ZooRepository> ZooService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrowed repository, for callers that need lower-level reads.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn create<E: Table>(&self, record: &E) -> RepoResult<RecordId> {
        self.repo.create(record)
    }

    pub fn get<E: Table>(&self, id: RecordId) -> RepoResult<E> {
        self.repo.get(id)
    }

    pub fn list<E: Table>(&self) -> RepoResult<Vec<E>> {
        self.repo.list()
    }

    pub fn update<E: Table>(&self, record: &E) -> RepoResult<()> {
        self.repo.update(record)
    }

    pub fn delete(&self, kind: Kind, id: RecordId) -> RepoResult<()> {
        self.repo.delete(kind, id)
    }

    /// Reads a record, applies `edit`, and writes it back as one update.
    ///
    /// Returns the stored record. The id cannot be changed by `edit`.
    pub fn edit<E: Table>(&self, id: RecordId, edit: impl FnOnce(&mut E)) -> RepoResult<E> {
        let mut record: E = self.repo.get(id)?;
        edit(&mut record);
        if record.id() != id {
            return Err(RepoError::InvalidData(format!(
                "{} edit must not change id {id}",
                E::KIND
            )));
        }
        self.repo.update(&record)?;
        self.repo.get(id)
    }

    /// Looks up an animal by name; `NameNotFound` when nothing matches.
    pub fn animal_by_name(&self, name: &str) -> RepoResult<Animal> {
        self.repo
            .find_animal_by_name(name)?
            .ok_or_else(|| RepoError::NameNotFound {
                kind: Kind::Animal,
                name: name.trim().to_string(),
            })
    }

    /// Moves an animal to another enclosure, or unassigns it with `None`.
    pub fn relocate_animal(
        &self,
        animal_id: RecordId,
        enclosure_id: Option<RecordId>,
    ) -> RepoResult<Animal> {
        self.edit(animal_id, |animal: &mut Animal| {
            animal.enclosure_id = enclosure_id;
        })
    }

    /// Records a checkup for an animal.
    pub fn record_checkup(
        &self,
        animal_id: RecordId,
        checkup_date: NaiveDate,
        notes: impl Into<String>,
    ) -> RepoResult<RecordId> {
        self.repo.create(&HealthRecord::new(animal_id, checkup_date, notes))
    }

    /// Assigns an employee as caretaker of an animal.
    pub fn assign_caretaker(
        &self,
        employee_id: RecordId,
        animal_id: RecordId,
    ) -> RepoResult<RecordId> {
        self.repo.create(&AnimalCaretaker::new(employee_id, animal_id))
    }
}
