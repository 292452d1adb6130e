//! Persistence gateway: repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable create/get/list/update/delete APIs over every record kind.
//! - Keep SQL details inside the core persistence boundary.
//! - Classify failures into not-found, validation, referential-integrity and
//!   persistence errors.
//!
//! # Invariants
//! - Every write runs in one `IMMEDIATE` transaction. Any error rolls the
//!   transaction back before it is returned, so no partial change is visible.
//! - Write paths call `Record::validate()`, then check references and parent
//!   sex requirements, before any SQL mutation.
//! - Delete policy is reject: a row still referenced by a dependent row is
//!   never deleted and nothing cascades.
//! - Listings are ordered by primary key (insertion order).

use super::table::{dependents_of, Table};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::lineage::PARENT_COLUMNS;
use crate::model::{Animal, Kind, Offspring, Record, RecordId, Sex, ValidationError};
use log::{info, warn};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const SQLITE_CONSTRAINT_CHECK: i32 = 275;
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;

pub type RepoResult<T> = Result<T, RepoError>;

/// Foreign-key relationship that a write or delete would break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// A written reference points at a row that does not exist.
    DanglingReference {
        kind: Kind,
        column: &'static str,
        target: Kind,
        target_id: RecordId,
    },
    /// The row to delete is still referenced by dependent rows.
    HasDependents {
        kind: Kind,
        id: RecordId,
        dependent: Kind,
        column: &'static str,
        count: i64,
    },
    /// Storage rejected the statement with a foreign-key error.
    Storage(String),
}

impl Display for IntegrityViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingReference {
                kind,
                column,
                target,
                target_id,
            } => write!(
                f,
                "{kind}.{column} references missing {target} {target_id}"
            ),
            Self::HasDependents {
                kind,
                id,
                dependent,
                column,
                count,
            } => write!(
                f,
                "cannot delete {kind} {id}: referenced by {count} {dependent} row(s) via {column}"
            ),
            Self::Storage(message) => write!(f, "foreign key constraint failed: {message}"),
        }
    }
}

/// Repository error taxonomy.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    ReferentialIntegrity(IntegrityViolation),
    Db(DbError),
    NotFound { kind: Kind, id: RecordId },
    NameNotFound { kind: Kind, name: String },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl RepoError {
    /// Whether this error means the target row does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NameNotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ReferentialIntegrity(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::NameNotFound { kind, name } => write!(f, "{kind} not found: `{name}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<IntegrityViolation> for RepoError {
    fn from(value: IntegrityViolation) -> Self {
        Self::ReferentialIntegrity(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            let message = message.clone().unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return Self::ReferentialIntegrity(IntegrityViolation::Storage(message));
                }
                SQLITE_CONSTRAINT_CHECK => {
                    return Self::Validation(ValidationError::Constraint(message));
                }
                _ => {}
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for zoo record CRUD operations.
pub trait ZooRepository {
    /// Inserts a new row and returns its assigned id. `record.id()` is ignored.
    fn create<E: Table>(&self, record: &E) -> RepoResult<RecordId>;
    /// Reads one row; `NotFound` when absent.
    fn get<E: Table>(&self, id: RecordId) -> RepoResult<E>;
    /// Reads one row if present.
    fn find<E: Table>(&self, id: RecordId) -> RepoResult<Option<E>>;
    /// Lists every row of `E` in primary-key order.
    fn list<E: Table>(&self) -> RepoResult<Vec<E>>;
    /// Replaces every field of the row identified by `record.id()`.
    fn update<E: Table>(&self, record: &E) -> RepoResult<()>;
    /// Deletes one row; rejected while dependent rows reference it.
    fn delete(&self, kind: Kind, id: RecordId) -> RepoResult<()>;
    /// Lowest-id animal whose name equals `name`, ignoring ASCII case.
    fn find_animal_by_name(&self, name: &str) -> RepoResult<Option<Animal>>;
    /// Offspring row describing `animal`: linked by id first, else by name.
    fn lineage_of(&self, animal: &Animal) -> RepoResult<Option<Offspring>>;
}

/// SQLite-backed zoo repository borrowing a caller-owned connection.
#[derive(Clone, Copy)]
pub struct SqliteZooRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteZooRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Rejects connections whose schema version is not the latest one, which
    /// catches raw `Connection::open` handles that skipped `open_db`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    /// Underlying connection, for search and report queries.
    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    fn in_write_tx<T>(
        &self,
        event: &'static str,
        kind: Kind,
        op: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        // Repository holds a shared borrow, so the transaction is opened
        // unchecked; the caller owns the connection and runs one write at a time.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let outcome = match op(&tx) {
            Ok(value) => tx.commit().map(|()| value).map_err(RepoError::from),
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event={} module=repo status=error kind={} error_code=rollback_failed error={}",
                        event, kind, rollback_err
                    );
                }
                Err(err)
            }
        };

        match &outcome {
            Ok(_) => info!(
                "event={} module=repo status=ok kind={} duration_ms={}",
                event,
                kind,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event={} module=repo status=error kind={} duration_ms={} error={}",
                event,
                kind,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        outcome
    }
}

impl ZooRepository for SqliteZooRepository<'_> {
    fn create<E: Table>(&self, record: &E) -> RepoResult<RecordId> {
        record.validate()?;

        self.in_write_tx("record_create", E::KIND, |tx| {
            check_references(tx, record)?;
            let placeholders = (1..=E::COLUMNS.len())
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            tx.execute(
                &format!(
                    "INSERT INTO {} ({}) VALUES ({placeholders});",
                    E::KIND.table_name(),
                    E::COLUMNS.join(", ")
                ),
                params_from_iter(record.to_values()),
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    fn get<E: Table>(&self, id: RecordId) -> RepoResult<E> {
        self.find(id)?.ok_or(RepoError::NotFound { kind: E::KIND, id })
    }

    fn find<E: Table>(&self, id: RecordId) -> RepoResult<Option<E>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} t WHERE t.id = ?1;",
            E::select_columns("t"),
            E::KIND.table_name()
        ))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(E::from_row(row)?));
        }
        Ok(None)
    }

    fn list<E: Table>(&self) -> RepoResult<Vec<E>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} t ORDER BY t.id ASC;",
            E::select_columns("t"),
            E::KIND.table_name()
        ))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(E::from_row(row)?);
        }
        Ok(records)
    }

    fn update<E: Table>(&self, record: &E) -> RepoResult<()> {
        record.validate()?;
        let id = record.id();

        self.in_write_tx("record_update", E::KIND, |tx| {
            if !row_exists(tx, E::KIND, id)? {
                return Err(RepoError::NotFound { kind: E::KIND, id });
            }
            check_references(tx, record)?;
            check_parent_roles(tx, record)?;

            let assignments = E::COLUMNS
                .iter()
                .enumerate()
                .map(|(index, column)| format!("{column} = ?{}", index + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let mut values = record.to_values();
            values.push(rusqlite::types::Value::Integer(id));
            tx.execute(
                &format!(
                    "UPDATE {} SET {assignments} WHERE id = ?{};",
                    E::KIND.table_name(),
                    values.len()
                ),
                params_from_iter(values),
            )?;
            Ok(())
        })
    }

    fn delete(&self, kind: Kind, id: RecordId) -> RepoResult<()> {
        self.in_write_tx("record_delete", kind, |tx| {
            if !row_exists(tx, kind, id)? {
                return Err(RepoError::NotFound { kind, id });
            }

            for relation in dependents_of(kind) {
                let count: i64 = tx.query_row(
                    &format!(
                        "SELECT COUNT(*) FROM {} WHERE {} = ?1;",
                        relation.child.table_name(),
                        relation.column
                    ),
                    [id],
                    |row| row.get(0),
                )?;
                if count > 0 {
                    return Err(IntegrityViolation::HasDependents {
                        kind,
                        id,
                        dependent: relation.child,
                        column: relation.column,
                        count,
                    }
                    .into());
                }
            }

            tx.execute(
                &format!("DELETE FROM {} WHERE id = ?1;", kind.table_name()),
                [id],
            )?;
            Ok(())
        })
    }

    fn find_animal_by_name(&self, name: &str) -> RepoResult<Option<Animal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM animal t
             WHERE t.name = ?1 COLLATE NOCASE
             ORDER BY t.id ASC
             LIMIT 1;",
            Animal::select_columns("t")
        ))?;
        let mut rows = stmt.query([name.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Animal::from_row(row)?));
        }
        Ok(None)
    }

    fn lineage_of(&self, animal: &Animal) -> RepoResult<Option<Offspring>> {
        let columns = Offspring::select_columns("t");
        let linked = self
            .conn
            .query_row(
                &format!(
                    "SELECT {columns} FROM offspring t
                     WHERE t.animal_id = ?1
                     ORDER BY t.id ASC
                     LIMIT 1;"
                ),
                [animal.id],
                |row| Ok(Offspring::from_row(row)),
            )
            .optional()?;
        if let Some(offspring) = linked {
            return offspring.map(Some);
        }

        let by_name = self
            .conn
            .query_row(
                &format!(
                    "SELECT {columns} FROM offspring t
                     WHERE t.animal_id IS NULL
                       AND t.name = ?1
                     ORDER BY t.id ASC
                     LIMIT 1;"
                ),
                [animal.name.as_str()],
                |row| Ok(Offspring::from_row(row)),
            )
            .optional()?;
        by_name.transpose()
    }
}

fn row_exists(conn: &Connection, kind: Kind, id: RecordId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
            kind.table_name()
        ),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn check_references<E: Record>(conn: &Connection, record: &E) -> RepoResult<()> {
    for reference in record.references() {
        if !row_exists(conn, reference.target, reference.id)? {
            return Err(IntegrityViolation::DanglingReference {
                kind: E::KIND,
                column: reference.column,
                target: reference.target,
                target_id: reference.id,
            }
            .into());
        }
    }

    for requirement in record.parent_requirements() {
        let sex_text: String = conn.query_row(
            "SELECT sex FROM animal WHERE id = ?1;",
            [requirement.animal_id],
            |row| row.get(0),
        )?;
        let actual: Sex = sex_text.parse().map_err(|_| {
            RepoError::InvalidData(format!("invalid sex `{sex_text}` in animal.sex"))
        })?;
        if actual != requirement.sex {
            return Err(ValidationError::ParentSexMismatch {
                column: requirement.column,
                animal_id: requirement.animal_id,
                expected: requirement.sex,
                actual,
            }
            .into());
        }
    }

    Ok(())
}

/// Rejects a sex change on an animal that offspring rows still name in the
/// parent role requiring the other sex.
fn check_parent_roles<E: Record>(conn: &Connection, record: &E) -> RepoResult<()> {
    let Some(actual) = record.parent_sex() else {
        return Ok(());
    };

    for (column, expected) in PARENT_COLUMNS {
        if actual == expected {
            continue;
        }
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM offspring WHERE {column} = ?1;"),
            [record.id()],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(ValidationError::ParentSexMismatch {
                column,
                animal_id: record.id(),
                expected,
                actual,
            }
            .into());
        }
    }

    Ok(())
}
