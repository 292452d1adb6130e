//! Row mapping between record types and their SQLite tables.
//!
//! # Responsibility
//! - Declare the column list of every table in bind order.
//! - Convert records to bind values and decode rows back into records.
//! - Declare the foreign-key relationships used by the delete policy.
//!
//! # Invariants
//! - `COLUMNS` excludes `id`; `to_values()` yields one value per column.
//! - Decoding rejects persisted values outside model invariants
//!   (`RepoError::InvalidData`) instead of masking them.

use super::zoo_repo::{RepoError, RepoResult};
use crate::model::{
    Animal, AnimalCaretaker, AnimalFeed, Employee, Enclosure, Feed, HealthRecord, Kind, Offspring,
    Position, Record, RecordId, Sex, Species,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Row;

/// Record type stored in its own table.
pub trait Table: Record {
    /// Non-id columns in bind order.
    const COLUMNS: &'static [&'static str];

    /// Bind values matching `COLUMNS`.
    fn to_values(&self) -> Vec<Value>;

    /// Decodes one row selected with `select_columns`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    /// `alias.id AS id, alias.col AS col, ...` for use in joined queries.
    fn select_columns(alias: &str) -> String {
        std::iter::once("id")
            .chain(Self::COLUMNS.iter().copied())
            .map(|column| format!("{alias}.{column} AS {column}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Foreign-key edge from a dependent table to the table it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub child: Kind,
    pub column: &'static str,
    pub parent: Kind,
}

/// Every foreign key in the schema. Deleting a parent row that any of these
/// edges still points at is rejected.
pub const RELATIONS: &[Relation] = &[
    relation(Kind::Animal, "species_id", Kind::Species),
    relation(Kind::Animal, "enclosure_id", Kind::Enclosure),
    relation(Kind::Employee, "position_id", Kind::Position),
    relation(Kind::HealthRecord, "animal_id", Kind::Animal),
    relation(Kind::AnimalFeed, "animal_id", Kind::Animal),
    relation(Kind::AnimalFeed, "feed_id", Kind::Feed),
    relation(Kind::Offspring, "mother_id", Kind::Animal),
    relation(Kind::Offspring, "father_id", Kind::Animal),
    relation(Kind::Offspring, "animal_id", Kind::Animal),
    relation(Kind::AnimalCaretaker, "employee_id", Kind::Employee),
    relation(Kind::AnimalCaretaker, "animal_id", Kind::Animal),
];

const fn relation(child: Kind, column: &'static str, parent: Kind) -> Relation {
    Relation {
        child,
        column,
        parent,
    }
}

/// Relations whose parent side is `kind`.
pub fn dependents_of(kind: Kind) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |relation| relation.parent == kind)
}

impl Table for Species {
    const COLUMNS: &'static [&'static str] = &["name"];

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.name)]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }
}

impl Table for Enclosure {
    const COLUMNS: &'static [&'static str] = &["name", "size", "location", "description"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Real(self.size),
            text(&self.location),
            text(&self.description),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            size: row.get("size")?,
            location: row.get("location")?,
            description: row.get("description")?,
        })
    }
}

impl Table for Position {
    const COLUMNS: &'static [&'static str] = &["name"];

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.name)]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }
}

impl Table for Animal {
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "species_id",
        "enclosure_id",
        "date_of_birth",
        "date_of_arrival",
        "sex",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Integer(self.species_id),
            optional_id(self.enclosure_id),
            date(self.date_of_birth),
            date(self.date_of_arrival),
            text(self.sex.as_str()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            species_id: row.get("species_id")?,
            enclosure_id: row.get("enclosure_id")?,
            date_of_birth: row.get("date_of_birth")?,
            date_of_arrival: row.get("date_of_arrival")?,
            sex: parse_sex(row, Kind::Animal)?,
        })
    }
}

impl Table for Employee {
    const COLUMNS: &'static [&'static str] = &["name", "position_id", "phone", "hire_date"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            optional_id(self.position_id),
            text(&self.phone),
            date(self.hire_date),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            position_id: row.get("position_id")?,
            phone: row.get("phone")?,
            hire_date: row.get("hire_date")?,
        })
    }
}

impl Table for HealthRecord {
    const COLUMNS: &'static [&'static str] = &["animal_id", "checkup_date", "notes"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.animal_id),
            date(self.checkup_date),
            text(&self.notes),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            animal_id: row.get("animal_id")?,
            checkup_date: row.get("checkup_date")?,
            notes: row.get("notes")?,
        })
    }
}

impl Table for Feed {
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.name), text(&self.description)]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
        })
    }
}

impl Table for AnimalFeed {
    const COLUMNS: &'static [&'static str] = &["animal_id", "feed_id", "daily_amount"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.animal_id),
            Value::Integer(self.feed_id),
            Value::Real(self.daily_amount),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            animal_id: row.get("animal_id")?,
            feed_id: row.get("feed_id")?,
            daily_amount: row.get("daily_amount")?,
        })
    }
}

impl Table for Offspring {
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "mother_id",
        "father_id",
        "date_of_birth",
        "sex",
        "animal_id",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            optional_id(self.mother_id),
            optional_id(self.father_id),
            date(self.date_of_birth),
            text(self.sex.as_str()),
            optional_id(self.animal_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            mother_id: row.get("mother_id")?,
            father_id: row.get("father_id")?,
            date_of_birth: row.get("date_of_birth")?,
            sex: parse_sex(row, Kind::Offspring)?,
            animal_id: row.get("animal_id")?,
        })
    }
}

impl Table for AnimalCaretaker {
    const COLUMNS: &'static [&'static str] = &["employee_id", "animal_id"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.employee_id),
            Value::Integer(self.animal_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            employee_id: row.get("employee_id")?,
            animal_id: row.get("animal_id")?,
        })
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn date(value: NaiveDate) -> Value {
    Value::Text(value.format("%Y-%m-%d").to_string())
}

fn optional_id(value: Option<RecordId>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

fn parse_sex(row: &Row<'_>, kind: Kind) -> RepoResult<Sex> {
    let value: String = row.get("sex")?;
    value
        .parse()
        .map_err(|_| RepoError::InvalidData(format!("invalid sex `{value}` in {kind}.sex")))
}

#[cfg(test)]
mod tests {
    use super::{dependents_of, Table, RELATIONS};
    use crate::model::{Animal, Kind, Offspring};

    #[test]
    fn select_columns_aliases_every_column() {
        let select = Animal::select_columns("a");
        assert!(select.starts_with("a.id AS id, a.name AS name"));
        assert!(select.ends_with("a.sex AS sex"));
    }

    #[test]
    fn animal_has_every_lineage_dependent() {
        let children: Vec<_> = dependents_of(Kind::Animal)
            .map(|relation| (relation.child, relation.column))
            .collect();
        assert!(children.contains(&(Kind::HealthRecord, "animal_id")));
        assert!(children.contains(&(Kind::Offspring, "mother_id")));
        assert!(children.contains(&(Kind::Offspring, "father_id")));
        assert!(children.contains(&(Kind::AnimalCaretaker, "animal_id")));
    }

    #[test]
    fn relation_columns_exist_on_child_tables() {
        for relation in RELATIONS {
            let columns: &[&str] = match relation.child {
                Kind::Animal => Animal::COLUMNS,
                Kind::Offspring => Offspring::COLUMNS,
                _ => continue,
            };
            assert!(columns.contains(&relation.column), "{relation:?}");
        }
    }
}
