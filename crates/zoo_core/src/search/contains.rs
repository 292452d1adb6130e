//! Substring search over related record fields.
//!
//! # Responsibility
//! - Build one filtered `SELECT` per kind, following relationships with
//!   `LEFT JOIN` so rows with null references still match on own fields.
//! - Return typed records, or a kind-tagged `Listing` for dispatch callers.
//!
//! # Invariants
//! - Matching is Unicode case-insensitive via `zoo_contains(haystack, needle)`.
//! - A NULL haystack (missing related row) never matches.
//! - Ordering is `t.id ASC`.

use crate::db::DbError;
use crate::model::{
    Animal, AnimalCaretaker, AnimalFeed, Employee, Enclosure, Feed, HealthRecord, Kind, Offspring,
    Position, Record, RecordId, Species,
};
use crate::repo::table::Table;
use crate::repo::zoo_repo::RepoError;
use log::{debug, warn};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTAINS_FN: &str = "zoo_contains";

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for DB interaction and row decoding.
#[derive(Debug)]
pub enum SearchError {
    Db(DbError),
    Repo(RepoError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "search failed: {err}"),
            Self::Repo(err) => write!(f, "search failed: {err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RepoError> for SearchError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Search shape of one record kind. The kind's own table is aliased `t`.
pub trait Searchable: Table {
    /// `LEFT JOIN` clauses bringing related name columns into scope.
    const JOINS: &'static str;
    /// Columns matched against the search text; any match selects the row.
    const FIELDS: &'static [&'static str];
}

impl Searchable for Species {
    const JOINS: &'static str = "";
    const FIELDS: &'static [&'static str] = &["t.name"];
}

impl Searchable for Position {
    const JOINS: &'static str = "";
    const FIELDS: &'static [&'static str] = &["t.name"];
}

impl Searchable for Enclosure {
    const JOINS: &'static str = "";
    const FIELDS: &'static [&'static str] = &["t.name", "t.location", "t.description"];
}

impl Searchable for Feed {
    const JOINS: &'static str = "";
    const FIELDS: &'static [&'static str] = &["t.name", "t.description"];
}

impl Searchable for Animal {
    const JOINS: &'static str = "LEFT JOIN species s ON s.id = t.species_id
         LEFT JOIN enclosure e ON e.id = t.enclosure_id";
    const FIELDS: &'static [&'static str] = &["t.name", "s.name", "e.name"];
}

impl Searchable for Employee {
    const JOINS: &'static str = "LEFT JOIN position p ON p.id = t.position_id";
    const FIELDS: &'static [&'static str] = &["t.name", "p.name", "t.phone"];
}

impl Searchable for AnimalFeed {
    const JOINS: &'static str = "LEFT JOIN animal a ON a.id = t.animal_id
         LEFT JOIN feed f ON f.id = t.feed_id";
    const FIELDS: &'static [&'static str] = &["a.name", "f.name"];
}

impl Searchable for HealthRecord {
    const JOINS: &'static str = "LEFT JOIN animal a ON a.id = t.animal_id";
    const FIELDS: &'static [&'static str] = &["a.name", "t.notes"];
}

impl Searchable for Offspring {
    const JOINS: &'static str = "LEFT JOIN animal m ON m.id = t.mother_id
         LEFT JOIN animal f ON f.id = t.father_id";
    const FIELDS: &'static [&'static str] = &["t.name", "m.name", "f.name"];
}

impl Searchable for AnimalCaretaker {
    const JOINS: &'static str = "LEFT JOIN employee e ON e.id = t.employee_id
         LEFT JOIN animal a ON a.id = t.animal_id";
    const FIELDS: &'static [&'static str] = &["e.name", "a.name"];
}

/// Registers `zoo_contains(haystack, needle)` on `conn`.
///
/// SQLite's `LIKE` and `lower()` only fold ASCII, so names in other scripts
/// would not match case-insensitively without this.
pub fn register_search_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CONTAINS_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<Option<String>>(0)?;
            let needle = ctx.get::<String>(1)?;
            Ok(haystack.is_some_and(|value| contains_ignore_case(&value, &needle)))
        },
    )
}

/// Case-insensitive substring test using full Unicode lowercasing.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Searches one record kind. Blank `text` lists every row.
pub fn search<E: Searchable>(conn: &Connection, text: &str) -> SearchResult<Vec<E>> {
    let needle = text.trim();
    let mut sql = format!(
        "SELECT {} FROM {} t {}",
        E::select_columns("t"),
        E::KIND.table_name(),
        E::JOINS
    );

    let filtered = !needle.is_empty();
    if filtered {
        let predicate = E::FIELDS
            .iter()
            .map(|field| format!("{CONTAINS_FN}({field}, ?1)"))
            .collect::<Vec<_>>()
            .join(" OR ");
        sql.push_str(&format!(" WHERE ({predicate})"));
    }
    sql.push_str(" ORDER BY t.id ASC;");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = if filtered {
        stmt.query([needle])?
    } else {
        stmt.query([])?
    };

    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(E::from_row(row)?);
    }

    debug!(
        "event=search module=search status=ok kind={} filtered={} hits={}",
        E::KIND,
        filtered,
        records.len()
    );
    Ok(records)
}

/// Records of one kind, tagged with that kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum Listing {
    Species(Vec<Species>),
    Enclosure(Vec<Enclosure>),
    Position(Vec<Position>),
    Animal(Vec<Animal>),
    Employee(Vec<Employee>),
    HealthRecord(Vec<HealthRecord>),
    Feed(Vec<Feed>),
    AnimalFeed(Vec<AnimalFeed>),
    Offspring(Vec<Offspring>),
    AnimalCaretaker(Vec<AnimalCaretaker>),
}

macro_rules! with_records {
    ($listing:expr, $records:ident => $body:expr) => {
        match $listing {
            Listing::Species($records) => $body,
            Listing::Enclosure($records) => $body,
            Listing::Position($records) => $body,
            Listing::Animal($records) => $body,
            Listing::Employee($records) => $body,
            Listing::HealthRecord($records) => $body,
            Listing::Feed($records) => $body,
            Listing::AnimalFeed($records) => $body,
            Listing::Offspring($records) => $body,
            Listing::AnimalCaretaker($records) => $body,
        }
    };
}

impl Listing {
    /// Empty listing for `kind`.
    pub fn empty(kind: Kind) -> Self {
        match kind {
            Kind::Species => Self::Species(Vec::new()),
            Kind::Enclosure => Self::Enclosure(Vec::new()),
            Kind::Position => Self::Position(Vec::new()),
            Kind::Animal => Self::Animal(Vec::new()),
            Kind::Employee => Self::Employee(Vec::new()),
            Kind::HealthRecord => Self::HealthRecord(Vec::new()),
            Kind::Feed => Self::Feed(Vec::new()),
            Kind::AnimalFeed => Self::AnimalFeed(Vec::new()),
            Kind::Offspring => Self::Offspring(Vec::new()),
            Kind::AnimalCaretaker => Self::AnimalCaretaker(Vec::new()),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Species(_) => Kind::Species,
            Self::Enclosure(_) => Kind::Enclosure,
            Self::Position(_) => Kind::Position,
            Self::Animal(_) => Kind::Animal,
            Self::Employee(_) => Kind::Employee,
            Self::HealthRecord(_) => Kind::HealthRecord,
            Self::Feed(_) => Kind::Feed,
            Self::AnimalFeed(_) => Kind::AnimalFeed,
            Self::Offspring(_) => Kind::Offspring,
            Self::AnimalCaretaker(_) => Kind::AnimalCaretaker,
        }
    }

    pub fn len(&self) -> usize {
        with_records!(self, records => records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row ids in listing order.
    pub fn ids(&self) -> Vec<RecordId> {
        with_records!(self, records => records.iter().map(Record::id).collect())
    }
}

/// Searches the kind named by `kind` and tags the result.
pub fn search_kind(conn: &Connection, kind: Kind, text: &str) -> SearchResult<Listing> {
    let listing = match kind {
        Kind::Species => Listing::Species(search(conn, text)?),
        Kind::Enclosure => Listing::Enclosure(search(conn, text)?),
        Kind::Position => Listing::Position(search(conn, text)?),
        Kind::Animal => Listing::Animal(search(conn, text)?),
        Kind::Employee => Listing::Employee(search(conn, text)?),
        Kind::HealthRecord => Listing::HealthRecord(search(conn, text)?),
        Kind::Feed => Listing::Feed(search(conn, text)?),
        Kind::AnimalFeed => Listing::AnimalFeed(search(conn, text)?),
        Kind::Offspring => Listing::Offspring(search(conn, text)?),
        Kind::AnimalCaretaker => Listing::AnimalCaretaker(search(conn, text)?),
    };
    Ok(listing)
}

/// Listing plus the message of the failure that emptied it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub listing: Listing,
    pub error: Option<String>,
}

/// Like [`search_kind`], but a failure degrades to an empty listing with the
/// error message attached instead of propagating.
pub fn search_or_empty(conn: &Connection, kind: Kind, text: &str) -> SearchOutcome {
    match search_kind(conn, kind, text) {
        Ok(listing) => SearchOutcome {
            listing,
            error: None,
        },
        Err(err) => {
            warn!(
                "event=search module=search status=error kind={} error={}",
                kind, err
            );
            SearchOutcome {
                listing: Listing::empty(kind),
                error: Some(err.to_string()),
            }
        }
    }
}
