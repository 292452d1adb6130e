//! Text reports over zoo records.
//!
//! # Responsibility
//! - Build one report per report kind from the search service, with related
//!   names resolved for display.
//! - Append an aggregate summary line (row count, or total daily ration for
//!   feeding).
//!
//! # Invariants
//! - Report rows are exactly the rows returned by the search for the
//!   request's filter text, in primary-key order.
//! - The feeding total sums `daily_amount` over exactly the listed rows.

mod page;

pub use page::{export_report, paginate, Page};

use crate::model::{
    Animal, AnimalCaretaker, AnimalFeed, Employee, Enclosure, Feed, HealthRecord, Kind, Position,
    Record, RecordId, Species,
};
use crate::repo::table::Table;
use crate::repo::zoo_repo::{RepoError, SqliteZooRepository, ZooRepository};
use crate::search::{search, SearchError};
use crate::service::pedigree_service::{PedigreeService, DEFAULT_PEDIGREE_DEPTH};
use log::info;
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

const COLUMN_SEPARATOR: &str = " | ";
const MISSING_NAME: &str = "-";

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug)]
pub enum ReportError {
    Repo(RepoError),
    Search(SearchError),
    /// Pedigree reports need the name of the root animal.
    MissingAnimalName,
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Search(err) => write!(f, "{err}"),
            Self::MissingAnimalName => write!(f, "pedigree report requires an animal name"),
            Self::Io { path, source } => {
                write!(f, "failed to write report `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Search(err) => Some(err),
            Self::MissingAnimalName => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for ReportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SearchError> for ReportError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Animals,
    Employees,
    Enclosures,
    Feeds,
    Feeding,
    Health,
    Pedigree,
    Caretakers,
}

impl ReportKind {
    pub const ALL: [ReportKind; 8] = [
        ReportKind::Animals,
        ReportKind::Employees,
        ReportKind::Enclosures,
        ReportKind::Feeds,
        ReportKind::Feeding,
        ReportKind::Health,
        ReportKind::Pedigree,
        ReportKind::Caretakers,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Animals => "Animals",
            Self::Employees => "Employees",
            Self::Enclosures => "Enclosures",
            Self::Feeds => "Feeds",
            Self::Feeding => "Feeding",
            Self::Health => "Health",
            Self::Pedigree => "Pedigree",
            Self::Caretakers => "Caretakers",
        }
    }

    /// Record kind listed by this report.
    pub fn record_kind(self) -> Kind {
        match self {
            Self::Animals | Self::Pedigree => Kind::Animal,
            Self::Employees => Kind::Employee,
            Self::Enclosures => Kind::Enclosure,
            Self::Feeds => Kind::Feed,
            Self::Feeding => Kind::AnimalFeed,
            Self::Health => Kind::HealthRecord,
            Self::Caretakers => Kind::AnimalCaretaker,
        }
    }
}

impl Display for ReportKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.title().to_ascii_lowercase() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown report `{value}`; expected one of animals|employees|enclosures|feeds|feeding|health|pedigree|caretakers"
                )
            })
    }
}

/// What to report on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub kind: ReportKind,
    /// Search text; blank lists every row. Ignored by pedigree reports.
    pub filter: String,
    /// Root animal name; required by pedigree reports only.
    pub animal: Option<String>,
    pub max_depth: usize,
}

impl ReportRequest {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            filter: String::new(),
            animal: None,
            max_depth: DEFAULT_PEDIGREE_DEPTH,
        }
    }

    pub fn filtered(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn for_animal(mut self, name: impl Into<String>) -> Self {
        self.animal = Some(name.into());
        self
    }
}

/// Built report, ready for pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    /// Column header line; `None` for pedigree trees.
    pub header: Option<String>,
    pub rows: Vec<String>,
    pub summary: String,
    /// Sum of `daily_amount` over the listed rows; feeding reports only.
    pub total_daily_amount: Option<f64>,
}

/// Builds the report described by `request`.
pub fn build_report(conn: &Connection, request: &ReportRequest) -> ReportResult<Report> {
    let repo = SqliteZooRepository::try_new(conn)?;
    let names = NameIndex { repo };
    let filter = request.filter.as_str();

    let report = match request.kind {
        ReportKind::Animals => {
            let species = names.of::<Species>()?;
            let enclosures = names.of::<Enclosure>()?;
            let rows = search::<Animal>(conn, filter)?
                .into_iter()
                .map(|animal| {
                    row(&[
                        animal.name.clone(),
                        lookup(&species, Some(animal.species_id)),
                        lookup(&enclosures, animal.enclosure_id),
                        animal.date_of_birth.to_string(),
                        animal.date_of_arrival.to_string(),
                        animal.sex.to_string(),
                    ])
                })
                .collect();
            tabular(
                request.kind,
                &["Name", "Species", "Enclosure", "Born", "Arrived", "Sex"],
                rows,
            )
        }
        ReportKind::Employees => {
            let positions = names.of::<Position>()?;
            let rows = search::<Employee>(conn, filter)?
                .into_iter()
                .map(|employee| {
                    row(&[
                        employee.name.clone(),
                        lookup(&positions, employee.position_id),
                        employee.phone.clone(),
                        employee.hire_date.to_string(),
                    ])
                })
                .collect();
            tabular(request.kind, &["Name", "Position", "Phone", "Hired"], rows)
        }
        ReportKind::Enclosures => {
            let rows = search::<Enclosure>(conn, filter)?
                .into_iter()
                .map(|enclosure| {
                    row(&[
                        enclosure.name.clone(),
                        format!("{:.1}", enclosure.size),
                        enclosure.location.clone(),
                        enclosure.description.clone(),
                    ])
                })
                .collect();
            tabular(
                request.kind,
                &["Name", "Size (m2)", "Location", "Description"],
                rows,
            )
        }
        ReportKind::Feeds => {
            let rows = search::<Feed>(conn, filter)?
                .into_iter()
                .map(|feed| row(&[feed.name.clone(), feed.description.clone()]))
                .collect();
            tabular(request.kind, &["Name", "Description"], rows)
        }
        ReportKind::Feeding => {
            let animals = names.of::<Animal>()?;
            let feeds = names.of::<Feed>()?;
            let rations = search::<AnimalFeed>(conn, filter)?;
            let total: f64 = rations.iter().map(|ration| ration.daily_amount).sum();
            let rows = rations
                .iter()
                .map(|ration| {
                    row(&[
                        lookup(&animals, Some(ration.animal_id)),
                        lookup(&feeds, Some(ration.feed_id)),
                        format!("{:.2}", ration.daily_amount),
                    ])
                })
                .collect();
            let mut report = tabular(
                request.kind,
                &["Animal", "Feed", "Daily amount (kg)"],
                rows,
            );
            report.summary = format!("Total daily amount: {total:.2} kg");
            report.total_daily_amount = Some(total);
            report
        }
        ReportKind::Health => {
            let animals = names.of::<Animal>()?;
            let rows = search::<HealthRecord>(conn, filter)?
                .into_iter()
                .map(|record| {
                    row(&[
                        lookup(&animals, Some(record.animal_id)),
                        record.checkup_date.to_string(),
                        record.notes.clone(),
                    ])
                })
                .collect();
            tabular(request.kind, &["Animal", "Checkup date", "Notes"], rows)
        }
        ReportKind::Caretakers => {
            let employees = names.of::<Employee>()?;
            let animals = names.of::<Animal>()?;
            let rows = search::<AnimalCaretaker>(conn, filter)?
                .into_iter()
                .map(|assignment| {
                    row(&[
                        lookup(&employees, Some(assignment.employee_id)),
                        lookup(&animals, Some(assignment.animal_id)),
                    ])
                })
                .collect();
            tabular(request.kind, &["Employee", "Animal"], rows)
        }
        ReportKind::Pedigree => {
            let name = request
                .animal
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or(ReportError::MissingAnimalName)?;
            let pedigree = PedigreeService::new(repo).pedigree(name, request.max_depth)?;
            Report {
                kind: request.kind,
                title: format!("{}: {name}", request.kind.title()),
                header: None,
                rows: pedigree.render(),
                summary: format!("Ancestors: {}", pedigree.ancestor_count()),
                total_daily_amount: None,
            }
        }
    };

    info!(
        "event=report_build module=report status=ok kind={} rows={}",
        report.kind,
        report.rows.len()
    );
    Ok(report)
}

fn tabular(kind: ReportKind, columns: &[&str], rows: Vec<String>) -> Report {
    let summary = format!("Total: {}", rows.len());
    Report {
        kind,
        title: kind.title().to_string(),
        header: Some(columns.join(COLUMN_SEPARATOR)),
        rows,
        summary,
        total_daily_amount: None,
    }
}

fn row(cells: &[String]) -> String {
    cells.join(COLUMN_SEPARATOR)
}

fn lookup(names: &HashMap<RecordId, String>, id: Option<RecordId>) -> String {
    id.and_then(|id| names.get(&id).cloned())
        .unwrap_or_else(|| MISSING_NAME.to_string())
}

/// Id-to-name maps for resolving related records in report rows.
struct NameIndex<'conn> {
    repo: SqliteZooRepository<'conn>,
}

trait Named {
    fn display_name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty),+) => {
        $(impl Named for $ty {
            fn display_name(&self) -> &str {
                &self.name
            }
        })+
    };
}

impl_named!(Species, Enclosure, Position, Animal, Employee, Feed);

impl NameIndex<'_> {
    fn of<E: Table + Named>(&self) -> ReportResult<HashMap<RecordId, String>> {
        Ok(self
            .repo
            .list::<E>()?
            .into_iter()
            .map(|record| (record.id(), record.display_name().to_string()))
            .collect())
    }
}
