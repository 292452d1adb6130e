//! Command implementations.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use zoo_core::db::migrations::{current_user_version, latest_version};
use zoo_core::db::{open_db, DbError};
use zoo_core::{
    build_report, export_report, search_kind, Kind, PedigreeService, RepoError, ReportError,
    ReportKind, ReportRequest, SearchError, SqliteZooRepository, ZooConfig,
};

/// Failure of one CLI command.
#[derive(Debug)]
pub enum CliError {
    Config(String),
    Usage(String),
    Db(DbError),
    Repo(RepoError),
    Search(SearchError),
    Report(ReportError),
    Output(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(message) => write!(f, "configuration: {message}"),
            Self::Usage(message) => f.write_str(message),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Search(err) => write!(f, "{err}"),
            Self::Report(err) => write!(f, "{err}"),
            Self::Output(message) => write!(f, "output: {message}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Search(err) => Some(err),
            Self::Report(err) => Some(err),
            Self::Config(_) | Self::Usage(_) | Self::Output(_) => None,
        }
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SearchError> for CliError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

impl From<ReportError> for CliError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

/// Prints the database location, schema version and per-kind row counts.
pub fn cmd_status(config: &ZooConfig) -> Result<(), CliError> {
    let conn = open_db(&config.db_path)?;
    println!("database: {}", config.db_path.display());
    println!(
        "schema: {}/{}",
        current_user_version(&conn)?,
        latest_version()
    );
    for kind in Kind::ALL {
        let listing = search_kind(&conn, kind, "")?;
        println!("{:<18} {}", kind.table_name(), listing.len());
    }
    match zoo_core::logging_status() {
        Some(target) => println!("logging: {} -> {}", target.level, target.dir.display()),
        None => println!("logging: off"),
    }
    Ok(())
}

/// Prints matching records, one JSON object per line.
pub fn cmd_search(config: &ZooConfig, kind: &str, text: &str) -> Result<(), CliError> {
    let kind: Kind = kind.parse().map_err(CliError::Usage)?;
    let conn = open_db(&config.db_path)?;
    let listing = search_kind(&conn, kind, text)?;

    let value = serde_json::to_value(&listing).map_err(|err| CliError::Output(err.to_string()))?;
    if let Some(records) = value.get("records").and_then(|records| records.as_array()) {
        for record in records {
            println!("{record}");
        }
    }
    eprintln!("{} {kind} record(s)", listing.len());
    Ok(())
}

/// Builds a report and writes it to `output`.
pub fn cmd_report(
    config: &ZooConfig,
    kind: &str,
    output: &Path,
    filter: &str,
    animal: Option<String>,
    max_depth: Option<usize>,
) -> Result<(), CliError> {
    let kind: ReportKind = kind.parse().map_err(CliError::Usage)?;
    let conn = open_db(&config.db_path)?;

    let mut request = ReportRequest::new(kind).filtered(filter);
    if let Some(animal) = animal {
        request = request.for_animal(animal);
    }
    request.max_depth = max_depth.unwrap_or(config.pedigree_max_depth);

    let report = build_report(&conn, &request)?;
    let pages = export_report(&report, output, config.report_lines_per_page)?;
    println!(
        "{}: {} row(s), {pages} page(s) -> {}",
        report.title,
        report.rows.len(),
        output.display()
    );
    Ok(())
}

/// Prints the ancestry tree of the animal named `name`.
pub fn cmd_pedigree(
    config: &ZooConfig,
    name: &str,
    max_depth: Option<usize>,
) -> Result<(), CliError> {
    let conn = open_db(&config.db_path)?;
    let repo = SqliteZooRepository::try_new(&conn)?;
    let max_depth = max_depth.unwrap_or(config.pedigree_max_depth);

    let pedigree = PedigreeService::new(repo).pedigree(name, max_depth)?;
    for line in pedigree.render() {
        println!("{line}");
    }
    info!(
        "event=pedigree_print module=cli status=ok ancestors={} truncated={}",
        pedigree.ancestor_count(),
        pedigree.is_truncated()
    );
    Ok(())
}
