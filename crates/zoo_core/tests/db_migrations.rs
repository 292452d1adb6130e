use zoo_core::db::migrations::{apply_migrations, apply_migrations_up_to, latest_version};
use zoo_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

const TABLES: [&str; 10] = [
    "species",
    "enclosure",
    "position",
    "animal",
    "employee",
    "health_record",
    "feed",
    "animal_feed",
    "offspring",
    "animal_caretaker",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in TABLES {
        assert_table_exists(&conn, table);
    }
    assert!(table_has_column(&conn, "employee", "position_id"));
    assert!(!table_has_column(&conn, "employee", "position"));
    assert!(table_has_column(&conn, "offspring", "animal_id"));
}

#[test]
fn foreign_keys_are_enforced_on_opened_connections() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zoo.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    conn_first
        .execute("INSERT INTO species (name) VALUES ('Lion');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM species;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn upgrading_free_text_positions_creates_position_rows() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    apply_migrations_up_to(&mut conn, 1).unwrap();
    assert_eq!(schema_version(&conn), 1);

    conn.execute_batch(
        "INSERT INTO species (name) VALUES ('Lion');
         INSERT INTO animal (name, species_id, date_of_birth, date_of_arrival, sex)
             VALUES ('Simba', 1, '2019-01-01', '2019-02-01', 'Male');
         INSERT INTO employee (name, position, phone, hire_date) VALUES
             ('Anna', 'Keeper', '555-0101', '2015-04-01'),
             ('Boris', ' Keeper ', '', '2016-04-01'),
             ('Vera', 'Veterinarian', '', '2017-04-01'),
             ('Gleb', '', '', '2018-04-01');
         INSERT INTO animal_caretaker (employee_id, animal_id) VALUES (2, 1);",
    )
    .unwrap();

    apply_migrations(&mut conn).unwrap();
    assert_eq!(schema_version(&conn), latest_version());

    let positions: Vec<String> = {
        let mut stmt = conn
            .prepare("SELECT name FROM position ORDER BY id;")
            .unwrap();
        let rows = stmt.query_map([], |row| row.get(0)).unwrap();
        rows.map(Result::unwrap).collect()
    };
    assert_eq!(positions, vec!["Keeper".to_string(), "Veterinarian".to_string()]);

    let assigned: Vec<(String, Option<String>)> = {
        let mut stmt = conn
            .prepare(
                "SELECT e.name, p.name
                 FROM employee e LEFT JOIN position p ON p.id = e.position_id
                 ORDER BY e.id;",
            )
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap();
        rows.map(Result::unwrap).collect()
    };
    assert_eq!(assigned[0], ("Anna".to_string(), Some("Keeper".to_string())));
    assert_eq!(assigned[1], ("Boris".to_string(), Some("Keeper".to_string())));
    assert_eq!(assigned[3], ("Gleb".to_string(), None));

    let caretaker_employee: i64 = conn
        .query_row("SELECT employee_id FROM animal_caretaker;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(caretaker_employee, 2);
}

#[test]
fn failing_migration_is_named_and_rolled_back() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations_up_to(&mut conn, 1).unwrap();
    conn.execute_batch("CREATE TABLE position (id INTEGER PRIMARY KEY);")
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    match err {
        DbError::Migration { version, name, .. } => {
            assert_eq!(version, 2);
            assert_eq!(name, "positions");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(schema_version(&conn), 1);
    assert!(table_has_column(&conn, "employee", "position"));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> bool {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});")).unwrap();
    let names: Vec<String> = stmt
        .query_map([], |row| row.get(1))
        .unwrap()
        .map(Result::unwrap)
        .collect();
    names.iter().any(|name| name == column)
}
