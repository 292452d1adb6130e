use chrono::NaiveDate;
use rusqlite::Connection;
use zoo_core::db::open_db_in_memory;
use zoo_core::{
    Animal, AnimalCaretaker, AnimalFeed, Employee, Enclosure, Feed, HealthRecord,
    IntegrityViolation, Kind, Offspring, Position, RepoError, Sex, SqliteZooRepository, Species,
    ValidationError, ZooRepository, ZooService,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn seed_animal(repo: &SqliteZooRepository<'_>, name: &str, sex: Sex) -> Animal {
    let species_id = match repo.list::<Species>().unwrap().first() {
        Some(species) => species.id,
        None => repo.create(&Species::new("Lion")).unwrap(),
    };
    let id = repo
        .create(&Animal::new(name, species_id, sex, date(2018, 5, 1)))
        .unwrap();
    repo.get(id).unwrap()
}

#[test]
fn create_then_get_returns_same_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();

    let species_id = repo.create(&Species::new("Zebra")).unwrap();
    let enclosure_id = repo
        .create(&Enclosure::new("Savanna", 1200.5, "North").with_description("open plain"))
        .unwrap();
    let draft = Animal::new("Marty", species_id, Sex::Male, date(2020, 3, 14))
        .in_enclosure(enclosure_id)
        .arrived_on(date(2021, 1, 2));

    let id = repo.create(&draft).unwrap();
    let loaded: Animal = repo.get(id).unwrap();

    assert_eq!(loaded, Animal { id, ..draft });
    let enclosure: Enclosure = repo.get(enclosure_id).unwrap();
    assert_eq!(enclosure.description, "open plain");
}

#[test]
fn update_replaces_fields_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();

    let position_id = repo.create(&Position::new("Keeper")).unwrap();
    let id = repo
        .create(&Employee::new("Anna", date(2015, 4, 1)))
        .unwrap();
    let mut employee: Employee = repo.get(id).unwrap();
    employee.position_id = Some(position_id);
    employee.phone = "+7 (900) 123-45".to_string();

    repo.update(&employee).unwrap();
    repo.update(&employee).unwrap();

    assert_eq!(repo.get::<Employee>(id).unwrap(), employee);
    assert_eq!(repo.list::<Employee>().unwrap().len(), 1);
}

#[test]
fn delete_then_get_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();

    let id = repo.create(&Feed::new("Hay", "dry grass")).unwrap();
    repo.delete(Kind::Feed, id).unwrap();

    let err = repo.get::<Feed>(id).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        repo.delete(Kind::Feed, id),
        Err(RepoError::NotFound { kind: Kind::Feed, .. })
    ));
}

#[test]
fn update_of_missing_row_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();

    let mut species = Species::new("Ghost");
    species.id = 42;
    assert!(matches!(
        repo.update(&species),
        Err(RepoError::NotFound { kind: Kind::Species, id: 42 })
    ));
}

#[test]
fn dangling_reference_is_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();

    let err = repo
        .create(&Animal::new("Nala", 999, Sex::Female, date(2019, 1, 1)))
        .unwrap_err();

    match err {
        RepoError::ReferentialIntegrity(IntegrityViolation::DanglingReference {
            kind,
            column,
            target,
            target_id,
        }) => {
            assert_eq!(kind, Kind::Animal);
            assert_eq!(column, "species_id");
            assert_eq!(target, Kind::Species);
            assert_eq!(target_id, 999);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(repo.list::<Animal>().unwrap().is_empty());
}

#[test]
fn offspring_parent_sex_is_enforced() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let lion = seed_animal(&repo, "Lion", Sex::Male);
    let lioness = seed_animal(&repo, "Lioness", Sex::Female);

    let swapped = Offspring::new("Cub", Sex::Male, date(2023, 6, 1))
        .with_parents(Some(lion.id), Some(lioness.id));
    let err = repo.create(&swapped).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::ParentSexMismatch {
            column: "mother_id",
            expected: Sex::Female,
            actual: Sex::Male,
            ..
        })
    ));

    let correct = Offspring::new("Cub", Sex::Male, date(2023, 6, 1))
        .with_parents(Some(lioness.id), Some(lion.id));
    let id = repo.create(&correct).unwrap();
    assert_eq!(repo.get::<Offspring>(id).unwrap().mother_id, Some(lioness.id));
}

#[test]
fn parent_sex_cannot_change_while_offspring_reference_it() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let lion = seed_animal(&repo, "Lion", Sex::Male);
    let lioness = seed_animal(&repo, "Lioness", Sex::Female);
    repo.create(
        &Offspring::new("Cub", Sex::Male, date(2023, 6, 1))
            .with_parents(Some(lioness.id), Some(lion.id)),
    )
    .unwrap();

    let flipped_mother = Animal {
        sex: Sex::Male,
        ..lioness.clone()
    };
    assert!(matches!(
        repo.update(&flipped_mother),
        Err(RepoError::Validation(ValidationError::ParentSexMismatch {
            column: "mother_id",
            expected: Sex::Female,
            actual: Sex::Male,
            ..
        }))
    ));
    assert_eq!(repo.get::<Animal>(lioness.id).unwrap().sex, Sex::Female);

    let flipped_father = Animal {
        sex: Sex::Female,
        ..lion.clone()
    };
    assert!(matches!(
        repo.update(&flipped_father),
        Err(RepoError::Validation(ValidationError::ParentSexMismatch {
            column: "father_id",
            expected: Sex::Male,
            actual: Sex::Female,
            ..
        }))
    ));
    assert_eq!(repo.get::<Animal>(lion.id).unwrap().sex, Sex::Male);

    let renamed = Animal {
        name: "Sarabi".to_string(),
        ..lioness.clone()
    };
    repo.update(&renamed).unwrap();

    let unrelated = seed_animal(&repo, "Zazu", Sex::Male);
    repo.update(&Animal {
        sex: Sex::Female,
        ..unrelated
    })
    .unwrap();
}

#[test]
fn invalid_records_never_reach_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.create(&Species::new("   ")),
        Err(RepoError::Validation(ValidationError::BlankField { .. }))
    ));
    assert!(matches!(
        repo.create(&Enclosure::new("Pond", 0.0, "East")),
        Err(RepoError::Validation(ValidationError::NotPositive { .. }))
    ));
    assert!(matches!(
        repo.create(&Employee::new("Boris", date(2016, 1, 1)).with_phone("call me")),
        Err(RepoError::Validation(ValidationError::InvalidPhone(_)))
    ));

    let species_id = repo.create(&Species::new("Tiger")).unwrap();
    let early_arrival =
        Animal::new("Shere", species_id, Sex::Male, date(2020, 1, 1)).arrived_on(date(2019, 1, 1));
    assert!(matches!(
        repo.create(&early_arrival),
        Err(RepoError::Validation(ValidationError::DateOrder { .. }))
    ));

    let animal = seed_animal(&repo, "Rajah", Sex::Male);
    let feed_id = repo.create(&Feed::new("Meat", "")).unwrap();
    assert!(matches!(
        repo.create(&AnimalFeed::new(animal.id, feed_id, -1.0)),
        Err(RepoError::Validation(ValidationError::Negative { .. }))
    ));

    assert!(repo.list::<Enclosure>().unwrap().is_empty());
    assert!(repo.list::<Employee>().unwrap().is_empty());
    assert!(repo.list::<AnimalFeed>().unwrap().is_empty());
}

#[test]
fn delete_is_rejected_for_every_dependent_kind() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let service = ZooService::new(repo);

    let mother = seed_animal(&repo, "Lioness", Sex::Female);
    let patient = seed_animal(&repo, "Simba", Sex::Male);
    let fed = seed_animal(&repo, "Kiara", Sex::Female);
    let cared = seed_animal(&repo, "Kovu", Sex::Male);

    service
        .record_checkup(patient.id, date(2024, 2, 2), "healthy")
        .unwrap();
    let feed_id = repo.create(&Feed::new("Meat", "")).unwrap();
    repo.create(&AnimalFeed::new(fed.id, feed_id, 4.0)).unwrap();
    let employee_id = repo
        .create(&Employee::new("Vera", date(2017, 4, 1)))
        .unwrap();
    service.assign_caretaker(employee_id, cared.id).unwrap();
    repo.create(
        &Offspring::new("Cub", Sex::Male, date(2023, 6, 1)).with_parents(Some(mother.id), None),
    )
    .unwrap();

    let cases = [
        (patient.id, Kind::HealthRecord),
        (fed.id, Kind::AnimalFeed),
        (cared.id, Kind::AnimalCaretaker),
        (mother.id, Kind::Offspring),
    ];
    for (animal_id, dependent_kind) in cases {
        match repo.delete(Kind::Animal, animal_id) {
            Err(RepoError::ReferentialIntegrity(IntegrityViolation::HasDependents {
                dependent,
                count,
                ..
            })) => {
                assert_eq!(dependent, dependent_kind);
                assert_eq!(count, 1);
            }
            other => panic!("expected rejection for {dependent_kind}, got {other:?}"),
        }
        assert!(repo.find::<Animal>(animal_id).unwrap().is_some());
    }

    assert!(matches!(
        repo.delete(Kind::Feed, feed_id),
        Err(RepoError::ReferentialIntegrity(IntegrityViolation::HasDependents { .. }))
    ));
    assert!(matches!(
        repo.delete(Kind::Employee, employee_id),
        Err(RepoError::ReferentialIntegrity(IntegrityViolation::HasDependents { .. }))
    ));

    let checkup = repo.list::<HealthRecord>().unwrap().remove(0);
    repo.delete(Kind::HealthRecord, checkup.id).unwrap();
    repo.delete(Kind::Animal, patient.id).unwrap();
    assert!(repo.find::<Animal>(patient.id).unwrap().is_none());
}

#[test]
fn service_edit_rejects_id_changes_and_persists_edits() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let service = ZooService::new(repo);

    let id = service.create(&Feed::new("Fish", "")).unwrap();
    let edited: Feed = service
        .edit(id, |feed: &mut Feed| feed.description = "fresh herring".to_string())
        .unwrap();
    assert_eq!(service.get::<Feed>(id).unwrap(), edited);

    assert!(service
        .edit(id, |feed: &mut Feed| feed.id += 1)
        .is_err());
    assert_eq!(service.get::<Feed>(id).unwrap().description, "fresh herring");
}

#[test]
fn service_relocates_and_looks_up_by_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let service = ZooService::new(repo);

    let animal = seed_animal(&repo, "Timon", Sex::Male);
    let enclosure_id = service
        .create(&Enclosure::new("Burrow", 12.0, "South"))
        .unwrap();

    let moved = service.relocate_animal(animal.id, Some(enclosure_id)).unwrap();
    assert_eq!(moved.enclosure_id, Some(enclosure_id));
    assert_eq!(service.animal_by_name("timon").unwrap().id, animal.id);
    assert!(matches!(
        service.animal_by_name("Pumbaa"),
        Err(RepoError::NameNotFound { kind: Kind::Animal, .. })
    ));

    let caretakers = service.list::<AnimalCaretaker>().unwrap();
    assert!(caretakers.is_empty());
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteZooRepository::try_new(&conn)
        .err()
        .expect("raw connection must be rejected");
    assert!(matches!(
        err,
        RepoError::UninitializedConnection { actual_version: 0, .. }
    ));
}

#[test]
fn records_serialize_with_readable_sex_and_dates() {
    let animal = Animal::new("Nala", 1, Sex::Female, date(2019, 7, 19));
    let value = serde_json::to_value(&animal).unwrap();

    assert_eq!(value["sex"], "Female");
    assert_eq!(value["date_of_birth"], "2019-07-19");
}
