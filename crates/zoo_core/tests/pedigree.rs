use chrono::NaiveDate;
use zoo_core::db::open_db_in_memory;
use zoo_core::{
    Animal, Kind, Offspring, PedigreeEntry, PedigreeService, RepoError, Sex,
    SqliteZooRepository, Species, ZooRepository, DEFAULT_PEDIGREE_DEPTH,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn animal(repo: &SqliteZooRepository<'_>, species_id: i64, name: &str, sex: Sex) -> i64 {
    repo.create(&Animal::new(name, species_id, sex, date(2015, 1, 1)))
        .unwrap()
}

fn lineage(
    repo: &SqliteZooRepository<'_>,
    child: i64,
    mother: Option<i64>,
    father: Option<i64>,
) {
    let animal: Animal = repo.get(child).unwrap();
    repo.create(
        &Offspring::new(animal.name, animal.sex, animal.date_of_birth)
            .with_parents(mother, father)
            .for_animal(child),
    )
    .unwrap();
}

#[test]
fn cub_with_two_parents_lists_mother_then_father() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let lions = repo.create(&Species::new("Lion")).unwrap();
    let cub = animal(&repo, lions, "Cub", Sex::Male);
    let lioness = animal(&repo, lions, "Lioness", Sex::Female);
    let lion = animal(&repo, lions, "Lion", Sex::Male);
    lineage(&repo, cub, Some(lioness), Some(lion));

    let pedigree = PedigreeService::new(repo)
        .pedigree("Cub", DEFAULT_PEDIGREE_DEPTH)
        .unwrap();

    assert_eq!(pedigree.root_id, cub);
    assert_eq!(
        pedigree.render(),
        vec![
            "Cub".to_string(),
            "  Mother: Lioness".to_string(),
            "  Father: Lion".to_string(),
        ]
    );
    assert_eq!(pedigree.ancestor_count(), 2);
    assert!(!pedigree.is_truncated());
}

#[test]
fn zero_depth_yields_root_and_truncation_markers() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let lions = repo.create(&Species::new("Lion")).unwrap();
    let cub = animal(&repo, lions, "Cub", Sex::Male);
    let lioness = animal(&repo, lions, "Lioness", Sex::Female);
    let lion = animal(&repo, lions, "Lion", Sex::Male);
    lineage(&repo, cub, Some(lioness), Some(lion));

    let pedigree = PedigreeService::new(repo).pedigree("Cub", 0).unwrap();

    assert_eq!(
        pedigree.render(),
        vec![
            "Cub".to_string(),
            "  Mother: ...".to_string(),
            "  Father: ...".to_string(),
        ]
    );
    assert!(pedigree.is_truncated());
    assert_eq!(pedigree.ancestor_count(), 0);
    assert_eq!(pedigree.lines[1].entry, PedigreeEntry::Truncated);
}

#[test]
fn depth_limit_cuts_deep_ancestry() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let lions = repo.create(&Species::new("Lion")).unwrap();

    // Maternal line: each generation is the mother of the previous one.
    let mut child = animal(&repo, lions, "Gen0", Sex::Female);
    let root = child;
    for generation in 1..=4 {
        let mother = animal(&repo, lions, &format!("Gen{generation}"), Sex::Female);
        lineage(&repo, child, Some(mother), None);
        child = mother;
    }

    let service = PedigreeService::new(repo);
    let full = service.pedigree("gen0", DEFAULT_PEDIGREE_DEPTH).unwrap();
    assert_eq!(full.root_id, root);
    assert_eq!(full.ancestor_count(), 4);
    assert!(!full.is_truncated());
    assert_eq!(full.render()[4], "        Mother: Gen4");

    let cut = service.pedigree("Gen0", 2).unwrap();
    assert_eq!(
        cut.render(),
        vec![
            "Gen0".to_string(),
            "  Mother: Gen1".to_string(),
            "    Mother: Gen2".to_string(),
            "      Mother: ...".to_string(),
        ]
    );
}

#[test]
fn unknown_animal_is_name_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();

    let err = PedigreeService::new(repo).pedigree("Nobody", 3).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NameNotFound { kind: Kind::Animal, ref name } if name == "Nobody"
    ));
}

#[test]
fn animal_without_lineage_is_single_line() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let lions = repo.create(&Species::new("Lion")).unwrap();
    animal(&repo, lions, "Orphan", Sex::Female);

    let pedigree = PedigreeService::new(repo).pedigree("Orphan", 5).unwrap();
    assert_eq!(pedigree.render(), vec!["Orphan".to_string()]);
}

#[test]
fn lineage_linked_by_id_wins_over_name_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let lions = repo.create(&Species::new("Lion")).unwrap();
    let cub = animal(&repo, lions, "Cub", Sex::Male);
    let lioness = animal(&repo, lions, "Lioness", Sex::Female);
    let stranger = animal(&repo, lions, "Stranger", Sex::Female);

    // Unlinked row sharing the display name, created first.
    repo.create(
        &Offspring::new("Cub", Sex::Male, date(2015, 1, 1)).with_parents(Some(stranger), None),
    )
    .unwrap();
    lineage(&repo, cub, Some(lioness), None);

    let pedigree = PedigreeService::new(repo).pedigree("Cub", 5).unwrap();
    assert_eq!(
        pedigree.render(),
        vec!["Cub".to_string(), "  Mother: Lioness".to_string()]
    );
}

#[test]
fn unlinked_lineage_falls_back_to_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteZooRepository::try_new(&conn).unwrap();
    let lions = repo.create(&Species::new("Lion")).unwrap();
    animal(&repo, lions, "Cub", Sex::Male);
    let lion = animal(&repo, lions, "Lion", Sex::Male);
    repo.create(&Offspring::new("Cub", Sex::Male, date(2015, 1, 1)).with_parents(None, Some(lion)))
        .unwrap();

    let pedigree = PedigreeService::new(repo).pedigree("Cub", 5).unwrap();
    assert_eq!(
        pedigree.render(),
        vec!["Cub".to_string(), "  Father: Lion".to_string()]
    );
}
