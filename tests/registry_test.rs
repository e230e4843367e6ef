//! Fleet registry integration tests: schema, lifecycle and concurrency
//! against an on-disk SQLite store.
//!
//! Run with: `cargo test`

use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use fleet::config::DatabaseConfig;
use fleet::error::{ErrorKind, FleetError};
use fleet::registry::{CarState, FleetRegistry, NewCar};

fn tmp_dir() -> TempDir {
    tempfile::tempdir().expect("create tempdir")
}

fn db_config(dir: &TempDir) -> DatabaseConfig {
    DatabaseConfig { path: dir.path().join("fleet.db"), busy_timeout_ms: 5000 }
}

fn new_car(model: &str, registration: &str, mileage: u32) -> NewCar {
    NewCar { model: model.to_string(), registration: registration.to_string(), mileage }
}

#[test]
fn test_added_car_is_listed_with_same_fields() {
    let dir = tmp_dir();
    let reg = FleetRegistry::open(&db_config(&dir)).expect("open");

    let added = reg.add_car(&new_car("Sedan", "ABC-123", 1000)).expect("add");
    let listed = reg.list_available().expect("list");

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], added);
    assert_eq!(listed[0].model, "Sedan");
    assert_eq!(listed[0].registration, "ABC-123");
    assert_eq!(listed[0].mileage, 1000);
    assert!(listed[0].available);
}

#[test]
fn test_rent_and_return_lifecycle() {
    let dir = tmp_dir();
    let reg = FleetRegistry::open(&db_config(&dir)).expect("open");
    reg.add_car(&new_car("Hatchback", "XYZ-1", 20)).expect("add");
    reg.add_car(&new_car("Van", "VAN-9", 500)).expect("add");

    let rented = reg.rent_car("XYZ-1").expect("rent");
    assert_eq!(rented.state(), CarState::Rented);
    let regs: Vec<_> =
        reg.list_available().expect("list").into_iter().map(|c| c.registration).collect();
    assert_eq!(regs, vec!["VAN-9".to_string()]);

    let returned = reg.return_car("XYZ-1").expect("return");
    assert_eq!(returned.state(), CarState::Available);
    let listed = reg.list_available().expect("list");
    let car = listed.iter().find(|c| c.registration == "XYZ-1").expect("XYZ-1 listed again");
    assert!(car.available);
    assert_eq!(car.id, rented.id);
}

#[test]
fn test_rent_on_rented_car_is_a_consistent_conflict() {
    let dir = tmp_dir();
    let reg = FleetRegistry::open(&db_config(&dir)).expect("open");
    reg.add_car(&new_car("Sedan", "R-1", 0)).expect("add");
    reg.rent_car("R-1").expect("rent");

    for _ in 0..3 {
        let err = reg.rent_car("R-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(
            err,
            FleetError::InvalidTransition { state: CarState::Rented, .. }
        ));
    }
}

#[test]
fn test_return_on_available_car_is_a_conflict() {
    let dir = tmp_dir();
    let reg = FleetRegistry::open(&db_config(&dir)).expect("open");
    reg.add_car(&new_car("Sedan", "R-2", 0)).expect("add");

    let err = reg.return_car("R-2").unwrap_err();
    assert!(matches!(
        err,
        FleetError::InvalidTransition { state: CarState::Available, .. }
    ));
}

#[test]
fn test_unknown_registration_is_not_found() {
    let dir = tmp_dir();
    let reg = FleetRegistry::open(&db_config(&dir)).expect("open");

    assert_eq!(reg.rent_car("GHOST").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(reg.return_car("GHOST").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(reg.count().expect("count"), 0);
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let dir = tmp_dir();
    let reg = FleetRegistry::open(&db_config(&dir)).expect("open");
    reg.add_car(&new_car("Sedan", "DUP-1", 10)).expect("add");

    let err = reg.add_car(&new_car("Coupe", "DUP-1", 99)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(reg.count().expect("count"), 1);

    // A rented car still holds its registration.
    reg.rent_car("DUP-1").expect("rent");
    assert!(reg.add_car(&new_car("Sedan", "DUP-1", 10)).is_err());
    assert_eq!(reg.count().expect("count"), 1);
}

#[test]
fn test_concurrent_adds_of_same_registration() {
    let dir = tmp_dir();
    let reg = Arc::new(FleetRegistry::open(&db_config(&dir)).expect("open"));
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|i| {
            let reg = Arc::clone(&reg);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                reg.add_car(&new_car(&format!("Model {i}"), "RACE-1", 0))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().expect("join")).collect();
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(FleetError::DuplicateRegistration { .. })))
        .count();

    assert_eq!(ok, 1);
    assert_eq!(conflicts, workers - 1);
    assert_eq!(reg.count().expect("count"), 1);
}

#[test]
fn test_two_handles_on_one_store_keep_registration_unique() {
    // Independent connections: nothing in process serializes them.
    let dir = tmp_dir();
    let cfg = db_config(&dir);
    let first = FleetRegistry::open(&cfg).expect("open first");
    let second = FleetRegistry::open(&cfg).expect("open second");
    let barrier = Arc::new(Barrier::new(2));

    let results: Vec<_> = [first, second]
        .into_iter()
        .map(|reg| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                reg.add_car(&new_car("Sedan", "SHARED-1", 0))
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().expect("join"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(e) if e.kind() == ErrorKind::Conflict)));

    let reg = FleetRegistry::open(&cfg).expect("reopen");
    assert_eq!(reg.count().expect("count"), 1);
}

#[test]
fn test_concurrent_rents_have_one_winner() {
    let dir = tmp_dir();
    let reg = Arc::new(FleetRegistry::open(&db_config(&dir)).expect("open"));
    reg.add_car(&new_car("Sedan", "HOT-1", 0)).expect("add");
    let workers = 6;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let reg = Arc::clone(&reg);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                reg.rent_car("HOT-1")
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().expect("join")).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(reg.list_available().expect("list").is_empty());
}

#[test]
fn test_restart_keeps_records_and_schema_bootstrap_is_idempotent() {
    let dir = tmp_dir();
    let cfg = db_config(&dir);

    {
        let reg = FleetRegistry::open(&cfg).expect("open");
        reg.add_car(&new_car("Sedan", "KEEP-1", 1)).expect("add");
        reg.add_car(&new_car("Sedan", "KEEP-2", 2)).expect("add");
        reg.rent_car("KEEP-2").expect("rent");
    }

    let reg = FleetRegistry::open(&cfg).expect("reopen");
    assert_eq!(reg.count().expect("count"), 2);
    let listed = reg.list_available().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].registration, "KEEP-1");
    assert!(reg.add_car(&new_car("Sedan", "KEEP-2", 2)).is_err());
}

#[test]
fn test_open_creates_missing_parent_directory() {
    let dir = tmp_dir();
    let cfg = DatabaseConfig {
        path: dir.path().join("nested").join("fleet.db"),
        busy_timeout_ms: 1000,
    };
    let reg = FleetRegistry::open(&cfg).expect("open");
    assert!(cfg.path.exists());
    assert_eq!(reg.path(), cfg.path.as_path());
}

#[test]
fn test_open_rejects_busy_timeout_sqlite_cannot_take() {
    let dir = tmp_dir();
    let cfg = DatabaseConfig {
        path: dir.path().join("fleet.db"),
        busy_timeout_ms: 3_000_000_000,
    };
    let err = FleetRegistry::open(&cfg).err().expect("open must fail");
    assert!(matches!(err, FleetError::Config(_)));
    assert!(!cfg.path.exists(), "nothing is created for a rejected config");
}
