use rusqlite::Connection;
use std::sync::Arc;
use student_core::{
    RepoError, SessionFactory, SqliteStudentRepository, StoreError, StudentInput,
    StudentRepository, StudentService,
};

fn service() -> StudentService {
    StudentService::new(Arc::new(SessionFactory::open_in_memory().unwrap()))
}

fn ann() -> StudentInput {
    StudentInput::new("Ann", 20, "1 Rd", "a@x.com")
}

fn row_count(service: &StudentService) -> usize {
    service.list_all().unwrap().len()
}

#[test]
fn create_and_get_roundtrip() {
    let service = service();

    let created = service.create(&ann()).unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.to_input(), ann());

    let loaded = service.get_by_id(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn created_ids_are_never_reused() {
    let service = service();

    let first = service.create(&ann()).unwrap();
    service.delete(first.id).unwrap();
    let second = service
        .create(&StudentInput::new("Bob", 21, "2 Rd", "b@x.com"))
        .unwrap();

    assert!(second.id > first.id);
}

#[test]
fn duplicate_email_on_create_is_conflict() {
    let service = service();

    service.create(&ann()).unwrap();
    let err = service
        .create(&StudentInput::new("Other", 30, "9 Ave", "a@x.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict));

    let matching = service
        .list_all()
        .unwrap()
        .into_iter()
        .filter(|student| student.email == "a@x.com")
        .count();
    assert_eq!(matching, 1);
}

#[test]
fn get_missing_id_is_not_found() {
    let service = service();
    let err = service.get_by_id(999_999).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(999_999)));
}

#[test]
fn list_is_empty_then_in_insertion_order() {
    let service = service();
    assert!(service.list_all().unwrap().is_empty());

    let a = service.create(&ann()).unwrap();
    let b = service
        .create(&StudentInput::new("Bob", 21, "2 Rd", "b@x.com"))
        .unwrap();

    let ids: Vec<_> = service.list_all().unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[test]
fn update_replaces_all_business_fields() {
    let service = service();
    let created = service.create(&ann()).unwrap();

    let replacement = StudentInput::new("Ann B", 21, "2 Rd", "ann.b@x.com");
    let updated = service.update(created.id, &replacement).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.to_input(), replacement);

    let loaded = service.get_by_id(created.id).unwrap();
    assert_eq!(loaded, updated);
}

#[test]
fn update_missing_id_is_not_found_and_leaves_table_unchanged() {
    let service = service();
    let existing = service.create(&ann()).unwrap();

    let err = service
        .update(42, &StudentInput::new("Ghost", 1, "Nowhere", "ghost@x.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));

    assert_eq!(service.list_all().unwrap(), vec![existing]);
}

#[test]
fn update_to_another_students_email_is_conflict() {
    let service = service();
    let a = service.create(&ann()).unwrap();
    let b = service
        .create(&StudentInput::new("Bob", 21, "2 Rd", "b@x.com"))
        .unwrap();

    let err = service
        .update(b.id, &StudentInput::new("Bob", 22, "3 Rd", "a@x.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict));

    assert_eq!(service.get_by_id(a.id).unwrap(), a);
    assert_eq!(service.get_by_id(b.id).unwrap(), b);
}

#[test]
fn update_keeping_own_email_is_allowed() {
    let service = service();
    let created = service.create(&ann()).unwrap();

    let updated = service
        .update(created.id, &StudentInput::new("Ann", 21, "1 Rd", "a@x.com"))
        .unwrap();
    assert_eq!(updated.age, 21);
}

#[test]
fn delete_removes_exactly_one_row() {
    let service = service();
    let a = service.create(&ann()).unwrap();
    let b = service
        .create(&StudentInput::new("Bob", 21, "2 Rd", "b@x.com"))
        .unwrap();

    let confirmation = service.delete(a.id).unwrap();
    assert_eq!(confirmation.id, a.id);
    assert_eq!(confirmation.message(), format!("Student with ID {} deleted", a.id));

    assert_eq!(service.list_all().unwrap(), vec![b]);
    assert!(matches!(
        service.delete(a.id).unwrap_err(),
        RepoError::NotFound(id) if id == a.id
    ));
}

#[test]
fn invalid_input_is_rejected_before_any_write() {
    let service = service();

    let err = service
        .create(&StudentInput::new("", 20, "1 Rd", "a@x.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(row_count(&service), 0);
}

#[test]
fn injection_shaped_text_is_stored_verbatim() {
    let service = service();
    let hostile = StudentInput::new(
        "x'); DROP TABLE students; --",
        20,
        "1 Rd' OR '1'='1",
        "o'brien@x.com",
    );

    let created = service.create(&hostile).unwrap();
    let loaded = service.get_by_id(created.id).unwrap();
    assert_eq!(loaded.to_input(), hostile);
    assert_eq!(row_count(&service), 1);
}

#[test]
fn non_ascii_space_and_padded_text_round_trip() {
    let service = service();
    let inputs = [
        StudentInput::new("\u{A0}", 20, "\u{3000}", "nbsp@x.com"),
        StudentInput::new("\tAnn\n", 21, " 1 Rd\r", "pad@x.com"),
    ];

    for input in &inputs {
        let created = service.create(input).unwrap();
        assert_eq!(service.get_by_id(created.id).unwrap().to_input(), *input);
    }
    assert_eq!(row_count(&service), 2);
}

#[test]
fn nul_text_is_a_validation_error_not_a_store_error() {
    let service = service();

    let err = service
        .create(&StudentInput::new("Ann\0", 20, "1 Rd", "a@x.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(row_count(&service), 0);
}

fn hammer(service: Arc<StudentService>) {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let input =
                        StudentInput::new("Ann", 20, "1 Rd", format!("t{t}-{i}@x.com"));
                    service.create(&input).unwrap();
                    service.list_all().unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(row_count(&service), THREADS * PER_THREAD);
}

#[test]
fn concurrent_units_of_work_on_in_memory_store_all_succeed() {
    hammer(Arc::new(service()));
}

#[test]
fn concurrent_units_of_work_on_file_store_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let factory = SessionFactory::open(dir.path().join("students.db")).unwrap();
    hammer(Arc::new(StudentService::new(Arc::new(factory))));
}

#[test]
fn repository_statements_roll_back_with_their_transaction() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let mut conn = factory.session().unwrap();

    {
        let tx = conn.transaction().unwrap();
        let repo = SqliteStudentRepository::new(&tx);
        repo.insert_student(&ann()).unwrap();
        let err = repo.insert_student(&ann()).unwrap_err();
        assert!(matches!(err, RepoError::Conflict));
        tx.rollback().unwrap();
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn corrupted_rows_surface_as_invalid_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.db");
    let factory = Arc::new(SessionFactory::open(&path).unwrap());
    let service = StudentService::new(Arc::clone(&factory));
    let created = service.create(&ann()).unwrap();

    let raw = Connection::open(&path).unwrap();
    raw.execute_batch("PRAGMA ignore_check_constraints = ON;").unwrap();
    raw.execute("UPDATE students SET name = ' ' WHERE id = ?1", [created.id])
        .unwrap();
    drop(raw);

    let err = service.get_by_id(created.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn operations_after_shutdown_fail_with_store_error() {
    let service = service();
    service.create(&ann()).unwrap();

    service.sessions().shutdown();

    let err = service.list_all().unwrap_err();
    assert!(matches!(err, RepoError::Store(StoreError::Closed)));
}

#[test]
fn worked_example_end_to_end() {
    let service = service();

    let created = service.create(&ann()).unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.name, "Ann");

    assert!(matches!(
        service.create(&ann()).unwrap_err(),
        RepoError::Conflict
    ));
    assert_eq!(service.get_by_id(1).unwrap(), created);

    let updated = service
        .update(1, &StudentInput::new("Ann B", 20, "1 Rd", "a@x.com"))
        .unwrap();
    assert_eq!(updated.id, 1);
    assert_eq!(updated.name, "Ann B");

    assert_eq!(service.delete(1).unwrap().message(), "Student with ID 1 deleted");
    assert!(matches!(
        service.get_by_id(1).unwrap_err(),
        RepoError::NotFound(1)
    ));
}
