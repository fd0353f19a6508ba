use empdir_core::{
    DbConfig, DbError, DirectoryService, EmployeeDraft, RepoError, SearchField, SortKey,
};

fn kim() -> EmployeeDraft {
    EmployeeDraft {
        name: "Kim".to_string(),
        ssn: "960608-2234567".to_string(),
        hire_date: "2019-06-08".to_string(),
        city: "Seoul".to_string(),
        phone: None,
        department: "Dev".to_string(),
        rank: "Staff".to_string(),
        basic_pay: 3_000_000,
        allowance: 500_000,
    }
}

#[test]
fn operations_require_a_connection() {
    let service = DirectoryService::new(DbConfig::in_memory());

    assert!(!service.is_connected());
    assert!(matches!(
        service.count_employees(),
        Err(RepoError::Connection(DbError::NotConnected))
    ));
}

#[test]
fn connect_operate_close_cycle() {
    let mut service = DirectoryService::new(DbConfig::in_memory());
    service.connect().unwrap();
    service.connect().unwrap();

    assert_eq!(service.insert_employee(&kim()).unwrap(), 1);
    let listing = service.list_with_total(SortKey::PayDescending).unwrap();
    assert_eq!(listing.total, 1);
    assert_eq!(listing.employees.len(), 1);
    assert_eq!(service.count_by_field(SearchField::Name, "Kim").unwrap(), 1);
    assert_eq!(
        service
            .search_by_field(SearchField::Rank, "Staff")
            .unwrap()
            .len(),
        1
    );
    assert!(service.find_employee(1001).unwrap().is_some());
    assert_eq!(service.list_rank_names().unwrap().len(), 9);
    assert_eq!(service.list_city_names().unwrap().len(), 12);
    assert_eq!(service.list_department_names().unwrap().len(), 7);

    service.close().unwrap();
    assert!(!service.is_connected());
}

#[test]
fn insert_form_options_collects_all_lookups() {
    let mut service = DirectoryService::new(DbConfig::in_memory());
    service.connect().unwrap();

    let options = service.insert_form_options().unwrap();
    assert!(options.cities.contains(&"Seoul".to_string()));
    assert!(options.departments.contains(&"Dev".to_string()));
    assert!(options.ranks.contains(&"Staff".to_string()));
    assert_eq!(
        service.lookup_minimum_pay_for_rank("Staff").unwrap(),
        1_800_000
    );
}

#[test]
fn with_session_releases_after_success_and_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = DirectoryService::new(DbConfig::file(dir.path().join("directory.db")));

    let inserted = service
        .with_session(|repo| repo.insert_employee(&kim()))
        .unwrap();
    assert_eq!(inserted, 1);
    assert!(!service.is_connected());

    let err = service
        .with_session(|repo| repo.count_by_field(SearchField::Identifier, "not-a-number"))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidFieldValue { .. }));
    assert!(!service.is_connected());

    let count = service
        .with_session(|repo| repo.count_employees())
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn with_session_reports_open_failure() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent").join("directory.db");
    let mut service = DirectoryService::new(DbConfig::file(missing));

    let err = service
        .with_session(|repo| repo.count_employees())
        .unwrap_err();
    assert!(matches!(err, RepoError::Connection(DbError::Sqlite(_))));
    assert!(!service.is_connected());
}

#[test]
fn connect_checks_schema_and_keeps_no_handle_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("directory.db");
    let conn = empdir_core::db::open_db(&path).unwrap();
    conn.execute_batch("DROP VIEW employee_view;").unwrap();
    drop(conn);

    let mut service = DirectoryService::new(DbConfig::file(&path));
    assert!(matches!(
        service.connect(),
        Err(RepoError::MissingRequiredTable("employee_view"))
    ));
    assert!(!service.is_connected());
    assert!(matches!(
        service.count_employees(),
        Err(RepoError::Connection(DbError::NotConnected))
    ));
}
