use empdir_core::{DraftValidationError, Employee, EmployeeDraft, PHONE_PLACEHOLDER};

fn valid_draft() -> EmployeeDraft {
    EmployeeDraft {
        name: "Kim".to_string(),
        ssn: "960608-2234567".to_string(),
        hire_date: "2019-06-08".to_string(),
        city: "Seoul".to_string(),
        phone: Some("010-2731-3153".to_string()),
        department: "Dev".to_string(),
        rank: "Staff".to_string(),
        basic_pay: 3_000_000,
        allowance: 500_000,
    }
}

#[test]
fn valid_draft_passes() {
    assert_eq!(valid_draft().validate(), Ok(()));
}

#[test]
fn blank_name_and_lookups_are_rejected() {
    let mut draft = valid_draft();
    draft.name = "  ".to_string();
    assert_eq!(draft.validate(), Err(DraftValidationError::BlankField("name")));

    let mut draft = valid_draft();
    draft.department = String::new();
    assert_eq!(
        draft.validate(),
        Err(DraftValidationError::BlankField("department"))
    );
}

#[test]
fn malformed_ssn_and_hire_date_are_rejected() {
    let mut draft = valid_draft();
    draft.ssn = "9606082234567".to_string();
    assert!(matches!(
        draft.validate(),
        Err(DraftValidationError::MalformedSsn(_))
    ));

    let mut draft = valid_draft();
    draft.hire_date = "19-6-8".to_string();
    assert!(matches!(
        draft.validate(),
        Err(DraftValidationError::MalformedHireDate(_))
    ));
}

#[test]
fn hire_date_must_be_a_calendar_day() {
    let mut draft = valid_draft();
    draft.hire_date = "2019-02-30".to_string();
    assert_eq!(
        draft.validate(),
        Err(DraftValidationError::ImpossibleHireDate(
            "2019-02-30".to_string()
        ))
    );

    draft.hire_date = "2024-02-29".to_string();
    assert_eq!(draft.validate(), Ok(()));
}

#[test]
fn yearly_pay_must_fit_in_i64() {
    let mut draft = valid_draft();
    draft.basic_pay = i64::MAX / 12;
    draft.allowance = 0;
    assert_eq!(draft.validate(), Ok(()));
    assert_eq!(draft.yearly_pay(), Some(i64::MAX / 12 * 12));

    draft.allowance = 100;
    assert_eq!(
        draft.validate(),
        Err(DraftValidationError::PayOverflow {
            basic_pay: i64::MAX / 12,
            allowance: 100
        })
    );

    draft.basic_pay = i64::MAX / 2;
    draft.allowance = 0;
    assert_eq!(draft.yearly_pay(), None);
}

#[test]
fn negative_amounts_are_rejected() {
    let mut draft = valid_draft();
    draft.allowance = -1;
    assert_eq!(
        draft.validate(),
        Err(DraftValidationError::NegativeAmount {
            field: "allowance",
            value: -1
        })
    );
}

#[test]
fn blank_phone_normalizes_to_none() {
    let mut draft = valid_draft();
    assert_eq!(draft.normalized_phone(), Some("010-2731-3153"));
    draft.phone = Some(" ".to_string());
    assert_eq!(draft.normalized_phone(), None);
    draft.phone = None;
    assert_eq!(draft.normalized_phone(), None);
}

#[test]
fn employee_serialization_uses_expected_wire_fields() {
    let employee = Employee {
        id: 1001,
        name: "Kim".to_string(),
        ssn: "960608-2234567".to_string(),
        hire_date: "2019-06-08".to_string(),
        city: "Seoul".to_string(),
        phone: PHONE_PLACEHOLDER.to_string(),
        department: "Dev".to_string(),
        rank: "Staff".to_string(),
        basic_pay: 3_000_000,
        allowance: 500_000,
        pay: 36_500_000,
    };

    let json = serde_json::to_value(&employee).unwrap();
    assert_eq!(json["id"], 1001);
    assert_eq!(json["hire_date"], "2019-06-08");
    assert_eq!(json["phone"], PHONE_PLACEHOLDER);
    assert_eq!(json["pay"], 36_500_000);
    assert!(!employee.has_phone());

    let decoded: Employee = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, employee);
}
