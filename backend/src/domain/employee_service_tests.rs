//! Tests for the employee service.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::{MockDepartmentRepository, MockEmployeeRepository};
use crate::domain::{Department, ErrorCode};

const TAX_ID: &str = "529.982.247-25";
const OTHER_TAX_ID: &str = "11144477735";

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

fn clock_at(now: DateTime<Utc>) -> Arc<MockClock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now);
    Arc::new(clock)
}

fn department() -> Department {
    Department {
        id: DepartmentId::random(),
        name: "Finance".to_owned(),
        description: None,
        manager_id: None,
        parent_id: None,
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

fn stored_employee(department_id: DepartmentId) -> Employee {
    Employee {
        id: EmployeeId::random(),
        name: "Grace Hopper".to_owned(),
        tax_id: TaxId::parse(TAX_ID).expect("valid tax id"),
        secondary_id: Some("GH-1".to_owned()),
        department_id,
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

fn draft(department_id: DepartmentId) -> EmployeeDraft {
    EmployeeDraft {
        id: None,
        name: "  Grace Hopper ".to_owned(),
        tax_id: TAX_ID.to_owned(),
        secondary_id: Some("GH-1".to_owned()),
        department_id: Some(department_id),
    }
}

fn make_service(
    employees: MockEmployeeRepository,
    departments: MockDepartmentRepository,
    now: DateTime<Utc>,
) -> EmployeeService<MockEmployeeRepository, MockDepartmentRepository> {
    EmployeeService::new(Arc::new(employees), Arc::new(departments), clock_at(now))
}

fn departments_containing(department: Department) -> MockDepartmentRepository {
    let mut departments = MockDepartmentRepository::new();
    departments
        .expect_find_by_id()
        .returning(move |_| Ok(Some(department.clone())));
    departments
}

#[rstest]
#[tokio::test]
async fn create_persists_a_valid_employee(now: DateTime<Utc>) {
    let department = department();
    let department_id = department.id;
    let mut employees = MockEmployeeRepository::new();
    employees.expect_find_by_tax_id().times(1).return_once(|_| Ok(None));
    employees
        .expect_find_by_secondary_id()
        .times(1)
        .return_once(|_| Ok(None));
    employees
        .expect_create()
        .withf(move |employee: &Employee| {
            employee.tax_id.as_str() == "52998224725"
                && employee.created_at == now
                && employee.updated_at == now
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(employees, departments_containing(department), now);
    let employee = service
        .create(draft(department_id))
        .await
        .expect("employee created");

    assert_eq!(employee.name, "Grace Hopper");
    assert_eq!(employee.department_id, department_id);
    assert_eq!(employee.secondary_id.as_deref(), Some("GH-1"));
}

#[rstest]
#[case("111.111.111-11", "repeated_digits")]
#[case("52998224724", "checksum_mismatch")]
#[case("5299822", "wrong_length")]
#[tokio::test]
async fn create_rejects_invalid_tax_ids(
    now: DateTime<Utc>,
    #[case] tax_id: &str,
    #[case] code: &str,
) {
    let service = make_service(
        MockEmployeeRepository::new(),
        MockDepartmentRepository::new(),
        now,
    );
    let request = EmployeeDraft {
        tax_id: tax_id.to_owned(),
        ..draft(DepartmentId::random())
    };

    let error = service.create(request).await.expect_err("invalid tax id");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().and_then(|d| d.get("code")), Some(&json!(code)));
    assert_eq!(
        error.details().and_then(|d| d.get("field")),
        Some(&json!("taxId"))
    );
}

#[rstest]
#[tokio::test]
async fn create_rejects_blank_names(now: DateTime<Utc>) {
    let service = make_service(
        MockEmployeeRepository::new(),
        MockDepartmentRepository::new(),
        now,
    );
    let request = EmployeeDraft {
        name: "   ".to_owned(),
        ..draft(DepartmentId::random())
    };

    let error = service.create(request).await.expect_err("blank name");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_requires_a_department(now: DateTime<Utc>) {
    let service = make_service(
        MockEmployeeRepository::new(),
        MockDepartmentRepository::new(),
        now,
    );
    let request = EmployeeDraft {
        department_id: None,
        ..draft(DepartmentId::random())
    };

    let error = service.create(request).await.expect_err("no department");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_rejects_a_duplicate_tax_id(now: DateTime<Utc>) {
    let department = department();
    let existing = stored_employee(department.id);
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_find_by_tax_id()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    employees.expect_create().times(0);

    let service = make_service(employees, MockDepartmentRepository::new(), now);
    let error = service
        .create(draft(department.id))
        .await
        .expect_err("duplicate tax id");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn create_rejects_a_duplicate_secondary_id(now: DateTime<Utc>) {
    let department = department();
    let existing = stored_employee(department.id);
    let mut employees = MockEmployeeRepository::new();
    employees.expect_find_by_tax_id().return_once(|_| Ok(None));
    employees
        .expect_find_by_secondary_id()
        .withf(|secondary_id: &str| secondary_id == "GH-1")
        .return_once(move |_| Ok(Some(existing)));

    let service = make_service(employees, MockDepartmentRepository::new(), now);
    let error = service
        .create(draft(department.id))
        .await
        .expect_err("duplicate secondary id");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn create_skips_blank_secondary_ids(now: DateTime<Utc>) {
    let department = department();
    let department_id = department.id;
    let mut employees = MockEmployeeRepository::new();
    employees.expect_find_by_tax_id().return_once(|_| Ok(None));
    employees.expect_find_by_secondary_id().times(0);
    employees.expect_create().return_once(|_| Ok(()));

    let service = make_service(employees, departments_containing(department), now);
    let request = EmployeeDraft {
        secondary_id: Some("  ".to_owned()),
        ..draft(department_id)
    };

    let employee = service.create(request).await.expect("created");
    assert!(employee.secondary_id.is_none());
}

#[rstest]
#[tokio::test]
async fn create_rejects_an_unknown_department(now: DateTime<Utc>) {
    let mut employees = MockEmployeeRepository::new();
    employees.expect_find_by_tax_id().return_once(|_| Ok(None));
    employees
        .expect_find_by_secondary_id()
        .return_once(|_| Ok(None));
    let mut departments = MockDepartmentRepository::new();
    departments.expect_find_by_id().return_once(|_| Ok(None));

    let service = make_service(employees, departments, now);
    let error = service
        .create(draft(DepartmentId::random()))
        .await
        .expect_err("unknown department");
    assert_eq!(error.code(), ErrorCode::ReferenceNotFound);
}

#[rstest]
#[tokio::test]
async fn create_rejects_a_client_id_in_use(now: DateTime<Utc>) {
    let department = department();
    let existing = stored_employee(department.id);
    let requested = existing.id;
    let mut employees = MockEmployeeRepository::new();
    employees.expect_find_by_tax_id().return_once(|_| Ok(None));
    employees
        .expect_find_by_secondary_id()
        .return_once(|_| Ok(None));
    employees
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    employees.expect_create().times(0);

    let service = make_service(employees, departments_containing(department.clone()), now);
    let request = EmployeeDraft {
        id: Some(requested),
        tax_id: OTHER_TAX_ID.to_owned(),
        ..draft(department.id)
    };

    let error = service.create(request).await.expect_err("id taken");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn create_translates_store_uniqueness_races(now: DateTime<Utc>) {
    let department = department();
    let mut employees = MockEmployeeRepository::new();
    employees.expect_find_by_tax_id().return_once(|_| Ok(None));
    employees
        .expect_find_by_secondary_id()
        .return_once(|_| Ok(None));
    employees
        .expect_create()
        .return_once(|_| Err(EmployeeRepositoryError::duplicate_tax_id("52998224725")));

    let service = make_service(employees, departments_containing(department.clone()), now);
    let error = service
        .create(draft(department.id))
        .await
        .expect_err("race lost");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn create_reports_an_unavailable_store(now: DateTime<Utc>) {
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_find_by_tax_id()
        .return_once(|_| Err(EmployeeRepositoryError::connection("refused")));

    let service = make_service(employees, MockDepartmentRepository::new(), now);
    let error = service
        .create(draft(DepartmentId::random()))
        .await
        .expect_err("store down");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert!(error.code().is_retryable());
}

#[rstest]
#[tokio::test]
async fn update_keeps_creation_time_and_skips_unchanged_uniqueness_checks(now: DateTime<Utc>) {
    let department = department();
    let existing = stored_employee(department.id);
    let id = existing.id;
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    employees.expect_find_by_tax_id().times(0);
    employees.expect_find_by_secondary_id().times(0);
    employees.expect_update().times(1).return_once(|_| Ok(true));

    let service = make_service(employees, departments_containing(department.clone()), now);
    let request = EmployeeDraft {
        name: "Rear Admiral Hopper".to_owned(),
        ..draft(department.id)
    };

    let employee = service.update(id, request).await.expect("updated");
    assert_eq!(employee.name, "Rear Admiral Hopper");
    assert_eq!(employee.created_at, DateTime::<Utc>::UNIX_EPOCH);
    assert_eq!(employee.updated_at, now);
}

#[rstest]
#[tokio::test]
async fn update_rejects_a_tax_id_held_by_someone_else(now: DateTime<Utc>) {
    let department = department();
    let existing = stored_employee(department.id);
    let id = existing.id;
    let other = Employee {
        id: EmployeeId::random(),
        tax_id: TaxId::parse(OTHER_TAX_ID).expect("valid tax id"),
        ..existing.clone()
    };
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    employees
        .expect_find_by_tax_id()
        .return_once(move |_| Ok(Some(other)));
    employees.expect_update().times(0);

    let service = make_service(employees, MockDepartmentRepository::new(), now);
    let request = EmployeeDraft {
        tax_id: OTHER_TAX_ID.to_owned(),
        ..draft(department.id)
    };

    let error = service.update(id, request).await.expect_err("taken");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn update_of_a_missing_employee_is_not_found(now: DateTime<Utc>) {
    let mut employees = MockEmployeeRepository::new();
    employees.expect_find_by_id().return_once(|_| Ok(None));

    let service = make_service(employees, MockDepartmentRepository::new(), now);
    let error = service
        .update(EmployeeId::random(), draft(DepartmentId::random()))
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_refuses_a_current_manager(now: DateTime<Utc>) {
    let mut managed = department();
    let existing = stored_employee(managed.id);
    let id = existing.id;
    managed.manager_id = Some(id);
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    employees.expect_delete().times(0);
    let mut departments = MockDepartmentRepository::new();
    departments
        .expect_find_by_manager()
        .return_once(move |_| Ok(Some(managed)));

    let service = make_service(employees, departments, now);
    let error = service.delete(id).await.expect_err("manager");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn delete_removes_a_plain_employee(now: DateTime<Utc>) {
    let existing = stored_employee(DepartmentId::random());
    let id = existing.id;
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    employees
        .expect_delete()
        .withf(move |candidate: &EmployeeId| *candidate == id)
        .times(1)
        .return_once(|_| Ok(true));
    let mut departments = MockDepartmentRepository::new();
    departments.expect_find_by_manager().return_once(|_| Ok(None));

    let service = make_service(employees, departments, now);
    service.delete(id).await.expect("deleted");
}

#[rstest]
#[tokio::test]
async fn get_returns_the_stored_record(now: DateTime<Utc>) {
    let existing = stored_employee(DepartmentId::random());
    let id = existing.id;
    let expected = existing.clone();
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_find_by_id()
        .times(2)
        .returning(move |_| Ok(Some(existing.clone())));

    let service = make_service(employees, MockDepartmentRepository::new(), now);
    let first = service.get(id).await.expect("found");
    let second = service.get(id).await.expect("found");
    assert_eq!(first, expected);
    assert_eq!(first, second);
}

#[rstest]
#[tokio::test]
async fn list_normalises_filters(now: DateTime<Utc>) {
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_list()
        .withf(|filter: &EmployeeFilter, page: &PageRequest| {
            filter.tax_id.as_deref() == Some("52998224725")
                && filter.name.as_deref() == Some("grace")
                && filter.secondary_id.is_none()
                && page.limit() == 10
        })
        .return_once(|_, page| Ok(Page::new(Vec::new(), 0, page)));

    let service = make_service(employees, MockDepartmentRepository::new(), now);
    let filter = EmployeeFilter {
        name: Some(" grace ".to_owned()),
        tax_id: Some(TAX_ID.to_owned()),
        secondary_id: Some(String::new()),
        department_id: None,
    };

    let page = service
        .list(filter, PageRequest::new(Some(1), Some(500)))
        .await
        .expect("listed");
    assert_eq!(page.total, 0);
}
