//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, TimeZone, Utc};

use crate::Trace;
use crate::domain::ports::{
    MockDepartmentCommand, MockDepartmentQuery, MockEmployeeCommand, MockEmployeeQuery,
    MockManagerHierarchyQuery,
};
use crate::domain::{Department, DepartmentId, Employee, EmployeeId, TaxId};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Mocked driving ports; configure the ones a test exercises.
#[derive(Default)]
pub struct MockPorts {
    pub employees: MockEmployeeCommand,
    pub employees_query: MockEmployeeQuery,
    pub departments: MockDepartmentCommand,
    pub departments_query: MockDepartmentQuery,
    pub managers: MockManagerHierarchyQuery,
}

impl MockPorts {
    /// Move the mocks into handler state.
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            employees: Arc::new(self.employees),
            employees_query: Arc::new(self.employees_query),
            departments: Arc::new(self.departments),
            departments_query: Arc::new(self.departments_query),
            managers: Arc::new(self.managers),
        })
    }
}

/// Application exposing every API route over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
}

/// Fixed instant used for record timestamps.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn sample_department(name: &str, parent_id: Option<DepartmentId>) -> Department {
    Department {
        id: DepartmentId::random(),
        name: name.to_owned(),
        description: None,
        manager_id: None,
        parent_id,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn sample_employee(name: &str, department_id: DepartmentId) -> Employee {
    Employee {
        id: EmployeeId::random(),
        name: name.to_owned(),
        tax_id: TaxId::parse("52998224725").expect("valid tax id"),
        secondary_id: None,
        department_id,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}
