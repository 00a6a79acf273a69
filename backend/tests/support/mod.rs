//! Shared helpers for HTTP-level integration tests.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::{Value, json};

use orgchart::Trace;
use orgchart::domain::{DepartmentService, EmployeeService};
use orgchart::inbound::http::configure_api;
use orgchart::inbound::http::state::HttpState;
use orgchart::outbound::memory::MemoryStore;

/// Checksum-valid tax identifiers.
pub const TAX_IDS: [&str; 4] = ["52998224725", "11144477735", "12345678909", "93541134780"];

/// Handler state over a fresh in-memory store.
pub fn memory_state() -> HttpState {
    let store = Arc::new(MemoryStore::new());
    let employees = EmployeeService::new(store.clone(), store.clone(), Arc::new(DefaultClock));
    let departments = DepartmentService::new(store.clone(), store, Arc::new(DefaultClock));
    HttpState::from_services(Arc::new(employees), Arc::new(departments))
}

/// Initialise the versioned API over a fresh in-memory store.
pub async fn init_api()
-> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(memory_state()))
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(configure_api)),
    )
    .await
}

/// Send a request and return the status code and decoded JSON body.
///
/// Empty bodies decode to `Value::Null`.
pub async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    req: test::TestRequest,
) -> (u16, Value) {
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status().as_u16();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

/// Create a department and return its id.
pub async fn create_department(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    name: &str,
    manager_id: Option<&str>,
    parent_id: Option<&str>,
) -> String {
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/v1/departments")
            .set_json(json!({
                "name": name,
                "managerId": manager_id,
                "parentDepartmentId": parent_id,
            })),
    )
    .await;
    assert_eq!(status, 201, "create department {name}: {body}");
    body["id"].as_str().expect("department id").to_owned()
}

/// Create an employee and return its id.
pub async fn create_employee(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    name: &str,
    tax_id: &str,
    department_id: &str,
) -> String {
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/api/v1/employees").set_json(json!({
            "name": name,
            "taxId": tax_id,
            "departmentId": department_id,
        })),
    )
    .await;
    assert_eq!(status, 201, "create employee {name}: {body}");
    body["id"].as_str().expect("employee id").to_owned()
}
