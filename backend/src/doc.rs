//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `inbound::http` and the schema
//! wrappers for the domain error type. Swagger UI serves it in debug builds
//! and `cargo run --bin openapi-dump` prints it for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::departments::{
    DepartmentDetailResponse, DepartmentPageResponse, DepartmentRequest, DepartmentResponse,
    DepartmentSearchRequest, DepartmentTreeResponse,
};
use crate::inbound::http::employees::{EmployeePageResponse, EmployeeRequest, EmployeeResponse};
use crate::inbound::http::managers::ManagerEmployeesResponse;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Organisation chart API",
        description = "Employees, departments and the management hierarchy between them."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::employees::create_employee,
        crate::inbound::http::employees::list_employees,
        crate::inbound::http::employees::get_employee,
        crate::inbound::http::employees::update_employee,
        crate::inbound::http::employees::delete_employee,
        crate::inbound::http::departments::create_department,
        crate::inbound::http::departments::list_departments,
        crate::inbound::http::departments::search_departments,
        crate::inbound::http::departments::get_department,
        crate::inbound::http::departments::update_department,
        crate::inbound::http::departments::delete_department,
        crate::inbound::http::departments::department_hierarchy,
        crate::inbound::http::managers::manager_employees,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        EmployeeRequest,
        EmployeeResponse,
        EmployeePageResponse,
        DepartmentRequest,
        DepartmentResponse,
        DepartmentDetailResponse,
        DepartmentTreeResponse,
        DepartmentSearchRequest,
        DepartmentPageResponse,
        ManagerEmployeesResponse,
        ErrorSchema,
        ErrorCodeSchema,
    )),
    tags(
        (name = "employees", description = "Employee records"),
        (name = "departments", description = "Departments and their hierarchy"),
        (name = "managers", description = "Transitive management queries"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
