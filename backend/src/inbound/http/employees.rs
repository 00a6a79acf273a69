//! Employee HTTP handlers.
//!
//! ```text
//! POST   /api/v1/employees
//! GET    /api/v1/employees?name=&taxId=&secondaryId=&departmentId=&page=&limit=
//! GET    /api/v1/employees/{id}
//! PUT    /api/v1/employees/{id}
//! DELETE /api/v1/employees/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DepartmentId, Employee, EmployeeDraft, EmployeeFilter, EmployeeId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_uuid, parse_uuid};

const ID: FieldName = FieldName::new("id");
const DEPARTMENT_ID: FieldName = FieldName::new("departmentId");

/// Request payload for creating or replacing an employee.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    /// Client-chosen identifier; generated when absent. Ignored on update.
    pub id: Option<String>,
    #[schema(example = "Ana Souza")]
    pub name: Option<String>,
    /// Eleven digits; punctuation is ignored.
    #[schema(example = "529.982.247-25")]
    pub tax_id: Option<String>,
    pub secondary_id: Option<String>,
    pub department_id: Option<String>,
}

/// Employee representation returned by every employee endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: String,
    pub name: String,
    #[schema(example = "52998224725")]
    pub tax_id: String,
    pub secondary_id: Option<String>,
    pub department_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Employee> for EmployeeResponse {
    fn from(value: Employee) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            tax_id: value.tax_id.to_string(),
            secondary_id: value.secondary_id,
            department_id: value.department_id.to_string(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Query string accepted by the employee listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct EmployeeListQuery {
    /// Case-insensitive partial name match.
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub secondary_id: Option<String>,
    pub department_id: Option<String>,
    /// 1-indexed page number.
    pub page: Option<i64>,
    /// Page size, 1 to 100.
    pub limit: Option<i64>,
}

/// Page of employees.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePageResponse {
    pub items: Vec<EmployeeResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl From<Page<Employee>> for EmployeePageResponse {
    fn from(page: Page<Employee>) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(EmployeeResponse::from);
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages,
        }
    }
}

fn parse_employee_id(raw: &str) -> Result<EmployeeId, Error> {
    parse_uuid(raw, ID).map(EmployeeId::from_uuid)
}

fn parse_draft(payload: EmployeeRequest) -> Result<EmployeeDraft, Error> {
    let id = parse_optional_uuid(payload.id.as_deref(), ID)?.map(EmployeeId::from_uuid);
    let department_id = parse_optional_uuid(payload.department_id.as_deref(), DEPARTMENT_ID)?
        .map(DepartmentId::from_uuid);
    Ok(EmployeeDraft {
        id,
        name: payload.name.unwrap_or_default(),
        tax_id: payload.tax_id.unwrap_or_default(),
        secondary_id: payload.secondary_id,
        department_id,
    })
}

fn parse_filter(query: &EmployeeListQuery) -> Result<EmployeeFilter, Error> {
    let department_id = parse_optional_uuid(query.department_id.as_deref(), DEPARTMENT_ID)?
        .map(DepartmentId::from_uuid);
    Ok(EmployeeFilter {
        name: query.name.clone(),
        tax_id: query.tax_id.clone(),
        secondary_id: query.secondary_id.clone(),
        department_id,
    })
}

/// Register a new employee.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = EmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Invalid name, tax id or identifier", body = ErrorSchema),
        (status = 409, description = "Tax id, secondary id or id already in use", body = ErrorSchema),
        (status = 422, description = "Department does not exist", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "createEmployee"
)]
#[post("/employees")]
pub async fn create_employee(
    state: web::Data<HttpState>,
    payload: web::Json<EmployeeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_draft(payload.into_inner())?;
    let employee = state.employees.create(draft).await?;
    Ok(HttpResponse::Created()
        .insert_header(("Location", format!("/api/v1/employees/{}", employee.id)))
        .json(EmployeeResponse::from(employee)))
}

/// List employees matching the query string.
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeListQuery),
    responses(
        (status = 200, description = "Page of employees", body = EmployeePageResponse),
        (status = 400, description = "Malformed filter", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "listEmployees"
)]
#[get("/employees")]
pub async fn list_employees(
    state: web::Data<HttpState>,
    query: web::Query<EmployeeListQuery>,
) -> ApiResult<web::Json<EmployeePageResponse>> {
    let filter = parse_filter(&query)?;
    let page = PageRequest::new(query.page, query.limit);
    let found = state.employees_query.list(filter, page).await?;
    Ok(web::Json(EmployeePageResponse::from(found)))
}

/// Fetch one employee.
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = String, Path, description = "Employee identifier")),
    responses(
        (status = 200, description = "Employee", body = EmployeeResponse),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 404, description = "Unknown employee", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "getEmployee"
)]
#[get("/employees/{id}")]
pub async fn get_employee(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<EmployeeResponse>> {
    let id = parse_employee_id(&path)?;
    let employee = state.employees_query.get(id).await?;
    Ok(web::Json(EmployeeResponse::from(employee)))
}

/// Replace an employee.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(("id" = String, Path, description = "Employee identifier")),
    request_body = EmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Invalid payload", body = ErrorSchema),
        (status = 404, description = "Unknown employee", body = ErrorSchema),
        (status = 409, description = "Tax id or secondary id in use", body = ErrorSchema),
        (status = 422, description = "Department does not exist", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "updateEmployee"
)]
#[put("/employees/{id}")]
pub async fn update_employee(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<EmployeeRequest>,
) -> ApiResult<web::Json<EmployeeResponse>> {
    let id = parse_employee_id(&path)?;
    let draft = EmployeeDraft {
        id: None,
        ..parse_draft(payload.into_inner())?
    };
    let employee = state.employees.update(id, draft).await?;
    Ok(web::Json(EmployeeResponse::from(employee)))
}

/// Remove an employee who manages no department.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id" = String, Path, description = "Employee identifier")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Unknown employee", body = ErrorSchema),
        (status = 409, description = "Employee manages a department", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "deleteEmployee"
)]
#[delete("/employees/{id}")]
pub async fn delete_employee(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_employee_id(&path)?;
    state.employees.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "employees_tests.rs"]
mod tests;
