//! Manager hierarchy HTTP handler.
//!
//! ```text
//! GET /api/v1/managers/{id}/employees
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EmployeeId, ManagerClosure};
use crate::inbound::http::ApiResult;
use crate::inbound::http::departments::DepartmentResponse;
use crate::inbound::http::employees::EmployeeResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Everything a manager is transitively responsible for.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerEmployeesResponse {
    pub manager_id: String,
    /// Managed department first, then descendants breadth-first.
    pub departments: Vec<DepartmentResponse>,
    pub employees: Vec<EmployeeResponse>,
    pub total_employees: usize,
}

impl From<ManagerClosure> for ManagerEmployeesResponse {
    fn from(value: ManagerClosure) -> Self {
        Self {
            manager_id: value.manager_id.to_string(),
            departments: value
                .departments
                .into_iter()
                .map(DepartmentResponse::from)
                .collect(),
            total_employees: value.employees.len(),
            employees: value
                .employees
                .into_iter()
                .map(EmployeeResponse::from)
                .collect(),
        }
    }
}

/// Resolve the departments and employees under a manager.
#[utoipa::path(
    get,
    path = "/api/v1/managers/{id}/employees",
    params(("id" = String, Path, description = "Manager's employee identifier")),
    responses(
        (status = 200, description = "Manager closure", body = ManagerEmployeesResponse),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 404, description = "Employee manages no department", body = ErrorSchema),
        (status = 500, description = "Stored hierarchy is inconsistent", body = ErrorSchema),
        (status = 504, description = "Closure exceeded its deadline", body = ErrorSchema)
    ),
    tags = ["managers"],
    operation_id = "getManagerEmployees"
)]
#[get("/managers/{id}/employees")]
pub async fn manager_employees(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ManagerEmployeesResponse>> {
    let manager_id = parse_uuid(&path, FieldName::new("id")).map(EmployeeId::from_uuid)?;
    let closure = state
        .managers
        .employees_under(manager_id, state.closure_deadline())
        .await?;
    Ok(web::Json(ManagerEmployeesResponse::from(closure)))
}
