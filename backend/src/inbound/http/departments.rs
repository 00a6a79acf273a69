//! Department HTTP handlers.
//!
//! ```text
//! POST   /api/v1/departments
//! GET    /api/v1/departments
//! POST   /api/v1/departments/search
//! GET    /api/v1/departments/{id}
//! PUT    /api/v1/departments/{id}
//! DELETE /api/v1/departments/{id}
//! GET    /api/v1/departments/{id}/hierarchy
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Department, DepartmentDraft, DepartmentFilter, DepartmentId, DepartmentTree, DepartmentView,
    EmployeeId, Error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::employees::EmployeeResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_uuid, parse_uuid};

const ID: FieldName = FieldName::new("id");
const MANAGER_ID: FieldName = FieldName::new("managerId");
const PARENT_ID: FieldName = FieldName::new("parentDepartmentId");

/// Request payload for creating or replacing a department.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRequest {
    /// Client-chosen identifier; generated when absent. Ignored on update.
    pub id: Option<String>,
    #[schema(example = "Finance")]
    pub name: Option<String>,
    pub description: Option<String>,
    /// Required unless the store holds no department yet.
    pub manager_id: Option<String>,
    pub parent_department_id: Option<String>,
}

/// Department representation.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<String>,
    pub parent_department_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Department> for DepartmentResponse {
    fn from(value: Department) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            description: value.description,
            manager_id: value.manager_id.map(|id| id.to_string()),
            parent_department_id: value.parent_id.map(|id| id.to_string()),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Department with its resolved manager.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDetailResponse {
    #[serde(flatten)]
    pub department: DepartmentResponse,
    pub manager: Option<EmployeeResponse>,
}

impl From<DepartmentView> for DepartmentDetailResponse {
    fn from(value: DepartmentView) -> Self {
        Self {
            department: value.department.into(),
            manager: value.manager.map(EmployeeResponse::from),
        }
    }
}

/// Department and its descendants nested by parent.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentTreeResponse {
    #[serde(flatten)]
    pub department: DepartmentResponse,
    #[schema(no_recursion)]
    pub children: Vec<DepartmentTreeResponse>,
}

impl From<DepartmentTree> for DepartmentTreeResponse {
    fn from(value: DepartmentTree) -> Self {
        Self {
            department: value.department.into(),
            children: value.children.into_iter().map(Self::from).collect(),
        }
    }
}

/// Search criteria for departments.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSearchRequest {
    /// Case-insensitive partial name match.
    pub name: Option<String>,
    pub parent_department_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Page of departments.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPageResponse {
    pub items: Vec<DepartmentResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl From<Page<Department>> for DepartmentPageResponse {
    fn from(page: Page<Department>) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(DepartmentResponse::from);
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages,
        }
    }
}

fn parse_department_id(raw: &str) -> Result<DepartmentId, Error> {
    parse_uuid(raw, ID).map(DepartmentId::from_uuid)
}

fn parse_draft(payload: DepartmentRequest) -> Result<DepartmentDraft, Error> {
    Ok(DepartmentDraft {
        id: parse_optional_uuid(payload.id.as_deref(), ID)?.map(DepartmentId::from_uuid),
        name: payload.name.unwrap_or_default(),
        description: payload.description,
        manager_id: parse_optional_uuid(payload.manager_id.as_deref(), MANAGER_ID)?
            .map(EmployeeId::from_uuid),
        parent_id: parse_optional_uuid(payload.parent_department_id.as_deref(), PARENT_ID)?
            .map(DepartmentId::from_uuid),
    })
}

/// Create a department.
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = DepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 400, description = "Invalid payload or missing manager", body = ErrorSchema),
        (status = 409, description = "Manager taken, cycle or id in use", body = ErrorSchema),
        (status = 422, description = "Manager or parent does not exist", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "createDepartment"
)]
#[post("/departments")]
pub async fn create_department(
    state: web::Data<HttpState>,
    payload: web::Json<DepartmentRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_draft(payload.into_inner())?;
    let department = state.departments.create(draft).await?;
    Ok(HttpResponse::Created()
        .insert_header(("Location", format!("/api/v1/departments/{}", department.id)))
        .json(DepartmentResponse::from(department)))
}

/// List every department ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "All departments", body = [DepartmentResponse]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "listDepartments"
)]
#[get("/departments")]
pub async fn list_departments(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<DepartmentResponse>>> {
    let departments = state.departments_query.get_all().await?;
    Ok(web::Json(
        departments.into_iter().map(DepartmentResponse::from).collect(),
    ))
}

/// Search departments by name and parent.
#[utoipa::path(
    post,
    path = "/api/v1/departments/search",
    request_body = DepartmentSearchRequest,
    responses(
        (status = 200, description = "Page of departments", body = DepartmentPageResponse),
        (status = 400, description = "Malformed criteria", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "searchDepartments"
)]
#[post("/departments/search")]
pub async fn search_departments(
    state: web::Data<HttpState>,
    payload: web::Json<DepartmentSearchRequest>,
) -> ApiResult<web::Json<DepartmentPageResponse>> {
    let payload = payload.into_inner();
    let filter = DepartmentFilter {
        name: payload.name,
        parent_id: parse_optional_uuid(payload.parent_department_id.as_deref(), PARENT_ID)?
            .map(DepartmentId::from_uuid),
    };
    let page = PageRequest::new(payload.page, payload.limit);
    let found = state.departments_query.search(filter, page).await?;
    Ok(web::Json(DepartmentPageResponse::from(found)))
}

/// Fetch a department with its manager.
#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}",
    params(("id" = String, Path, description = "Department identifier")),
    responses(
        (status = 200, description = "Department", body = DepartmentDetailResponse),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 404, description = "Unknown department", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "getDepartment"
)]
#[get("/departments/{id}")]
pub async fn get_department(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DepartmentDetailResponse>> {
    let id = parse_department_id(&path)?;
    let view = state.departments_query.get_by_id(id).await?;
    Ok(web::Json(DepartmentDetailResponse::from(view)))
}

/// Replace a department.
#[utoipa::path(
    put,
    path = "/api/v1/departments/{id}",
    params(("id" = String, Path, description = "Department identifier")),
    request_body = DepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = DepartmentResponse),
        (status = 400, description = "Invalid payload", body = ErrorSchema),
        (status = 404, description = "Unknown department", body = ErrorSchema),
        (status = 409, description = "Cycle or manager taken", body = ErrorSchema),
        (status = 422, description = "Manager or parent does not exist", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "updateDepartment"
)]
#[put("/departments/{id}")]
pub async fn update_department(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<DepartmentRequest>,
) -> ApiResult<web::Json<DepartmentResponse>> {
    let id = parse_department_id(&path)?;
    let draft = DepartmentDraft {
        id: None,
        ..parse_draft(payload.into_inner())?
    };
    let department = state.departments.update(id, draft).await?;
    Ok(web::Json(DepartmentResponse::from(department)))
}

/// Remove a department with no children and no employees.
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{id}",
    params(("id" = String, Path, description = "Department identifier")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Unknown department", body = ErrorSchema),
        (status = 409, description = "Department still has children or employees", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "deleteDepartment"
)]
#[delete("/departments/{id}")]
pub async fn delete_department(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_department_id(&path)?;
    state.departments.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Fetch a department and its full subtree.
#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}/hierarchy",
    params(("id" = String, Path, description = "Department identifier")),
    responses(
        (status = 200, description = "Department subtree", body = DepartmentTreeResponse),
        (status = 404, description = "Unknown department", body = ErrorSchema),
        (status = 500, description = "Stored hierarchy is inconsistent", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "getDepartmentHierarchy"
)]
#[get("/departments/{id}/hierarchy")]
pub async fn department_hierarchy(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DepartmentTreeResponse>> {
    let id = parse_department_id(&path)?;
    let tree = state.departments_query.hierarchy(id).await?;
    Ok(web::Json(DepartmentTreeResponse::from(tree)))
}

#[cfg(test)]
#[path = "departments_tests.rs"]
mod tests;
