//! HTTP inbound adapter exposing REST endpoints.

pub mod departments;
pub mod employees;
pub mod error;
pub mod health;
pub mod managers;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub(crate) mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` route and the request extractor error handlers.
///
/// Mount inside the versioned scope:
/// `web::scope("/api/v1").configure(configure_api)`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(employees::create_employee)
        .service(employees::list_employees)
        .service(employees::get_employee)
        .service(employees::update_employee)
        .service(employees::delete_employee)
        .service(departments::create_department)
        .service(departments::list_departments)
        .service(departments::search_departments)
        .service(departments::get_department)
        .service(departments::update_department)
        .service(departments::delete_department)
        .service(departments::department_hierarchy)
        .service(managers::manager_employees);
}
