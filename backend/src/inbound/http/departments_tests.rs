//! Tests for department HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::{
    MockPorts, sample_department, sample_employee, test_app,
};

#[rstest]
#[actix_web::test]
async fn create_maps_parent_department_id() {
    let parent = sample_department("Root", None);
    let parent_id = parent.id;
    let manager_id = EmployeeId::random();
    let mut stored = sample_department("Finance", Some(parent_id));
    stored.manager_id = Some(manager_id);
    let mut ports = MockPorts::default();
    ports
        .departments
        .expect_create()
        .withf(move |draft| {
            draft.parent_id == Some(parent_id)
                && draft.manager_id == Some(manager_id)
                && draft.name == "Finance"
        })
        .times(1)
        .return_once(move |_| Ok(stored));
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/departments")
        .set_json(json!({
            "name": "Finance",
            "managerId": manager_id.to_string(),
            "parentDepartmentId": parent_id.to_string(),
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["parentDepartmentId"], parent_id.to_string());
    assert_eq!(body["managerId"], manager_id.to_string());
}

#[rstest]
#[actix_web::test]
async fn cycle_on_update_is_a_conflict() {
    let id = DepartmentId::random();
    let mut ports = MockPorts::default();
    ports
        .departments
        .expect_update()
        .withf(move |target, draft| *target == id && draft.id.is_none())
        .times(1)
        .return_once(|_, _| {
            Err(Error::conflict("cycle").with_details(json!({
                "field": "parentDepartmentId",
                "code": "cycle",
            })))
        });
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/departments/{id}"))
        .set_json(json!({"name": "Root", "parentDepartmentId": DepartmentId::random().to_string()}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "cycle");
}

#[rstest]
#[actix_web::test]
async fn missing_manager_is_unprocessable() {
    let mut ports = MockPorts::default();
    ports
        .departments
        .expect_create()
        .return_once(|_| Err(Error::reference_not_found("employee not found")));
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/departments")
        .set_json(json!({"name": "Sales", "managerId": EmployeeId::random().to_string()}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[rstest]
#[actix_web::test]
async fn detail_embeds_the_manager() {
    let mut department = sample_department("Root", None);
    let manager = sample_employee("Ana", department.id);
    department.manager_id = Some(manager.id);
    let id = department.id;
    let view = DepartmentView {
        department,
        manager: Some(manager.clone()),
    };
    let mut ports = MockPorts::default();
    ports
        .departments_query
        .expect_get_by_id()
        .with(eq(id))
        .times(1)
        .return_once(move |_| Ok(view));
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/departments/{id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["manager"]["id"], manager.id.to_string());
}

#[rstest]
#[actix_web::test]
async fn search_reads_criteria_from_the_body() {
    let parent_id = DepartmentId::random();
    let mut ports = MockPorts::default();
    ports
        .departments_query
        .expect_search()
        .withf(move |filter, page| {
            filter.name.as_deref() == Some("fin")
                && filter.parent_id == Some(parent_id)
                && page.page() == 1
                && page.limit() == 10
        })
        .times(1)
        .returning(|_, page| {
            Ok(Page::new(vec![sample_department("Finance", None)], 11, page))
        });
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/departments/search")
        .set_json(json!({
            "name": "fin",
            "parentDepartmentId": parent_id.to_string(),
            "page": 1,
            "limit": 10,
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"], 11);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["items"][0]["name"], "Finance");
}

#[rstest]
#[actix_web::test]
async fn hierarchy_nests_children() {
    let root = sample_department("Root", None);
    let child = sample_department("Child", Some(root.id));
    let grandchild = sample_department("Grandchild", Some(child.id));
    let id = root.id;
    let tree = DepartmentTree::assemble(vec![root, child, grandchild]).expect("tree");
    let mut ports = MockPorts::default();
    ports
        .departments_query
        .expect_hierarchy()
        .with(eq(id))
        .return_once(move |_| Ok(tree));
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/departments/{id}/hierarchy"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["name"], "Root");
    assert_eq!(body["children"][0]["name"], "Child");
    assert_eq!(body["children"][0]["children"][0]["name"], "Grandchild");
}

#[rstest]
#[actix_web::test]
async fn delete_with_children_is_a_conflict() {
    let id = DepartmentId::random();
    let mut ports = MockPorts::default();
    ports
        .departments
        .expect_delete()
        .with(eq(id))
        .return_once(|_| Err(Error::conflict("department has children")));
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/departments/{id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
