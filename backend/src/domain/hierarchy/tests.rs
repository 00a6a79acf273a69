//! Guard and closure behaviour over mock-backed department trees.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    DepartmentRepositoryError, MockDepartmentRepository, MockEmployeeRepository,
};
use crate::domain::{Department, DepartmentId, Employee, EmployeeId, TaxId};

fn department(name: &str, parent_id: Option<DepartmentId>) -> Department {
    Department {
        id: DepartmentId::random(),
        name: name.to_owned(),
        description: None,
        manager_id: None,
        parent_id,
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

fn employee(name: &str, department_id: DepartmentId) -> Employee {
    Employee {
        id: EmployeeId::random(),
        name: name.to_owned(),
        tax_id: TaxId::parse("52998224725").expect("valid tax id"),
        secondary_id: None,
        department_id,
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

/// Root first, each department the parent of the next.
fn chain(depth: usize) -> Vec<Department> {
    let mut departments: Vec<Department> = Vec::with_capacity(depth);
    for level in 0..depth {
        let parent = departments.last().map(|d| d.id);
        departments.push(department(&format!("level {level}"), parent));
    }
    departments
}

fn repo_over(departments: Vec<Department>) -> MockDepartmentRepository {
    let mut repo = MockDepartmentRepository::new();
    let count = u64::try_from(departments.len()).expect("small store");
    repo.expect_count().returning(move || Ok(count));

    let by_id: HashMap<DepartmentId, Department> =
        departments.iter().map(|d| (d.id, d.clone())).collect();
    repo.expect_find_by_id()
        .returning(move |id| Ok(by_id.get(id).cloned()));

    let for_parents = departments.clone();
    repo.expect_list_by_parents().returning(move |ids| {
        Ok(for_parents
            .iter()
            .filter(|d| d.parent_id.is_some_and(|parent| ids.contains(&parent)))
            .cloned()
            .collect())
    });

    repo.expect_find_by_manager().returning(move |manager_id| {
        Ok(departments
            .iter()
            .find(|d| d.manager_id == Some(*manager_id))
            .cloned())
    });
    repo
}

fn employees_over(members: Vec<Employee>) -> MockEmployeeRepository {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_list_by_departments().returning(move |ids| {
        Ok(members
            .iter()
            .filter(|e| ids.contains(&e.department_id))
            .cloned()
            .collect())
    });
    repo
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
#[case(12)]
#[tokio::test]
async fn ancestor_as_parent_is_a_cycle(#[case] depth: usize) {
    let tree = chain(depth);
    let root = tree[0].id;
    let leaf = tree[depth - 1].id;
    let repo = repo_over(tree);

    let verdict = would_create_cycle(&repo, root, leaf).await.expect("verdict");
    assert!(verdict);
}

#[rstest]
#[case(1)]
#[case(4)]
#[tokio::test]
async fn unrelated_parent_is_not_a_cycle(#[case] depth: usize) {
    let mut tree = chain(depth);
    let subject = tree[0].id;
    let other = chain(depth);
    let unrelated = other[depth - 1].id;
    tree.extend(other);
    let repo = repo_over(tree);

    let verdict = would_create_cycle(&repo, subject, unrelated)
        .await
        .expect("verdict");
    assert!(!verdict);
}

#[tokio::test]
async fn descendant_may_move_under_an_ancestor() {
    let tree = chain(3);
    let leaf = tree[2].id;
    let root = tree[0].id;
    let repo = repo_over(tree);

    let verdict = would_create_cycle(&repo, leaf, root).await.expect("verdict");
    assert!(!verdict);
}

#[tokio::test]
async fn own_parent_is_a_cycle() {
    let tree = chain(1);
    let id = tree[0].id;
    let repo = repo_over(tree);

    assert!(would_create_cycle(&repo, id, id).await.expect("verdict"));
}

#[tokio::test]
async fn missing_parent_is_reported() {
    let repo = repo_over(chain(2));
    let missing = DepartmentId::random();

    let error = would_create_cycle(&repo, DepartmentId::random(), missing)
        .await
        .expect_err("missing parent");
    assert_eq!(error, GuardError::ReferenceNotFound { id: missing });
}

#[tokio::test]
async fn looping_store_is_reported_as_inconsistent() {
    let mut first = department("first", None);
    let second = department("second", Some(first.id));
    first.parent_id = Some(second.id);
    let start = first.id;
    let repo = repo_over(vec![first, second]);

    let error = would_create_cycle(&repo, DepartmentId::random(), start)
        .await
        .expect_err("loop detected");
    assert_eq!(error, GuardError::InternalInconsistency { start, limit: 3 });
}

#[tokio::test]
async fn guard_propagates_store_failures() {
    let mut repo = MockDepartmentRepository::new();
    repo.expect_count()
        .returning(|| Err(DepartmentRepositoryError::connection("refused")));

    let error = would_create_cycle(&repo, DepartmentId::random(), DepartmentId::random())
        .await
        .expect_err("store down");
    assert!(matches!(
        error,
        GuardError::Store(DepartmentRepositoryError::Connection { .. })
    ));
}

#[tokio::test]
async fn closure_spans_three_levels_and_their_employees() {
    let manager = EmployeeId::random();
    let mut tree = chain(3);
    tree[0].manager_id = Some(manager);
    let outside = department("outside", None);
    let members = vec![
        employee("Ana", tree[0].id),
        employee("Bea", tree[1].id),
        employee("Caio", tree[2].id),
        employee("Dora", outside.id),
    ];
    let expected_departments: Vec<_> = tree.iter().map(|d| d.id).collect();
    tree.push(outside);
    let departments = repo_over(tree);
    let employees = employees_over(members);

    let closure = resolve_manager_closure(&departments, &employees, manager, None)
        .await
        .expect("closure");

    let ids: Vec<_> = closure.departments.iter().map(|d| d.id).collect();
    assert_eq!(ids, expected_departments);
    let names: Vec<_> = closure.employees.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Bea", "Caio"]);
    assert_eq!(closure.manager_id, manager);
}

#[tokio::test]
async fn closure_fetches_one_batch_per_level() {
    let root = department("root", None);
    let root_id = root.id;
    let left = department("left", Some(root.id));
    let right = department("right", Some(root.id));
    let left_leaf = department("left leaf", Some(left.id));
    let right_leaf = department("right leaf", Some(right.id));
    let all = vec![
        root.clone(),
        left.clone(),
        right.clone(),
        left_leaf.clone(),
        right_leaf.clone(),
    ];

    let mut repo = MockDepartmentRepository::new();
    repo.expect_count().times(1).returning(|| Ok(5));
    repo.expect_list_by_parents().times(3).returning(move |ids| {
        Ok(all
            .iter()
            .filter(|d| d.parent_id.is_some_and(|parent| ids.contains(&parent)))
            .cloned()
            .collect())
    });

    let collected = collect_subtree(&repo, root, None).await.expect("subtree");
    let ids: Vec<_> = collected.iter().map(|d| d.id).collect();
    assert_eq!(
        ids,
        vec![root_id, left.id, right.id, left_leaf.id, right_leaf.id]
    );
}

#[tokio::test]
async fn closure_tolerates_loops_in_a_corrupt_store() {
    let manager = EmployeeId::random();
    let mut first = department("first", None);
    let second = department("second", Some(first.id));
    first.parent_id = Some(second.id);
    first.manager_id = Some(manager);
    let departments = repo_over(vec![first, second]);
    let employees = employees_over(Vec::new());

    let closure = resolve_manager_closure(&departments, &employees, manager, None)
        .await
        .expect("closure");
    assert_eq!(closure.departments.len(), 2);
}

#[tokio::test]
async fn closure_larger_than_store_is_inconsistent() {
    let root = department("root", None);
    let child = department("child", Some(root.id));
    let mut repo = MockDepartmentRepository::new();
    repo.expect_count().returning(|| Ok(1));
    repo.expect_list_by_parents()
        .returning(move |_| Ok(vec![child.clone()]));

    let error = collect_subtree(&repo, root, None)
        .await
        .expect_err("inconsistent");
    assert_eq!(
        error,
        ClosureError::InternalInconsistency {
            collected: 2,
            limit: 1
        }
    );
}

#[tokio::test]
async fn unknown_manager_is_not_found() {
    let departments = repo_over(chain(2));
    let employees = employees_over(Vec::new());
    let manager_id = EmployeeId::random();

    let error = resolve_manager_closure(&departments, &employees, manager_id, None)
        .await
        .expect_err("no department");
    assert_eq!(error, ClosureError::ManagerNotFound { manager_id });
}

#[tokio::test]
async fn passed_deadline_stops_the_walk() {
    let manager = EmployeeId::random();
    let mut tree = chain(2);
    tree[0].manager_id = Some(manager);
    let departments = repo_over(tree);
    let employees = employees_over(Vec::new());

    let error = resolve_manager_closure(&departments, &employees, manager, Some(Instant::now()))
        .await
        .expect_err("deadline");
    assert_eq!(error, ClosureError::DeadlineExceeded);
}
