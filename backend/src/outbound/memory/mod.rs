//! In-memory implementation of both repository ports.
//!
//! Used when no database is configured and by the HTTP integration tests.
//! All state sits behind a single lock, so each write checks its
//! constraints and applies atomically with respect to other writers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tokio::sync::RwLock;

use crate::domain::ports::{
    DepartmentRepository, DepartmentRepositoryError, EmployeeRepository, EmployeeRepositoryError,
};
use crate::domain::{
    Department, DepartmentFilter, DepartmentId, Employee, EmployeeFilter, EmployeeId, TaxId,
};

#[derive(Debug, Default)]
struct State {
    employees: HashMap<EmployeeId, Employee>,
    departments: HashMap<DepartmentId, Department>,
}

impl State {
    fn sorted_departments(&self, keep: impl Fn(&Department) -> bool) -> Vec<Department> {
        let mut found: Vec<Department> = self
            .departments
            .values()
            .filter(|department| keep(department))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        found
    }

    fn sorted_employees(&self, keep: impl Fn(&Employee) -> bool) -> Vec<Employee> {
        let mut found: Vec<Employee> = self
            .employees
            .values()
            .filter(|employee| keep(employee))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        found
    }

    fn check_employee_keys(&self, employee: &Employee) -> Result<(), EmployeeRepositoryError> {
        for other in self.employees.values().filter(|other| other.id != employee.id) {
            if other.tax_id == employee.tax_id {
                return Err(EmployeeRepositoryError::duplicate_tax_id(
                    employee.tax_id.as_str(),
                ));
            }
            if let Some(secondary_id) = employee.secondary_id.as_deref() {
                if other.secondary_id.as_deref() == Some(secondary_id) {
                    return Err(EmployeeRepositoryError::duplicate_secondary_id(secondary_id));
                }
            }
        }
        if !self.departments.contains_key(&employee.department_id) {
            return Err(EmployeeRepositoryError::missing_reference(format!(
                "department {} does not exist",
                employee.department_id
            )));
        }
        Ok(())
    }

    fn check_department_refs(
        &self,
        department: &Department,
    ) -> Result<(), DepartmentRepositoryError> {
        if let Some(manager_id) = department.manager_id {
            if !self.employees.contains_key(&manager_id) {
                return Err(DepartmentRepositoryError::missing_reference(format!(
                    "employee {manager_id} does not exist"
                )));
            }
            let taken = self
                .departments
                .values()
                .any(|other| other.id != department.id && other.manager_id == Some(manager_id));
            if taken {
                return Err(DepartmentRepositoryError::manager_already_assigned(
                    manager_id.to_string(),
                ));
            }
        }
        if let Some(parent_id) = department.parent_id {
            if !self.departments.contains_key(&parent_id) {
                return Err(DepartmentRepositoryError::missing_reference(format!(
                    "department {parent_id} does not exist"
                )));
            }
            if self.reaches(parent_id, department.id) {
                return Err(DepartmentRepositoryError::cycle(department.id.to_string()));
            }
        }
        Ok(())
    }

    /// Whether walking up from `start` reaches `target`.
    fn reaches(&self, start: DepartmentId, target: DepartmentId) -> bool {
        let mut seen = HashSet::new();
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                return false;
            }
            cursor = self
                .departments
                .get(&current)
                .and_then(|department| department.parent_id);
        }
        false
    }
}

/// Process-local store shared by the employee and department ports.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn find_by_id(
        &self,
        id: &EmployeeId,
    ) -> Result<Option<Employee>, EmployeeRepositoryError> {
        Ok(self.state.read().await.employees.get(id).cloned())
    }

    async fn find_by_tax_id(
        &self,
        tax_id: &TaxId,
    ) -> Result<Option<Employee>, EmployeeRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .employees
            .values()
            .find(|employee| &employee.tax_id == tax_id)
            .cloned())
    }

    async fn find_by_secondary_id(
        &self,
        secondary_id: &str,
    ) -> Result<Option<Employee>, EmployeeRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .employees
            .values()
            .find(|employee| employee.secondary_id.as_deref() == Some(secondary_id))
            .cloned())
    }

    async fn list_by_departments(
        &self,
        department_ids: &[DepartmentId],
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let wanted: HashSet<&DepartmentId> = department_ids.iter().collect();
        let state = self.state.read().await;
        Ok(state.sorted_employees(|employee| wanted.contains(&employee.department_id)))
    }

    async fn count_in_department(
        &self,
        department_id: &DepartmentId,
    ) -> Result<u64, EmployeeRepositoryError> {
        let state = self.state.read().await;
        let members = state
            .employees
            .values()
            .filter(|employee| &employee.department_id == department_id)
            .count();
        Ok(u64::try_from(members).unwrap_or(u64::MAX))
    }

    async fn list(
        &self,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>, EmployeeRepositoryError> {
        let state = self.state.read().await;
        Ok(Page::from_slice(
            state.sorted_employees(|employee| filter.matches(employee)),
            page,
        ))
    }

    async fn create(&self, employee: &Employee) -> Result<(), EmployeeRepositoryError> {
        let mut state = self.state.write().await;
        if state.employees.contains_key(&employee.id) {
            return Err(EmployeeRepositoryError::duplicate_id(employee.id.to_string()));
        }
        state.check_employee_keys(employee)?;
        state.employees.insert(employee.id, employee.clone());
        Ok(())
    }

    async fn update(&self, employee: &Employee) -> Result<bool, EmployeeRepositoryError> {
        let mut state = self.state.write().await;
        if !state.employees.contains_key(&employee.id) {
            return Ok(false);
        }
        state.check_employee_keys(employee)?;
        state.employees.insert(employee.id, employee.clone());
        Ok(true)
    }

    async fn delete(&self, id: &EmployeeId) -> Result<bool, EmployeeRepositoryError> {
        let mut state = self.state.write().await;
        let manages = state
            .departments
            .values()
            .any(|department| department.manager_id == Some(*id));
        if manages {
            return Err(EmployeeRepositoryError::still_referenced(format!(
                "employee {id} manages a department"
            )));
        }
        Ok(state.employees.remove(id).is_some())
    }
}

#[async_trait]
impl DepartmentRepository for MemoryStore {
    async fn find_by_id(
        &self,
        id: &DepartmentId,
    ) -> Result<Option<Department>, DepartmentRepositoryError> {
        Ok(self.state.read().await.departments.get(id).cloned())
    }

    async fn find_by_manager(
        &self,
        manager_id: &EmployeeId,
    ) -> Result<Option<Department>, DepartmentRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .departments
            .values()
            .find(|department| department.manager_id.as_ref() == Some(manager_id))
            .cloned())
    }

    async fn count(&self) -> Result<u64, DepartmentRepositoryError> {
        let total = self.state.read().await.departments.len();
        Ok(u64::try_from(total).unwrap_or(u64::MAX))
    }

    async fn list_by_parent(
        &self,
        parent_id: &DepartmentId,
    ) -> Result<Vec<Department>, DepartmentRepositoryError> {
        let state = self.state.read().await;
        Ok(state.sorted_departments(|department| department.parent_id.as_ref() == Some(parent_id)))
    }

    async fn list_by_parents(
        &self,
        parent_ids: &[DepartmentId],
    ) -> Result<Vec<Department>, DepartmentRepositoryError> {
        let wanted: HashSet<DepartmentId> = parent_ids.iter().copied().collect();
        let state = self.state.read().await;
        Ok(state.sorted_departments(move |department| {
            department
                .parent_id
                .is_some_and(|parent| wanted.contains(&parent))
        }))
    }

    async fn list_all(&self) -> Result<Vec<Department>, DepartmentRepositoryError> {
        Ok(self.state.read().await.sorted_departments(|_| true))
    }

    async fn list(
        &self,
        filter: &DepartmentFilter,
        page: PageRequest,
    ) -> Result<Page<Department>, DepartmentRepositoryError> {
        let filter = filter.clone();
        let state = self.state.read().await;
        Ok(Page::from_slice(
            state.sorted_departments(move |department| filter.matches(department)),
            page,
        ))
    }

    async fn create(&self, department: &Department) -> Result<(), DepartmentRepositoryError> {
        let mut state = self.state.write().await;
        if state.departments.contains_key(&department.id) {
            return Err(DepartmentRepositoryError::duplicate_id(department.id.to_string()));
        }
        state.check_department_refs(department)?;
        state.departments.insert(department.id, department.clone());
        Ok(())
    }

    async fn update(&self, department: &Department) -> Result<bool, DepartmentRepositoryError> {
        let mut state = self.state.write().await;
        if !state.departments.contains_key(&department.id) {
            return Ok(false);
        }
        state.check_department_refs(department)?;
        state.departments.insert(department.id, department.clone());
        Ok(true)
    }

    async fn delete(&self, id: &DepartmentId) -> Result<bool, DepartmentRepositoryError> {
        let mut state = self.state.write().await;
        let has_children = state
            .departments
            .values()
            .any(|department| department.parent_id == Some(*id));
        let has_members = state
            .employees
            .values()
            .any(|employee| employee.department_id == *id);
        if has_children || has_members {
            return Err(DepartmentRepositoryError::still_referenced(format!(
                "department {id} still has children or employees"
            )));
        }
        Ok(state.departments.remove(id).is_some())
    }
}
