//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving ports,
//! so they stay testable with mocks and without I/O.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::ports::{
    DepartmentCommand, DepartmentQuery, EmployeeCommand, EmployeeQuery, ManagerHierarchyQuery,
};

/// Default budget for a manager closure request.
pub const DEFAULT_CLOSURE_TIMEOUT: Duration = Duration::from_secs(5);

/// Port implementations backing the HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub employees: Arc<dyn EmployeeCommand>,
    pub employees_query: Arc<dyn EmployeeQuery>,
    pub departments: Arc<dyn DepartmentCommand>,
    pub departments_query: Arc<dyn DepartmentQuery>,
    pub managers: Arc<dyn ManagerHierarchyQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub employees: Arc<dyn EmployeeCommand>,
    pub employees_query: Arc<dyn EmployeeQuery>,
    pub departments: Arc<dyn DepartmentCommand>,
    pub departments_query: Arc<dyn DepartmentQuery>,
    pub managers: Arc<dyn ManagerHierarchyQuery>,
    closure_timeout: Duration,
}

impl HttpState {
    /// Construct state with the default closure timeout.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            employees,
            employees_query,
            departments,
            departments_query,
            managers,
        } = ports;
        Self {
            employees,
            employees_query,
            departments,
            departments_query,
            managers,
            closure_timeout: DEFAULT_CLOSURE_TIMEOUT,
        }
    }

    /// Wire every port from one employee service and one department service.
    pub fn from_services<E, D>(employee_service: Arc<E>, department_service: Arc<D>) -> Self
    where
        E: EmployeeCommand + EmployeeQuery + 'static,
        D: DepartmentCommand + DepartmentQuery + ManagerHierarchyQuery + 'static,
    {
        Self::new(HttpStatePorts {
            employees: employee_service.clone(),
            employees_query: employee_service,
            departments: department_service.clone(),
            departments_query: department_service.clone(),
            managers: department_service,
        })
    }

    /// Override the manager closure budget.
    #[must_use]
    pub fn with_closure_timeout(mut self, timeout: Duration) -> Self {
        self.closure_timeout = timeout;
        self
    }

    /// Deadline for a closure request starting now.
    pub fn closure_deadline(&self) -> Option<Instant> {
        Instant::now().checked_add(self.closure_timeout)
    }
}
