//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod department_command;
mod department_query;
mod department_repository;
mod employee_command;
mod employee_query;
mod employee_repository;
mod manager_hierarchy_query;

#[cfg(test)]
pub use department_command::MockDepartmentCommand;
pub use department_command::DepartmentCommand;
#[cfg(test)]
pub use department_query::MockDepartmentQuery;
pub use department_query::DepartmentQuery;
#[cfg(test)]
pub use department_repository::MockDepartmentRepository;
pub use department_repository::{DepartmentRepository, DepartmentRepositoryError};
#[cfg(test)]
pub use employee_command::MockEmployeeCommand;
pub use employee_command::EmployeeCommand;
#[cfg(test)]
pub use employee_query::MockEmployeeQuery;
pub use employee_query::EmployeeQuery;
#[cfg(test)]
pub use employee_repository::MockEmployeeRepository;
pub use employee_repository::{EmployeeRepository, EmployeeRepositoryError};
#[cfg(test)]
pub use manager_hierarchy_query::MockManagerHierarchyQuery;
pub use manager_hierarchy_query::ManagerHierarchyQuery;
