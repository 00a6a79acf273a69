//! Department data model and hierarchy read models.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Employee, EmployeeId};

/// Stable department identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(Uuid);

impl DepartmentId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for DepartmentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Persisted department record.
///
/// ## Invariants
/// - `name` is non-empty once trimmed.
/// - Following `parent_id` links never revisits a department.
/// - `manager_id`, when present, references an employee who manages no other
///   department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<EmployeeId>,
    pub parent_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied department fields for create and full-replacement update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepartmentDraft {
    /// Requested identifier; ignored on update.
    pub id: Option<DepartmentId>,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<EmployeeId>,
    pub parent_id: Option<DepartmentId>,
}

/// Filters accepted by department searches. Absent fields do not filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepartmentFilter {
    /// Case-insensitive partial match on the name.
    pub name: Option<String>,
    /// Exact match on the parent department.
    pub parent_id: Option<DepartmentId>,
}

impl DepartmentFilter {
    /// Whether `department` satisfies every populated filter.
    pub fn matches(&self, department: &Department) -> bool {
        let name_matches = self.name.as_deref().is_none_or(|needle| {
            department
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let parent_matches = self
            .parent_id
            .is_none_or(|parent_id| department.parent_id == Some(parent_id));
        name_matches && parent_matches
    }
}

/// Department with its manager resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentView {
    pub department: Department,
    pub manager: Option<Employee>,
}

/// Department together with every descendant, nested by parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentTree {
    pub department: Department,
    pub children: Vec<DepartmentTree>,
}

impl DepartmentTree {
    /// Nest a closure listed in discovery order under its first element.
    ///
    /// Departments whose parent is not in `departments` are dropped, as are
    /// all departments when the slice is empty.
    pub fn assemble(departments: Vec<Department>) -> Option<Self> {
        let mut iter = departments.into_iter();
        let root = iter.next()?;
        let mut by_parent: HashMap<DepartmentId, Vec<Department>> = HashMap::new();
        for department in iter {
            if let Some(parent_id) = department.parent_id {
                by_parent.entry(parent_id).or_default().push(department);
            }
        }
        Some(Self::build(root, &mut by_parent))
    }

    fn build(
        department: Department,
        by_parent: &mut HashMap<DepartmentId, Vec<Department>>,
    ) -> Self {
        let children = by_parent
            .remove(&department.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| Self::build(child, by_parent))
            .collect();
        Self {
            department,
            children,
        }
    }

    /// Number of departments in the tree, root included.
    pub fn department_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Self::department_count)
            .sum::<usize>()
    }
}

/// Departments under a manager together with the employees inside them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerClosure {
    pub manager_id: EmployeeId,
    /// Departments in breadth-first discovery order, managed root first.
    pub departments: Vec<Department>,
    /// Employees of every listed department, ordered by name then id.
    pub employees: Vec<Employee>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

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

    #[rstest]
    fn assemble_nests_children_under_parents() {
        let root = department("Engineering", None);
        let platform = department("Platform", Some(root.id));
        let storage = department("Storage", Some(platform.id));
        let design = department("Design", Some(root.id));

        let tree = DepartmentTree::assemble(vec![
            root.clone(),
            platform.clone(),
            design.clone(),
            storage.clone(),
        ])
        .expect("non-empty closure");

        assert_eq!(tree.department.id, root.id);
        assert_eq!(tree.department_count(), 4);
        let child_ids: Vec<_> = tree.children.iter().map(|c| c.department.id).collect();
        assert_eq!(child_ids, vec![platform.id, design.id]);
        assert_eq!(tree.children[0].children[0].department.id, storage.id);
    }

    #[rstest]
    fn assemble_handles_wide_and_deep_closures() {
        let root = department("Root", None);
        let mut closure = vec![root.clone()];
        let mut parent = root.id;
        for depth in 0..200 {
            let node = department(&format!("Level {depth}"), Some(parent));
            parent = node.id;
            closure.push(node);
        }
        let leaves: Vec<Department> = (0..500)
            .map(|index| department(&format!("Leaf {index}"), Some(root.id)))
            .collect();
        closure.extend(leaves.iter().cloned());
        closure.push(department("Stray", Some(DepartmentId::random())));

        let tree = DepartmentTree::assemble(closure).expect("non-empty closure");

        assert_eq!(tree.department_count(), 701);
        assert_eq!(tree.children.len(), 501);
        let leaf_ids: Vec<_> = tree.children[1..]
            .iter()
            .map(|child| child.department.id)
            .collect();
        let expected: Vec<_> = leaves.iter().map(|leaf| leaf.id).collect();
        assert_eq!(leaf_ids, expected);
    }

    #[rstest]
    fn assemble_of_nothing_is_none() {
        assert!(DepartmentTree::assemble(Vec::new()).is_none());
    }

    #[rstest]
    fn filter_matches_name_and_parent() {
        let root = department("Engineering", None);
        let child = department("Platform Engineering", Some(root.id));
        let filter = DepartmentFilter {
            name: Some("engineering".to_owned()),
            parent_id: Some(root.id),
        };
        assert!(filter.matches(&child));
        assert!(!filter.matches(&root));
    }
}
