#![forbid(unsafe_code)]

use super::HierarchyGuard;
use crate::ids::CategoryId;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntegrityIssue {
    pub code: &'static str,
    pub severity: Severity,
    pub category: CategoryId,
    pub message: String,
    pub hint: &'static str,
}

fn push_issue(
    issues: &mut Vec<IntegrityIssue>,
    code: &'static str,
    severity: Severity,
    category: &CategoryId,
    message: String,
    hint: &'static str,
) {
    issues.push(IntegrityIssue {
        code,
        severity,
        category: category.clone(),
        message,
        hint,
    });
}

impl HierarchyGuard<'_> {
    /// Problems already present in the stored hierarchy. Sorted by severity,
    /// then code, then category id.
    pub fn lint(&self, max_depth: usize) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        let mut seen: HashSet<&CategoryId> = HashSet::new();
        let mut duplicated: HashSet<&CategoryId> = HashSet::new();
        for node in self.nodes() {
            if !seen.insert(&node.id) && duplicated.insert(&node.id) {
                push_issue(
                    &mut issues,
                    "DUPLICATE_ID",
                    Severity::Error,
                    &node.id,
                    format!("category id {} appears more than once", node.id),
                    "Fix: delete or re-create the duplicate so every id is unique.",
                );
            }
        }

        for node in self.nodes() {
            let Some(parent) = node.parent_id.as_ref() else {
                continue;
            };
            if parent == &node.id {
                continue;
            }
            if !self.contains(parent) {
                push_issue(
                    &mut issues,
                    "DANGLING_PARENT",
                    Severity::Warning,
                    &node.id,
                    format!("parent_id {parent} is not a known category"),
                    "Fix: pick an existing parent, or clear parent_id to make it a root.",
                );
            }
        }

        for cycle in self.cycles() {
            let Some(anchor) = cycle.first() else {
                continue;
            };
            if cycle.len() == 1 {
                push_issue(
                    &mut issues,
                    "SELF_PARENT",
                    Severity::Error,
                    anchor,
                    "category is its own parent".to_string(),
                    "Fix: clear parent_id or point it at another category.",
                );
                continue;
            }
            let members = cycle
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            push_issue(
                &mut issues,
                "PARENT_CYCLE",
                Severity::Error,
                anchor,
                format!("parent_id cycle detected ({members})"),
                "Fix: break the cycle by clearing or rewriting parent_id on one of the categories.",
            );
        }

        let max_depth = max_depth.max(1);
        for node in self.nodes() {
            if self.depth_of(&node.id) == Some(max_depth) {
                push_issue(
                    &mut issues,
                    "DEPTH_EXCEEDED",
                    Severity::Warning,
                    &node.id,
                    format!("category is nested {max_depth} levels deep and is not rendered"),
                    "Fix: move the subtree closer to a root.",
                );
            }
        }

        issues.sort_by(|a, b| {
            (a.severity, a.code, &a.category).cmp(&(b.severity, b.code, &b.category))
        });
        issues
    }
}
