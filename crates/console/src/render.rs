#![forbid(unsafe_code)]

//! Plain-text renderings for the CLI. JSON output goes through the DTOs
//! directly.

use crate::dto::{IssueDto, ProductRowDto, TreeRowDto};
use std::fmt::Write as _;

const INDENT: &str = "  ";

pub fn tree_text(rows: &[TreeRowDto]) -> String {
    if rows.is_empty() {
        return "No categories found\n".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let pad = INDENT.repeat(row.depth);
        if row.is_depth_truncated_marker {
            let _ = writeln!(out, "{pad}... Maximum nesting depth reached");
        } else if row.is_circular_reference_marker {
            let _ = writeln!(
                out,
                "{pad}{} [{}] (Circular Reference)",
                row.name, row.id
            );
        } else if row.depth == 0 {
            let _ = writeln!(out, "{} [{}]", row.name, row.id);
        } else {
            let _ = writeln!(out, "{pad}{} [{}] (Level {})", row.name, row.id, row.depth);
        }
    }
    out
}

/// `id<TAB>name<TAB>parent` lines; roots show `-` as parent.
pub fn category_lines<'a>(rows: impl IntoIterator<Item = (&'a str, &'a str, Option<&'a str>)>) -> String {
    let mut out = String::new();
    for (id, name, parent) in rows {
        let _ = writeln!(out, "{id}\t{name}\t{}", parent.unwrap_or("-"));
    }
    out
}

pub fn issues_text(issues: &[IssueDto]) -> String {
    if issues.is_empty() {
        return "No integrity issues\n".to_string();
    }
    let mut out = String::new();
    for issue in issues {
        let _ = writeln!(
            out,
            "{} {} [{}] {}\n{INDENT}hint: {}",
            issue.severity, issue.code, issue.category, issue.message, issue.hint
        );
    }
    out
}

pub fn products_text(rows: &[ProductRowDto]) -> String {
    if rows.is_empty() {
        return "No products found\n".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{} ({})",
            row.id, row.name, row.category, row.price, row.total_stock, row.stock_status
        );
    }
    out
}
