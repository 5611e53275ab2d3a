//! Column resolution against drifting spreadsheet headers
//!
//! Headers in the source drift: trailing whitespace, parenthetical
//! suffixes, renamed labels. Each logical field therefore declares an
//! ordered list of candidate substrings, and resolution picks the first
//! column whose trimmed name contains one of them. A field that resolves
//! to nothing is a valid state ("schema drift"): the caller degrades the
//! dependent widget instead of failing the render.

use std::collections::HashMap;

/// One logical field and its ordered candidate substrings
pub struct FieldSpec<'a> {
    pub field: &'a str,
    pub aliases: &'a [String],
}

/// Typed outcome of resolving a header row against a set of field specs
#[derive(Debug, Clone, Default)]
pub struct ResolvedSchema {
    /// Trimmed header names, in column order
    pub headers: Vec<String>,
    /// field name -> column index, for fields that resolved
    found: HashMap<String, usize>,
    /// Field names that did not resolve, in declaration order
    pub missing: Vec<String>,
}

impl ResolvedSchema {
    /// Column index for a resolved field
    pub fn index(&self, field: &str) -> Option<usize> {
        self.found.get(field).copied()
    }

    /// Resolved column name for a field (diagnostic display)
    pub fn column(&self, field: &str) -> Option<&str> {
        self.index(field).map(|i| self.headers[i].as_str())
    }

    /// Cell of `row` under a resolved field; `None` when the field did
    /// not resolve, empty string when the row is shorter than the column
    pub fn cell<'r>(&self, row: &'r [String], field: &str) -> Option<&'r str> {
        self.index(field)
            .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
    }
}

/// Find the first column whose trimmed name contains any candidate
/// substring. Candidates are checked in order; within one candidate,
/// columns are checked in their natural order. `None` when nothing
/// matches; never an error.
pub fn resolve_column<'c>(columns: &'c [String], candidates: &[String]) -> Option<&'c str> {
    resolve_index(columns, candidates).map(|i| columns[i].as_str())
}

/// Index variant of [`resolve_column`]
pub fn resolve_index(columns: &[String], candidates: &[String]) -> Option<usize> {
    for candidate in candidates {
        for (i, column) in columns.iter().enumerate() {
            if column.trim().contains(candidate.as_str()) {
                return Some(i);
            }
        }
    }
    None
}

/// Resolve a full header row against declared field specs, producing a
/// typed found/missing result instead of implicit `None` propagation
pub fn resolve_schema(headers: &[String], specs: &[FieldSpec<'_>]) -> ResolvedSchema {
    let mut schema = ResolvedSchema {
        headers: headers.iter().map(|h| h.trim().to_string()).collect(),
        ..Default::default()
    };

    for spec in specs {
        match resolve_index(headers, spec.aliases) {
            Some(index) => {
                schema.found.insert(spec.field.to_string(), index);
            }
            None => schema.missing.push(spec.field.to_string()),
        }
    }

    schema
}
