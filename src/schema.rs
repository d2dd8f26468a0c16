//! Table schema construction from CSV structure

use crate::infer::{ColumnType, TypeInferencer};
use std::collections::HashSet;

/// Name of the surrogate primary key column
pub const ID_COLUMN: &str = "id";

/// Name of the fingerprint column carrying the UNIQUE constraint
pub const FINGERPRINT_COLUMN: &str = "row_fingerprint";

/// Name of the insertion timestamp column
pub const IMPORTED_AT_COLUMN: &str = "imported_at";

/// A single data column with its inferred storage type
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: ColumnType,
}

/// Ordered table definition; the fixed system columns are appended to the
/// data columns when the DDL is rendered
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    /// Names of the data columns in source order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Idempotent DDL creating the table with its system columns
    pub fn create_table_sql(&self) -> String {
        let mut defs = vec![format!(
            "\"{}\" INTEGER PRIMARY KEY AUTOINCREMENT",
            ID_COLUMN
        )];
        for col in &self.columns {
            defs.push(format!("\"{}\" {}", col.name, col.ty.sql_type()));
        }
        defs.push(format!(
            "\"{}\" CHAR({}) NOT NULL UNIQUE",
            FINGERPRINT_COLUMN,
            crate::hash::FINGERPRINT_LEN
        ));
        defs.push(format!(
            "\"{}\" TIMESTAMP NOT NULL DEFAULT (datetime('now'))",
            IMPORTED_AT_COLUMN
        ));

        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n    {}\n)",
            self.name,
            defs.join(",\n    ")
        )
    }
}

/// Whether a column name is one of the fixed system columns
pub fn is_system_column(name: &str) -> bool {
    name.eq_ignore_ascii_case(ID_COLUMN)
        || name.eq_ignore_ascii_case(FINGERPRINT_COLUMN)
        || name.eq_ignore_ascii_case(IMPORTED_AT_COLUMN)
}

/// Whether a string can be used as a table or column identifier
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Sanitize a raw CSV header into a column identifier
///
/// Whitespace and hyphens become underscores; everything else outside
/// [A-Za-z0-9_] is stripped.
pub fn sanitize_column_name(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Builds table specs from headers and sample rows
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    inferencer: TypeInferencer,
}

impl SchemaBuilder {
    pub fn new(inferencer: TypeInferencer) -> Self {
        Self { inferencer }
    }

    /// Derive sanitized, unique column names from the raw headers
    ///
    /// A header that sanitizes to nothing becomes `column_<n>`. Collisions
    /// after sanitization, including collisions with the system columns,
    /// get a numeric suffix instead of overwriting each other. Uniqueness
    /// is checked case-insensitively because the store treats identifiers
    /// that way.
    pub fn column_names(headers: &[String]) -> Vec<String> {
        let mut taken: HashSet<String> = [ID_COLUMN, FINGERPRINT_COLUMN, IMPORTED_AT_COLUMN]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut names = Vec::with_capacity(headers.len());

        for (idx, raw) in headers.iter().enumerate() {
            let mut base = sanitize_column_name(raw);
            if base.is_empty() {
                base = format!("column_{}", idx + 1);
            }

            let mut candidate = base.clone();
            let mut suffix = 2;
            while taken.contains(&candidate.to_ascii_lowercase()) {
                candidate = format!("{}_{}", base, suffix);
                suffix += 1;
            }

            taken.insert(candidate.to_ascii_lowercase());
            names.push(candidate);
        }

        names
    }

    /// Build a table spec from the header row and leading sample rows
    ///
    /// Column values are extracted positionally; a sample row shorter than
    /// the header contributes empty strings for its missing fields.
    pub fn build(&self, table: &str, headers: &[String], sample_rows: &[Vec<String>]) -> TableSpec {
        let names = Self::column_names(headers);
        let mut columns = Vec::with_capacity(names.len());

        for (idx, name) in names.into_iter().enumerate() {
            let values: Vec<String> = sample_rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or_default())
                .collect();
            columns.push(ColumnSpec {
                name,
                ty: self.inferencer.infer(&values),
            });
        }

        TableSpec {
            name: table.to_string(),
            columns,
        }
    }
}
