//! Column type inference from sample values

use chrono::{NaiveDate, NaiveDateTime};

/// Upper bound applied to inferred VARCHAR lengths
pub const VARCHAR_MAX_LEN: usize = 500;

/// Date-only patterns, tried before the datetime patterns. A column is only
/// typed as Date/DateTime when a single pattern matches every sample.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S"];

/// Inferred storage type for a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Decimal { precision: u8, scale: u8 },
    Boolean,
    Date,
    DateTime,
    Text { max_len: usize },
}

impl ColumnType {
    /// SQL type declaration for the column
    pub fn sql_type(&self) -> String {
        match self {
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::Decimal { precision, scale } => {
                format!("DECIMAL({},{})", precision, scale)
            }
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Text { max_len } => format!("VARCHAR({})", max_len),
        }
    }
}

/// Decides a storage type from the sample values of one column
///
/// The decision only sees the leading sample rows of a file, so a column
/// whose later rows deviate from the sample may be typed too narrowly.
/// Accepted heuristic limitation; schema drift is handled elsewhere.
#[derive(Debug, Clone)]
pub struct TypeInferencer {
    varchar_min: usize,
    decimal_precision: u8,
    decimal_scale: u8,
}

impl Default for TypeInferencer {
    fn default() -> Self {
        Self::new(50, 10, 2)
    }
}

impl TypeInferencer {
    pub fn new(varchar_min: usize, decimal_precision: u8, decimal_scale: u8) -> Self {
        Self {
            varchar_min,
            decimal_precision,
            decimal_scale,
        }
    }

    /// Infer a storage type from sample values
    ///
    /// Precedence: Integer, Decimal, Boolean, Date/DateTime, Text. Empty
    /// values are excluded from every test; an all-empty sample falls back
    /// to Text at the configured minimum length.
    pub fn infer(&self, values: &[String]) -> ColumnType {
        let non_empty: Vec<&str> = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();

        if non_empty.is_empty() {
            return ColumnType::Text {
                max_len: self.varchar_min,
            };
        }

        if non_empty.iter().all(|v| v.parse::<i64>().is_ok()) {
            return ColumnType::Integer;
        }

        if non_empty.iter().all(|v| v.parse::<f64>().is_ok()) {
            return ColumnType::Decimal {
                precision: self.decimal_precision,
                scale: self.decimal_scale,
            };
        }

        if non_empty
            .iter()
            .all(|v| v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false"))
        {
            return ColumnType::Boolean;
        }

        for format in DATE_FORMATS {
            if non_empty
                .iter()
                .all(|v| NaiveDate::parse_from_str(v, format).is_ok())
            {
                return ColumnType::Date;
            }
        }

        for format in DATETIME_FORMATS {
            if non_empty
                .iter()
                .all(|v| NaiveDateTime::parse_from_str(v, format).is_ok())
            {
                return ColumnType::DateTime;
            }
        }

        let observed = non_empty
            .iter()
            .map(|v| v.chars().count())
            .max()
            .unwrap_or(0);
        ColumnType::Text {
            max_len: observed.clamp(self.varchar_min, VARCHAR_MAX_LEN),
        }
    }
}
