//! Declarative description of persisted tables.
//!
//! A record type names its table through [`Entity`]; storage adapters read the
//! description to enforce column constraints and to render DDL. The record
//! types themselves carry no storage logic.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text { max_len: usize },
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl Column {
    pub const fn primary_key(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Integer,
            nullable: false,
            primary_key: true,
        }
    }

    pub const fn text(name: &'static str, max_len: usize, nullable: bool) -> Self {
        Self {
            name,
            ty: ColumnType::Text { max_len },
            nullable,
            primary_key: false,
        }
    }

    pub const fn timestamp(name: &'static str, nullable: bool) -> Self {
        Self {
            name,
            ty: ColumnType::Timestamp,
            nullable,
            primary_key: false,
        }
    }

    fn sql_type(&self) -> String {
        match self.ty {
            ColumnType::Integer if self.primary_key => "SERIAL".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::Text { max_len } => format!("VARCHAR({})", max_len),
            ColumnType::Timestamp => "TIMESTAMPTZ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks a text value about to be written into `column`.
    ///
    /// Lengths are counted in characters, matching `VARCHAR(n)` semantics.
    pub fn check_text(
        &self,
        column: &'static str,
        value: Option<&str>,
    ) -> Result<(), ConstraintViolation> {
        let col = self
            .column(column)
            .ok_or_else(|| ConstraintViolation::new(column, ViolationKind::UnknownColumn))?;

        let max_len = match col.ty {
            ColumnType::Text { max_len } => max_len,
            _ => return Err(ConstraintViolation::new(column, ViolationKind::NotText)),
        };

        let Some(value) = value else {
            return if col.nullable {
                Ok(())
            } else {
                Err(ConstraintViolation::new(column, ViolationKind::NotNull))
            };
        };

        if !col.nullable && value.trim().is_empty() {
            return Err(ConstraintViolation::new(column, ViolationKind::Empty));
        }

        let actual = value.chars().count();
        if actual > max_len {
            return Err(ConstraintViolation::new(
                column,
                ViolationKind::TooLong {
                    max: max_len,
                    actual,
                },
            ));
        }

        Ok(())
    }

    /// PostgreSQL DDL for this table.
    pub fn create_table_sql(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut line = format!("    {} {}", c.name, c.sql_type());
                if c.primary_key {
                    line.push_str(" PRIMARY KEY");
                } else if !c.nullable {
                    line.push_str(" NOT NULL");
                }
                if matches!(c.ty, ColumnType::Timestamp) {
                    line.push_str(" DEFAULT NOW()");
                }
                line
            })
            .collect();

        for c in self.columns {
            if matches!(c.ty, ColumnType::Text { .. }) && !c.nullable {
                lines.push(format!(
                    "    CONSTRAINT {table}_{col}_not_blank CHECK (char_length(btrim({col})) > 0)",
                    table = self.name,
                    col = c.name
                ));
            }
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            self.name,
            lines.join(",\n")
        )
    }
}

/// Coupling between a record type and the table that stores it.
pub trait Entity {
    const SCHEMA: &'static TableSchema;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    NotNull,
    Empty,
    TooLong { max: usize, actual: usize },
    UnknownColumn,
    NotText,
    /// Rejected by the database itself, carrying the SQLSTATE code.
    Rejected { code: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub column: &'static str,
    pub kind: ViolationKind,
}

impl ConstraintViolation {
    pub fn new(column: &'static str, kind: ViolationKind) -> Self {
        Self { column, kind }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::NotNull => write!(f, "{} must not be null", self.column),
            ViolationKind::Empty => write!(f, "{} must not be empty", self.column),
            ViolationKind::TooLong { max, actual } => write!(
                f,
                "{} must be at most {} characters (got {})",
                self.column, max, actual
            ),
            ViolationKind::UnknownColumn => write!(f, "unknown column {}", self.column),
            ViolationKind::NotText => write!(f, "{} is not a text column", self.column),
            ViolationKind::Rejected { code } => {
                write!(f, "{} rejected by storage (SQLSTATE {})", self.column, code)
            }
        }
    }
}

impl std::error::Error for ConstraintViolation {}
