//! SQL identifier sanitization.
//!
//! Table and column names arrive from query strings and end up quoted inside
//! SQL text, so only plain identifiers are accepted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern compiles"));

pub const DEFAULT_SCHEMA: &str = "public";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentError {
    Empty,
    Invalid(String),
}

impl fmt::Display for IdentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentError::Empty => write!(f, "Empty identifier"),
            IdentError::Invalid(name) => write!(f, "Invalid identifier: {name}"),
        }
    }
}

impl std::error::Error for IdentError {}

/// Accept `name` only if it is a plain identifier.
pub fn sanitize_ident(name: &str) -> Result<&str, IdentError> {
    if name.is_empty() {
        return Err(IdentError::Empty);
    }
    if !IDENT_RE.is_match(name) {
        return Err(IdentError::Invalid(name.to_string()));
    }
    Ok(name)
}

/// Double-quoted form of an identifier that passed [`sanitize_ident`].
pub fn quote_ident(name: &str) -> String {
    format!("\"{name}\"")
}

/// A sanitized `schema.table` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: &str, table: &str) -> Result<Self, IdentError> {
        Ok(Self {
            schema: sanitize_ident(schema)?.to_string(),
            table: sanitize_ident(table)?.to_string(),
        })
    }

    /// Parse `schema.table` or a bare `table` (schema `public`).
    ///
    /// Splits on the first dot, so `a.b.c` fails on the table part.
    pub fn parse(qualified: &str) -> Result<Self, IdentError> {
        match qualified.split_once('.') {
            Some((schema, table)) => Self::new(schema, table),
            None => Self::new(DEFAULT_SCHEMA, qualified),
        }
    }

    /// `"schema"."table"` for SQL text.
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}
