//! The ten literal rows of `customers_demo`.
//!
//! Row 4 repeats row 1 on purpose and several columns carry NULLs: the table
//! exists to exercise NULL and duplicate handling in downstream consumers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::seed::error::SeedError;
use crate::seed::schema::{DATA_COLUMNS, INCOME_PRECISION, INCOME_SCALE};

/// A row as written in the seed: text literals, `None` for NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerSeed {
    pub first_name: Option<&'static str>,
    pub last_name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub age: Option<i32>,
    pub income: Option<&'static str>,
    pub signup_date: Option<&'static str>,
    pub is_active: Option<bool>,
}

pub const CUSTOMER_SEEDS: [CustomerSeed; 10] = [
    CustomerSeed {
        first_name: Some("Ana"),
        last_name: Some("López"),
        email: Some("ana@example.com"),
        age: Some(28),
        income: Some("18500.00"),
        signup_date: Some("2024-01-15"),
        is_active: Some(true),
    },
    CustomerSeed {
        first_name: Some("Luis"),
        last_name: Some("Pérez"),
        email: None,
        age: Some(35),
        income: None,
        signup_date: Some("2023-11-02"),
        is_active: Some(true),
    },
    CustomerSeed {
        first_name: Some("María"),
        last_name: Some("García"),
        email: Some("maria.garcia@example.com"),
        age: None,
        income: Some("22000.00"),
        signup_date: None,
        is_active: Some(false),
    },
    CustomerSeed {
        first_name: Some("Ana"),
        last_name: Some("López"),
        email: Some("ana@example.com"),
        age: Some(28),
        income: Some("18500.00"),
        signup_date: Some("2024-01-15"),
        is_active: Some(true),
    },
    CustomerSeed {
        first_name: Some("Lucía"),
        last_name: Some("Santos"),
        email: None,
        age: Some(41),
        income: Some("31000.50"),
        signup_date: Some("2024-03-10"),
        is_active: Some(true),
    },
    CustomerSeed {
        first_name: Some("Elena"),
        last_name: Some("Cruz"),
        email: Some("elena.cruz@example.com"),
        age: Some(30),
        income: None,
        signup_date: Some("2024-02-20"),
        is_active: Some(false),
    },
    CustomerSeed {
        first_name: Some("Carlos"),
        last_name: Some("Ruiz"),
        email: Some("carlos.ruiz@example.com"),
        age: Some(45),
        income: Some("42000.00"),
        signup_date: Some("2023-08-19"),
        is_active: Some(true),
    },
    CustomerSeed {
        first_name: Some("Sofía"),
        last_name: Some("Torres"),
        email: Some("sofia.torres@example.com"),
        age: Some(23),
        income: Some("15000.75"),
        signup_date: Some("2024-04-01"),
        is_active: None,
    },
    CustomerSeed {
        first_name: Some("Diego"),
        last_name: None,
        email: Some("diego.morales@example.com"),
        age: Some(52),
        income: Some("56000.00"),
        signup_date: Some("2022-12-05"),
        is_active: Some(false),
    },
    CustomerSeed {
        first_name: None,
        last_name: Some("Ramos"),
        email: Some("javier.ramos@example.com"),
        age: Some(37),
        income: Some("27500.25"),
        signup_date: Some("2023-06-30"),
        is_active: Some(true),
    },
];

/// A typed customer row (every column but `id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Customer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub income: Option<Decimal>,
    pub signup_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl Customer {
    /// Display name used in reports, `?` standing in for a NULL part.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or("?"),
            self.last_name.as_deref().unwrap_or("?")
        )
    }

    /// Whether the given data column is NULL in this row; `None` for a name
    /// that is not a data column.
    pub fn is_null(&self, column: &str) -> Option<bool> {
        let null = match column {
            "first_name" => self.first_name.is_none(),
            "last_name" => self.last_name.is_none(),
            "email" => self.email.is_none(),
            "age" => self.age.is_none(),
            "income" => self.income.is_none(),
            "signup_date" => self.signup_date.is_none(),
            "is_active" => self.is_active.is_none(),
            _ => return None,
        };
        Some(null)
    }
}

impl TryFrom<&CustomerSeed> for Customer {
    type Error = SeedError;

    fn try_from(seed: &CustomerSeed) -> Result<Self, Self::Error> {
        Ok(Customer {
            first_name: seed.first_name.map(str::to_string),
            last_name: seed.last_name.map(str::to_string),
            email: seed.email.map(str::to_string),
            age: seed.age,
            income: seed.income.map(parse_income).transpose()?,
            signup_date: seed.signup_date.map(parse_date).transpose()?,
            is_active: seed.is_active,
        })
    }
}

fn parse_income(literal: &'static str) -> Result<Decimal, SeedError> {
    let invalid = |reason: String| SeedError::InvalidLiteral {
        column: "income",
        value: literal.to_string(),
        reason,
    };
    let value = Decimal::from_str(literal).map_err(|e| invalid(e.to_string()))?;
    if value.scale() > INCOME_SCALE {
        return Err(invalid(format!("more than {INCOME_SCALE} fractional digits")));
    }
    let bound = Decimal::from(10i64.pow(INCOME_PRECISION - INCOME_SCALE));
    if value.abs() >= bound {
        return Err(invalid(format!("does not fit NUMERIC({INCOME_PRECISION},{INCOME_SCALE})")));
    }
    Ok(value)
}

fn parse_date(literal: &'static str) -> Result<NaiveDate, SeedError> {
    NaiveDate::parse_from_str(literal, "%Y-%m-%d").map_err(|e| SeedError::InvalidLiteral {
        column: "signup_date",
        value: literal.to_string(),
        reason: e.to_string(),
    })
}

/// The seed rows in insertion order.
pub fn customers() -> Result<Vec<Customer>, SeedError> {
    CUSTOMER_SEEDS.iter().map(Customer::try_from).collect()
}

/// Counts a set of rows is expected to show once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetProfile {
    pub total_rows: usize,
    /// NULL count per data column, every column present.
    pub null_counts: BTreeMap<&'static str, usize>,
    /// Groups of rows identical across all data columns: (display name, size).
    pub duplicate_groups: Vec<(String, usize)>,
}

impl DatasetProfile {
    pub fn from_rows(rows: &[Customer]) -> Self {
        let null_counts = DATA_COLUMNS
            .iter()
            .map(|column| (*column, rows.iter().filter(|row| row.is_null(column) == Some(true)).count()))
            .collect();

        // First-seen order keeps the report stable.
        let mut groups: Vec<(&Customer, usize)> = Vec::new();
        for row in rows {
            match groups.iter_mut().find(|(seen, _)| *seen == row) {
                Some((_, count)) => *count += 1,
                None => groups.push((row, 1)),
            }
        }
        let duplicate_groups = groups
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(row, count)| (row.display_name(), count))
            .collect();

        Self {
            total_rows: rows.len(),
            null_counts,
            duplicate_groups,
        }
    }

    /// Rows that are copies of an earlier row.
    pub fn duplicate_rows(&self) -> usize {
        self.duplicate_groups.iter().map(|(_, count)| count - 1).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_with_null(rows: &[Customer], column: &str) -> Vec<String> {
        rows.iter()
            .filter(|row| row.is_null(column).expect("data column"))
            .map(Customer::display_name)
            .collect()
    }

    #[test]
    fn test_every_literal_parses() {
        let rows = customers().unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].income, Some(Decimal::new(1850000, 2)));
        assert_eq!(rows[0].signup_date, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_exactly_one_duplicate_pair() {
        let rows = customers().unwrap();
        let profile = DatasetProfile::from_rows(&rows);
        assert_eq!(profile.duplicate_groups, vec![("Ana López".to_string(), 2)]);
        assert_eq!(profile.duplicate_rows(), 1);

        let ana = &rows[0];
        assert_eq!(ana.email.as_deref(), Some("ana@example.com"));
        assert_eq!(ana.age, Some(28));
        assert_eq!(ana.is_active, Some(true));
    }

    #[test]
    fn test_null_placement() {
        let rows = customers().unwrap();
        assert_eq!(names_with_null(&rows, "email"), vec!["Luis Pérez", "Lucía Santos"]);
        assert_eq!(names_with_null(&rows, "age"), vec!["María García"]);
        assert_eq!(names_with_null(&rows, "income"), vec!["Luis Pérez", "Elena Cruz"]);
        assert_eq!(names_with_null(&rows, "signup_date"), vec!["María García"]);
    }

    #[test]
    fn test_is_null_knows_only_data_columns() {
        let rows = customers().unwrap();
        assert_eq!(rows[1].is_null("email"), Some(true));
        assert_eq!(rows[0].is_null("email"), Some(false));
        assert_eq!(rows[0].is_null("id"), None);
        assert_eq!(rows[0].is_null("salary"), None);
        for column in DATA_COLUMNS {
            assert!(rows[0].is_null(column).is_some(), "{column}");
        }
    }

    #[test]
    fn test_profile_null_counts_cover_every_column() {
        let profile = DatasetProfile::from_rows(&customers().unwrap());
        assert_eq!(profile.total_rows, 10);
        assert_eq!(profile.null_counts.len(), DATA_COLUMNS.len());
        assert_eq!(profile.null_counts["email"], 2);
        assert_eq!(profile.null_counts["age"], 1);
        assert_eq!(profile.null_counts["income"], 2);
        assert_eq!(profile.null_counts["signup_date"], 1);
        assert_eq!(profile.null_counts["first_name"], 1);
        assert_eq!(profile.null_counts["last_name"], 1);
        assert_eq!(profile.null_counts["is_active"], 1);
    }

    #[test]
    fn test_bad_literals_are_rejected() {
        let mut seed = CUSTOMER_SEEDS[0];
        seed.income = Some("12.345");
        assert!(matches!(
            Customer::try_from(&seed),
            Err(SeedError::InvalidLiteral { column: "income", .. })
        ));

        seed.income = Some("12345678901.00");
        assert!(Customer::try_from(&seed).is_err());

        seed.income = Some("9999999999.99");
        assert!(Customer::try_from(&seed).is_ok());

        seed.signup_date = Some("2024-02-30");
        assert!(matches!(
            Customer::try_from(&seed),
            Err(SeedError::InvalidLiteral { column: "signup_date", .. })
        ));
    }
}
