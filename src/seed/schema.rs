//! Layout of `public.customers_demo` and the statements that build it.

use sea_query::{
    Alias, ColumnDef, Index, IndexCreateStatement, IntoIden, PostgresQueryBuilder, Query,
    QueryStatementWriter, SchemaName, Table, TableCreateStatement, TableDropStatement, TableName,
    Value,
};

use crate::seed::dataset::Customer;
use crate::seed::error::SeedError;

pub const SCHEMA: &str = "public";
pub const TABLE: &str = "customers_demo";
pub const INDEX_NAME: &str = "idx_customers_demo_allcols";

pub const INCOME_PRECISION: u32 = 12;
pub const INCOME_SCALE: u32 = 2;

/// Every non-key column, in ordinal order. Also the composite index key order.
pub const DATA_COLUMNS: [&str; 7] = [
    "first_name",
    "last_name",
    "email",
    "age",
    "income",
    "signup_date",
    "is_active",
];

/// `public.customers_demo` as a sea-query table reference.
pub fn table_ref() -> TableName {
    TableName(Some(SchemaName::from(SCHEMA)), TABLE.into_iden())
}

/// Qualified, quoted name for raw SQL.
pub fn qualified_table() -> String {
    format!("\"{SCHEMA}\".\"{TABLE}\"")
}

pub fn create_schema_sql() -> String {
    format!("CREATE SCHEMA IF NOT EXISTS \"{SCHEMA}\"")
}

/// `numeric(p, s)`; sea-query's decimal type renders as `decimal`.
fn income_type() -> String {
    format!("numeric({INCOME_PRECISION}, {INCOME_SCALE})")
}

pub fn drop_table() -> TableDropStatement {
    Table::drop().table(table_ref()).if_exists().to_owned()
}

/// `id SERIAL PRIMARY KEY` followed by the seven nullable data columns.
pub fn create_table() -> TableCreateStatement {
    Table::create()
        .table(table_ref())
        .col(
            ColumnDef::new("id")
                .custom(Alias::new("serial"))
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new("first_name").text().null())
        .col(ColumnDef::new("last_name").text().null())
        .col(ColumnDef::new("email").text().null())
        .col(ColumnDef::new("age").integer().null())
        .col(
            ColumnDef::new("income")
                .custom(Alias::new(income_type()))
                .null(),
        )
        .col(ColumnDef::new("signup_date").date().null())
        .col(ColumnDef::new("is_active").boolean().null())
        .to_owned()
}

pub fn create_index() -> IndexCreateStatement {
    let mut index = Index::create();
    index.name(INDEX_NAME).table(table_ref());
    for column in DATA_COLUMNS {
        index.col(column);
    }
    index.to_owned()
}

fn row_values(row: &Customer) -> [Value; 7] {
    [
        Value::from(row.first_name.clone()),
        Value::from(row.last_name.clone()),
        Value::from(row.email.clone()),
        Value::from(row.age),
        Value::from(row.income),
        Value::from(row.signup_date),
        Value::from(row.is_active),
    ]
}

/// One multi-row INSERT with every value inlined, `id` left to the sequence.
pub fn insert_rows_sql(rows: &[Customer]) -> Result<String, SeedError> {
    if rows.is_empty() {
        return Err(SeedError::Build("no rows to insert".to_string()));
    }
    let mut insert = Query::insert();
    insert.into_table(table_ref()).columns(DATA_COLUMNS);
    for row in rows {
        insert
            .values(row_values(row).into_iter().map(Into::into))
            .map_err(|e| SeedError::Build(e.to_string()))?;
    }
    Ok(insert.to_string(PostgresQueryBuilder))
}

pub fn drop_table_sql() -> String {
    drop_table().build(PostgresQueryBuilder)
}

pub fn create_table_sql() -> String {
    create_table().build(PostgresQueryBuilder)
}

pub fn create_index_sql() -> String {
    create_index().build(PostgresQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::dataset::customers;

    #[test]
    fn test_create_table_sql_layout() {
        let sql = create_table_sql();
        assert!(sql.starts_with("CREATE TABLE \"public\".\"customers_demo\""), "{sql}");
        assert!(sql.contains("\"id\" serial NOT NULL PRIMARY KEY"), "{sql}");
        assert!(!sql.contains("IDENTITY"), "{sql}");
        assert!(sql.contains("\"income\" numeric(12, 2) NULL"), "{sql}");
        assert!(!sql.contains("decimal"), "{sql}");

        let mut last = 0;
        for column in std::iter::once("id").chain(DATA_COLUMNS) {
            let pos = sql
                .find(&format!("\"{column}\""))
                .unwrap_or_else(|| panic!("{column} missing from {sql}"));
            assert!(pos >= last, "{column} out of order in {sql}");
            last = pos;
        }
    }

    #[test]
    fn test_drop_is_guarded() {
        let sql = drop_table_sql();
        assert!(sql.starts_with("DROP TABLE IF EXISTS"), "{sql}");
        assert!(sql.contains("\"public\".\"customers_demo\""), "{sql}");
    }

    #[test]
    fn test_index_covers_data_columns_in_order() {
        let sql = create_index_sql();
        assert!(sql.contains(INDEX_NAME), "{sql}");
        assert!(sql.contains("\"public\".\"customers_demo\""), "{sql}");
        assert!(!sql.contains("\"id\""), "{sql}");
        assert!(!sql.contains("(("), "plain column keys expected: {sql}");
        assert!(sql.contains("(\"first_name\", \"last_name\","), "{sql}");
        let positions: Vec<usize> = DATA_COLUMNS
            .iter()
            .map(|c| sql.find(&format!("\"{c}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{sql}");
    }

    #[test]
    fn test_insert_inlines_literals_and_nulls() {
        let sql = insert_rows_sql(&customers().unwrap()).unwrap();
        assert!(sql.starts_with("INSERT INTO \"public\".\"customers_demo\""), "{sql}");
        assert!(!sql.contains("\"id\""), "{sql}");
        assert!(sql.contains("'ana@example.com'"), "{sql}");
        assert!(sql.contains("18500"), "{sql}");
        assert!(sql.contains("'2024-01-15'"), "{sql}");
        assert!(sql.contains("NULL"), "{sql}");
        assert_eq!(sql.matches("'ana@example.com'").count(), 2);
        assert!(!sql.contains("$1"), "{sql}");
    }

    #[test]
    fn test_insert_requires_rows() {
        assert!(matches!(insert_rows_sql(&[]), Err(SeedError::Build(_))));
    }

    #[test]
    fn test_qualified_names() {
        assert_eq!(qualified_table(), "\"public\".\"customers_demo\"");
        assert_eq!(create_schema_sql(), "CREATE SCHEMA IF NOT EXISTS \"public\"");
    }
}
