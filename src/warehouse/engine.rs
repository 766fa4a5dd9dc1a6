//! DuckDB-backed warehouse
//!
//! One embedded database file is the whole warehouse. Load jobs stage the
//! batch to a temporary JSON file and ingest it with `read_json` under an
//! explicit column spec derived from the topic's schema descriptor, inside
//! a single transaction.

use std::path::Path;

use duckdb::types::TimeUnit;
use duckdb::Connection;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::load::LoadPlan;
use crate::schema::{FieldDescriptor, FieldMode, FieldType};
use crate::types::{JsonValue, Watermark, WriteMode};

use super::Warehouse;

/// Warehouse over an embedded DuckDB database
pub struct DuckDbWarehouse {
    /// DuckDB connection
    conn: Connection,
    /// Where the database lives (for logging)
    location: String,
}

impl DuckDbWarehouse {
    /// Open (or create) the database file.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        debug!(database = %path.display(), "opened warehouse");
        Ok(Self {
            conn,
            location: path.display().to_string(),
        })
    }

    /// Open an in-memory database (tests, dry runs).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            location: ":memory:".to_string(),
        })
    }

    /// Where this warehouse stores its data
    pub fn location(&self) -> &str {
        &self.location
    }

    fn dataset_exists(&self, dataset: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM information_schema.schemata WHERE schema_name = ?",
            duckdb::params![dataset],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl Warehouse for DuckDbWarehouse {
    fn ensure_dataset(&self, dataset: &str) -> Result<()> {
        if self.dataset_exists(dataset)? {
            debug!(dataset, "dataset already exists");
            return Ok(());
        }
        self.conn
            .execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(dataset)))?;
        info!(dataset, "created missing dataset");
        Ok(())
    }

    fn table_exists(&self, dataset: &str, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM information_schema.tables
             WHERE table_schema = ? AND table_name = ?",
            duckdb::params![dataset, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn max_timestamp(&self, dataset: &str, table: &str, column: &str) -> Result<Watermark> {
        let sql = format!(
            "SELECT max({}) FROM {}.{}",
            quote_ident(column),
            quote_ident(dataset),
            quote_ident(table)
        );
        let value: duckdb::types::Value = self.conn.query_row(&sql, [], |row| row.get(0))?;
        value_to_epoch_seconds(column, value)
    }

    fn load(&self, plan: &LoadPlan, records: &[JsonValue]) -> Result<usize> {
        let table_ref = format!(
            "{}.{}",
            quote_ident(&plan.destination.dataset_id),
            quote_ident(&plan.destination.table_id)
        );

        // Stage the batch to a temp JSON file; read_json does the casting.
        let staged = std::env::temp_dir().join(format!("siphon_load_{}.json", unique_suffix()));
        let staged_path = staged
            .to_str()
            .ok_or_else(|| Error::load("temp path is not valid UTF-8"))?;
        std::fs::write(&staged, serde_json::to_string(records)?)?;

        let create = match plan.write_mode {
            WriteMode::Append => format!(
                "CREATE TABLE IF NOT EXISTS {table_ref} ({})",
                ddl_columns(plan.schema.fields())
            ),
            WriteMode::Truncate => format!(
                "CREATE OR REPLACE TABLE {table_ref} ({})",
                ddl_columns(plan.schema.fields())
            ),
        };
        let insert = format!(
            "INSERT INTO {table_ref} BY NAME
             SELECT * FROM read_json('{staged_path}', format = 'array', columns = {})",
            columns_spec(plan.schema.fields())
        );
        let job = format!("BEGIN TRANSACTION;\n{create};\n{insert};\nCOMMIT;");

        let outcome = self.conn.execute_batch(&job);
        let _ = std::fs::remove_file(&staged);
        if outcome.is_err() {
            // the failed batch may leave the transaction open
            let _ = self.conn.execute_batch("ROLLBACK;");
        }
        outcome.map_err(|e| Error::load(format!("load job into {table_ref} failed: {e}")))?;

        if let Some(partitioning) = &plan.partitioning {
            // DuckDB tables are not natively time-partitioned; the spec is
            // recorded with the job so downstream tooling can pick it up.
            info!(
                field = partitioning.field.as_deref().unwrap_or(""),
                granularity = partitioning.granularity.as_str(),
                "load job partitioning metadata"
            );
        }

        Ok(records.len())
    }
}

/// Double-quote an identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Unique temp-file suffix (nanosecond timestamp)
fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{nanos:x}")
}

/// Render the DDL column list for a descriptor's top-level fields.
fn ddl_columns(fields: &[FieldDescriptor]) -> String {
    let columns: Vec<String> = fields
        .iter()
        .map(|field| {
            let mut column = format!("{} {}", quote_ident(&field.name), duckdb_type(field));
            if field.mode == FieldMode::Required {
                column.push_str(" NOT NULL");
            }
            column
        })
        .collect();
    columns.join(", ")
}

/// Render the `read_json` column spec for a descriptor's top-level fields.
fn columns_spec(fields: &[FieldDescriptor]) -> String {
    let entries: Vec<String> = fields
        .iter()
        .map(|field| {
            format!(
                "'{}': '{}'",
                field.name.replace('\'', "''"),
                duckdb_type(field)
            )
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Map a field descriptor to its DuckDB type, expanding RECORD fields into
/// STRUCT types recursively. REPEATED wraps the type in a list.
fn duckdb_type(field: &FieldDescriptor) -> String {
    let base = match field.field_type {
        FieldType::String => "VARCHAR".to_string(),
        FieldType::Bytes => "BLOB".to_string(),
        FieldType::Integer => "BIGINT".to_string(),
        FieldType::Float => "DOUBLE".to_string(),
        FieldType::Numeric => "DECIMAL(38,9)".to_string(),
        FieldType::Boolean => "BOOLEAN".to_string(),
        FieldType::Timestamp | FieldType::Datetime => "TIMESTAMP".to_string(),
        FieldType::Date => "DATE".to_string(),
        FieldType::Time => "TIME".to_string(),
        FieldType::Record => {
            let nested: Vec<String> = field
                .fields
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|inner| format!("{} {}", quote_ident(&inner.name), duckdb_type(inner)))
                .collect();
            format!("STRUCT({})", nested.join(", "))
        }
    };
    if field.mode == FieldMode::Repeated {
        format!("{base}[]")
    } else {
        base
    }
}

/// Convert the max-aggregate result to epoch seconds.
///
/// TIMESTAMP and DATE values convert by unit, integers pass through,
/// numeric strings parse, NULL means no watermark.
fn value_to_epoch_seconds(column: &str, value: duckdb::types::Value) -> Result<Watermark> {
    use duckdb::types::Value;
    match value {
        Value::Null => Ok(None),
        Value::TinyInt(i) => Ok(Some(i64::from(i))),
        Value::SmallInt(i) => Ok(Some(i64::from(i))),
        Value::Int(i) => Ok(Some(i64::from(i))),
        Value::BigInt(i) => Ok(Some(i)),
        Value::UTinyInt(i) => Ok(Some(i64::from(i))),
        Value::USmallInt(i) => Ok(Some(i64::from(i))),
        Value::UInt(i) => Ok(Some(i64::from(i))),
        Value::UBigInt(i) => Ok(Some(i as i64)),
        Value::Float(f) => Ok(Some(f as i64)),
        Value::Double(f) => Ok(Some(f as i64)),
        Value::Timestamp(unit, v) => Ok(Some(match unit {
            TimeUnit::Second => v,
            TimeUnit::Millisecond => v / 1_000,
            TimeUnit::Microsecond => v / 1_000_000,
            TimeUnit::Nanosecond => v / 1_000_000_000,
        })),
        Value::Date32(days) => Ok(Some(i64::from(days) * 86_400)),
        Value::Text(s) => {
            let parsed = s
                .parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64));
            match parsed {
                Some(v) => Ok(Some(v)),
                None => {
                    warn!(column, value = %s, "watermark column holds a non-numeric string");
                    Err(Error::load(format!(
                        "cannot read watermark from column '{column}': non-numeric value '{s}'"
                    )))
                }
            }
        }
        other => Err(Error::load(format!(
            "cannot read watermark from column '{column}': unsupported type {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimePartitioning;
    use crate::schema::SchemaDescriptor;
    use crate::types::Destination;
    use serde_json::json;

    fn destination(dataset: &str, table: &str) -> Destination {
        Destination {
            project_id: "proj".to_string(),
            dataset_id: dataset.to_string(),
            table_id: table.to_string(),
            location: "US".to_string(),
        }
    }

    fn id_stamp_schema() -> SchemaDescriptor {
        SchemaDescriptor::from_fields(vec![
            FieldDescriptor::new("id", FieldType::Integer),
            FieldDescriptor::new("stamp", FieldType::Integer),
        ])
        .unwrap()
    }

    fn plan_for(
        dataset: &str,
        table: &str,
        schema: SchemaDescriptor,
        write_mode: WriteMode,
    ) -> LoadPlan {
        LoadPlan {
            destination: destination(dataset, table),
            schema,
            write_mode,
            partitioning: None,
            has_new_data: true,
        }
    }

    #[test]
    fn test_ensure_dataset_is_idempotent() {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        assert!(!warehouse.dataset_exists("ds").unwrap());
        warehouse.ensure_dataset("ds").unwrap();
        warehouse.ensure_dataset("ds").unwrap();
        assert!(warehouse.dataset_exists("ds").unwrap());
    }

    #[test]
    fn test_table_exists() {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        warehouse.ensure_dataset("ds").unwrap();
        assert!(!warehouse.table_exists("ds", "tbl").unwrap());

        warehouse
            .conn
            .execute_batch("CREATE TABLE \"ds\".\"tbl\" (\"id\" BIGINT)")
            .unwrap();
        assert!(warehouse.table_exists("ds", "tbl").unwrap());
        assert!(!warehouse.table_exists("other", "tbl").unwrap());
    }

    #[test]
    fn test_max_timestamp_integer_column() {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        warehouse.ensure_dataset("ds").unwrap();
        warehouse
            .conn
            .execute_batch(
                "CREATE TABLE \"ds\".\"tbl\" (\"stamp\" BIGINT);
                 INSERT INTO \"ds\".\"tbl\" VALUES (100), (250), (175);",
            )
            .unwrap();
        assert_eq!(
            warehouse.max_timestamp("ds", "tbl", "stamp").unwrap(),
            Some(250)
        );
    }

    #[test]
    fn test_max_timestamp_timestamp_column_converts_to_epoch() {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        warehouse.ensure_dataset("ds").unwrap();
        warehouse
            .conn
            .execute_batch(
                "CREATE TABLE \"ds\".\"tbl\" (\"stamp\" TIMESTAMP);
                 INSERT INTO \"ds\".\"tbl\" VALUES
                   ('2023-01-05 00:00:00'), ('2023-01-05 06:00:00');",
            )
            .unwrap();
        // 2023-01-05 06:00:00 UTC
        assert_eq!(
            warehouse.max_timestamp("ds", "tbl", "stamp").unwrap(),
            Some(1_672_898_400)
        );
    }

    #[test]
    fn test_max_timestamp_empty_table_is_no_watermark() {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        warehouse.ensure_dataset("ds").unwrap();
        warehouse
            .conn
            .execute_batch("CREATE TABLE \"ds\".\"tbl\" (\"stamp\" BIGINT)")
            .unwrap();
        assert_eq!(warehouse.max_timestamp("ds", "tbl", "stamp").unwrap(), None);
    }

    #[test]
    fn test_load_append_accumulates_rows() {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        warehouse.ensure_dataset("ds").unwrap();
        let plan = plan_for("ds", "tbl", id_stamp_schema(), WriteMode::Append);

        let first = vec![json!({"id": 1, "stamp": 100}), json!({"id": 2, "stamp": 200})];
        assert_eq!(warehouse.load(&plan, &first).unwrap(), 2);

        let second = vec![json!({"id": 3, "stamp": 300})];
        assert_eq!(warehouse.load(&plan, &second).unwrap(), 1);

        let count: i64 = warehouse
            .conn
            .query_row("SELECT count(*) FROM \"ds\".\"tbl\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            warehouse.max_timestamp("ds", "tbl", "stamp").unwrap(),
            Some(300)
        );
    }

    #[test]
    fn test_load_truncate_replaces_rows() {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        warehouse.ensure_dataset("ds").unwrap();

        let append = plan_for("ds", "tbl", id_stamp_schema(), WriteMode::Append);
        warehouse
            .load(&append, &[json!({"id": 1, "stamp": 100})])
            .unwrap();

        let truncate = plan_for("ds", "tbl", id_stamp_schema(), WriteMode::Truncate);
        warehouse
            .load(&truncate, &[json!({"id": 9, "stamp": 900})])
            .unwrap();

        let count: i64 = warehouse
            .conn
            .query_row("SELECT count(*) FROM \"ds\".\"tbl\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            warehouse.max_timestamp("ds", "tbl", "stamp").unwrap(),
            Some(900)
        );
    }

    #[test]
    fn test_load_casts_canonical_dates_into_timestamp_columns() {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        warehouse.ensure_dataset("ds").unwrap();
        let schema = SchemaDescriptor::from_fields(vec![
            FieldDescriptor::new("id", FieldType::Integer),
            FieldDescriptor::new("date", FieldType::Timestamp),
        ])
        .unwrap();
        let plan = plan_for("ds", "tbl", schema, WriteMode::Truncate);

        warehouse
            .load(&plan, &[json!({"id": 1, "date": "2023-01-05 00:00:00"})])
            .unwrap();
        // DATE/TIMESTAMP max converts back to epoch seconds
        assert_eq!(
            warehouse.max_timestamp("ds", "tbl", "date").unwrap(),
            Some(1_672_876_800)
        );
    }

    #[test]
    fn test_load_with_partitioning_metadata() {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        warehouse.ensure_dataset("ds").unwrap();
        let mut plan = plan_for("ds", "tbl", id_stamp_schema(), WriteMode::Append);
        plan.partitioning = Some(TimePartitioning {
            granularity: crate::config::Granularity::Day,
            field: Some("stamp".to_string()),
        });
        // metadata-only; the job itself succeeds unchanged
        assert_eq!(
            warehouse.load(&plan, &[json!({"id": 1, "stamp": 1})]).unwrap(),
            1
        );
    }

    #[test]
    fn test_duckdb_type_mapping() {
        let field = FieldDescriptor::new("name", FieldType::String);
        assert_eq!(duckdb_type(&field), "VARCHAR");

        let repeated =
            FieldDescriptor::new("tags", FieldType::String).with_mode(FieldMode::Repeated);
        assert_eq!(duckdb_type(&repeated), "VARCHAR[]");

        let nested = FieldDescriptor::new("address", FieldType::Record).with_fields(vec![
            FieldDescriptor::new("city", FieldType::String),
            FieldDescriptor::new("zip", FieldType::Integer),
        ]);
        assert_eq!(
            duckdb_type(&nested),
            "STRUCT(\"city\" VARCHAR, \"zip\" BIGINT)"
        );
    }

    #[test]
    fn test_ddl_marks_required_columns() {
        let fields = vec![
            FieldDescriptor::new("id", FieldType::Integer).with_mode(FieldMode::Required),
            FieldDescriptor::new("name", FieldType::String),
        ];
        assert_eq!(
            ddl_columns(&fields),
            "\"id\" BIGINT NOT NULL, \"name\" VARCHAR"
        );
    }

    #[test]
    fn test_quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
