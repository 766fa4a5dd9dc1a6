//! Pipeline orchestration tests against a mock source and an in-memory
//! warehouse

use super::*;
use crate::config::{AuthMode, PipelineConfig, RawPipelineConfig};
use crate::load::LoadPlan;
use crate::schema::{FieldDescriptor, FieldType, SchemaDescriptor};
use crate::types::WriteMode;
use crate::warehouse::{DuckDbWarehouse, Warehouse as _};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCHEMA_JSON: &str = "[\
    {\"name\": \"id\", \"field_type\": \"INTEGER\"}, \
    {\"name\": \"stamp\", \"field_type\": \"INTEGER\"}, \
    {\"name\": \"date\", \"field_type\": \"TIMESTAMP\"}]";

fn schema_dir(topic: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join(format!("{topic}.json"))).unwrap();
    write!(file, "{SCHEMA_JSON}").unwrap();
    dir
}

fn config(url: &str, topic: &str, write_disposition: &str, dir: &TempDir) -> PipelineConfig {
    let raw = RawPipelineConfig {
        url: url.to_string(),
        method: "GET".to_string(),
        headers: "{}".to_string(),
        body: None,
        url_type: "equal_based".to_string(),
        filter_params: "{}".to_string(),
        paginations: "false".to_string(),
        topic: topic.to_string(),
        timestamp_column: "stamp".to_string(),
        date_columns: "[\"date\"]".to_string(),
        project_id: "proj".to_string(),
        dataset_id: "ds".to_string(),
        table_id: "tbl".to_string(),
        location: "US".to_string(),
        temp_table: "false".to_string(),
        write_disposition: write_disposition.to_string(),
        time_partitioning: "{}".to_string(),
        schema_dir: dir.path().to_path_buf(),
    };
    PipelineConfig::from_raw(raw, AuthMode::None).unwrap()
}

/// Materialize proj.ds.tbl with the given rows, bypassing the pipeline.
fn seed(warehouse: &DuckDbWarehouse, rows: &[serde_json::Value]) {
    let plan = LoadPlan {
        destination: crate::types::Destination {
            project_id: "proj".to_string(),
            dataset_id: "ds".to_string(),
            table_id: "tbl".to_string(),
            location: "US".to_string(),
        },
        schema: SchemaDescriptor::from_fields(vec![
            FieldDescriptor::new("id", FieldType::Integer),
            FieldDescriptor::new("stamp", FieldType::Integer),
            FieldDescriptor::new("date", FieldType::Timestamp),
        ])
        .unwrap(),
        write_mode: WriteMode::Append,
        partitioning: None,
        has_new_data: true,
    };
    warehouse.ensure_dataset("ds").unwrap();
    warehouse.load(&plan, rows).unwrap();
}

#[tokio::test]
async fn test_truncate_run_normalizes_dates_and_loads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "date": "2023-01-05"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = schema_dir("topic2");
    let config = config(&format!("{}/data", server.uri()), "topic2", "WRITE_TRUNCATE", &dir);
    let warehouse = DuckDbWarehouse::open_in_memory().unwrap();

    let summary = Pipeline::new(&config, &warehouse).run().await.unwrap();

    assert_eq!(summary.records_fetched, 1);
    assert_eq!(summary.records_transformed, 1);
    assert_eq!(summary.records_loaded, 1);
    assert_eq!(summary.destination, "proj.ds.tbl");
    assert_eq!(summary.watermark, None);

    // the canonical date string landed as 2023-01-05 00:00:00 UTC
    assert_eq!(
        warehouse.max_timestamp("ds", "tbl", "date").unwrap(),
        Some(1_672_876_800)
    );
}

#[tokio::test]
async fn test_zero_fetch_skips_transform_and_load() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = schema_dir("topic2");
    let config = config(&format!("{}/data", server.uri()), "topic2", "WRITE_APPEND", &dir);
    let warehouse = DuckDbWarehouse::open_in_memory().unwrap();

    let summary = Pipeline::new(&config, &warehouse).run().await.unwrap();

    assert_eq!(summary.records_fetched, 0);
    assert_eq!(summary.records_loaded, 0);
    assert!(summary.is_no_new_records());

    // the load job never ran, so the table was never created
    assert!(!warehouse.table_exists("ds", "tbl").unwrap());
}

#[tokio::test]
async fn test_incremental_run_appends_past_the_watermark() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": 3, "stamp": 150, "date": "2023-01-03"},
                {"id": 4, "stamp": 250, "date": "2023-01-04"},
                {"id": 5, "stamp": 300, "date": "2023-01-05"},
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = schema_dir("topic1");
    let config = config(&format!("{}/data", server.uri()), "topic1", "WRITE_APPEND", &dir);
    let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
    seed(
        &warehouse,
        &[
            json!({"id": 1, "stamp": 100, "date": "2023-01-01 00:00:00"}),
            json!({"id": 2, "stamp": 200, "date": "2023-01-02 00:00:00"}),
        ],
    );

    let summary = Pipeline::new(&config, &warehouse).run().await.unwrap();

    // watermark 200 keeps only stamps 250 and 300
    assert_eq!(summary.watermark, Some(200));
    assert_eq!(summary.records_fetched, 3);
    assert_eq!(summary.records_transformed, 2);
    assert_eq!(summary.records_loaded, 2);

    assert_eq!(
        warehouse.max_timestamp("ds", "tbl", "stamp").unwrap(),
        Some(300)
    );
}

#[tokio::test]
async fn test_everything_behind_watermark_is_no_new_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "stamp": 100, "date": "2023-01-01"}]
        })))
        .mount(&server)
        .await;

    let dir = schema_dir("topic1");
    let config = config(&format!("{}/data", server.uri()), "topic1", "WRITE_APPEND", &dir);
    let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
    seed(&warehouse, &[json!({"id": 9, "stamp": 500, "date": null})]);

    let summary = Pipeline::new(&config, &warehouse).run().await.unwrap();

    assert_eq!(summary.records_fetched, 1);
    assert_eq!(summary.records_transformed, 0);
    assert_eq!(summary.records_loaded, 0);
    assert!(summary.is_no_new_records());

    // nothing was appended behind the watermark
    assert_eq!(
        warehouse.max_timestamp("ds", "tbl", "stamp").unwrap(),
        Some(500)
    );
}
