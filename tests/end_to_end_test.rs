use anyhow::Result;
use httpmock::prelude::*;
use parcel_extract::core::ConfigProvider;
use parcel_extract::utils::validation::Validate;
use parcel_extract::{
    BatchOrchestrator, ExtractEngine, ExtractError, ExtractPipeline, LayerTables, LocalStorage,
    PlanningApiClient, TomlConfig,
};
use serde_json::json;
use std::io::Read;
use std::sync::Arc;
use tempfile::TempDir;

const IMS_REGISTER: &str = r#"[
    {"id": 5, "name": "Flood hazard area - Local Government flood mapping area"},
    {"id": 7, "name": "Local heritage place"}
]"#;

const DAMS_REGISTER: &str = r#"[
    {"id": 12, "name": "Bushfire prone area"}
]"#;

struct Fixture {
    temp_dir: TempDir,
    config: TomlConfig,
}

fn fixture(server: &MockServer, parcels: &[&str], formats: &str, compress: bool) -> Result<Fixture> {
    let temp_dir = TempDir::new()?;
    let ims_path = temp_dir.path().join("layers_rep_IMS.txt");
    let dams_path = temp_dir.path().join("layers_rep_DAMS.txt");
    std::fs::write(&ims_path, IMS_REGISTER)?;
    std::fs::write(&dams_path, DAMS_REGISTER)?;

    let normalized = |p: &std::path::Path| p.to_string_lossy().replace('\\', "/");
    let parcel_list = parcels
        .iter()
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join(", ");

    let content = format!(
        r#"
[extract]
name = "e2e"
parcels = [{parcels}]

[api]
base_url = "{base_url}"
timeout_seconds = 5

[layers]
ims = "{ims}"
dams = "{dams}"

[output]
path = "{output}"
formats = {formats}
compress = {compress}
"#,
        parcels = parcel_list,
        base_url = server.base_url(),
        ims = normalized(&ims_path),
        dams = normalized(&dams_path),
        output = normalized(&temp_dir.path().join("out")),
        formats = formats,
        compress = compress,
    );

    let config = TomlConfig::from_toml_str(&content)?;
    config.validate()?;
    Ok(Fixture { temp_dir, config })
}

async fn engine_for(
    config: TomlConfig,
) -> Result<ExtractEngine<ExtractPipeline<PlanningApiClient, LocalStorage, TomlConfig>>> {
    let tables = LayerTables::load(
        &LocalStorage::current_dir(),
        config.ims_layers_path(),
        config.dams_layers_path(),
    )
    .await?;
    let api = PlanningApiClient::with_extra_headers(
        config.api_base_url(),
        config.request_timeout(),
        &config.extra_headers(),
    )?;
    let orchestrator = BatchOrchestrator::new(Arc::new(api), Arc::new(tables));
    let storage = LocalStorage::new(config.output_path().to_string());
    Ok(ExtractEngine::new(ExtractPipeline::new(orchestrator, storage, config)))
}

fn mock_parcel(server: &MockServer, lot_plan: &str, suburb: &str) {
    let lot_plan = lot_plan.to_string();
    let suburb = suburb.to_string();
    server.mock(move |when, then| {
        when.method(POST)
            .path("/api/v1/lot_plan_geo/")
            .json_body(json!({"search_term_multiple": lot_plan}));
        then.status(200).json_body(json!({
            "features": [{
                "attributes": {
                    "LOT_PLAN": lot_plan,
                    "ADDRESS": "1 Example Rd",
                    "LOCALITY": suburb,
                    "LGA_NAME": "Moreton Bay",
                    "LOT_AREA": 607,
                    "TENURE": "Freehold"
                },
                "geometry": {"rings": [[[153.0, -27.0]]], "lot": lot_plan}
            }]
        }));
    });
}

#[tokio::test]
async fn test_end_to_end_extract_to_zip() -> Result<()> {
    let server = MockServer::start();
    mock_parcel(&server, "2SP335900", "MANGO HILL");
    mock_parcel(&server, "3SP335900", "NORTH LAKES");

    // 2SP335900 intersects flood + heritage; 3SP335900 an unregistered layer.
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/spp_intersect/")
            .body_contains("\"lot\":\"2SP335900\"");
        then.status(200).json_body(json!({"layerList": [5, 7]}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/spp_intersect/")
            .body_contains("\"lot\":\"3SP335900\"");
        then.status(200).json_body(json!({"layerList": [99]}));
    });
    let dams = server.mock(|when, then| {
        when.method(POST).path("/api/v1/dams_intersect/");
        then.status(200).json_body(json!({"layerList": [12]}));
    });
    let missing = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/lot_plan_geo/")
            .json_body(json!({"search_term_multiple": "1RP12345"}));
        then.status(200).json_body(json!({"features": []}));
    });

    let fx = fixture(
        &server,
        &["2SP335900", " ", "1RP12345", "3SP335900"],
        r#"["csv", "tsv", "json", "xlsx"]"#,
        true,
    )?;
    let output = engine_for(fx.config.clone()).await?.run().await?;

    assert!(output.ends_with("out/planning_extract.zip"));
    dams.assert_hits(2);
    missing.assert();

    let zip_path = fx.temp_dir.path().join("out/planning_extract.zip");
    let mut archive = zip::ZipArchive::new(std::fs::File::open(zip_path)?)?;
    assert_eq!(archive.len(), 4);
    assert!(archive.by_name("planning_extract.xlsx")?.size() > 0);

    let mut csv = String::new();
    archive.by_name("planning_extract.csv")?.read_to_string(&mut csv)?;
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(
        lines[0],
        "Parcel Number,Lot Plan,Address,Suburb,LGA,Area,Tenure,Overlays,Error"
    );
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[1],
        "2SP335900,2SP335900,1 Example Rd,MANGO HILL,Moreton Bay,607,Freehold,\
Flood hazard area - Local Government flood mapping area / Local heritage place / Bushfire prone area,"
    );
    assert_eq!(lines[2], "1RP12345,,,,,,,,No parcel found for identifier '1RP12345'");
    assert_eq!(
        lines[3],
        "3SP335900,3SP335900,1 Example Rd,NORTH LAKES,Moreton Bay,607,Freehold,Unknown 99 / Bushfire prone area,"
    );

    let mut json_report = String::new();
    archive
        .by_name("planning_extract.json")?
        .read_to_string(&mut json_report)?;
    let report: serde_json::Value = serde_json::from_str(&json_report)?;
    assert_eq!(report["total"], 3);
    assert_eq!(report["succeeded"], 2);
    assert_eq!(report["failed"], 1);

    Ok(())
}

#[tokio::test]
async fn test_overlay_failure_marks_whole_parcel_failed() -> Result<()> {
    let server = MockServer::start();
    mock_parcel(&server, "2SP335900", "MANGO HILL");
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/spp_intersect/");
        then.status(200).json_body(json!({"layerList": [5]}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/dams_intersect/");
        then.status(500);
    });

    let fx = fixture(&server, &["2SP335900"], r#"["csv"]"#, false)?;
    let output = engine_for(fx.config.clone()).await?.run().await?;

    assert!(output.ends_with("out/planning_extract.csv"));
    let csv = std::fs::read_to_string(fx.temp_dir.path().join("out/planning_extract.csv"))?;
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "Parcel Number,Error");
    assert!(lines[1].starts_with("2SP335900,DAMS overlay lookup failed"));
    assert!(!csv.contains("MANGO HILL"));

    Ok(())
}

#[test]
fn test_repeated_format_is_rejected_before_any_request() {
    let server = MockServer::start();
    let any_call = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!({}));
    });

    let err = fixture(&server, &["2SP335900"], r#"["csv", "csv"]"#, true)
        .err()
        .expect("duplicate formats must fail validation");

    assert!(err.to_string().contains("listed more than once"));
    any_call.assert_hits(0);
}

#[tokio::test]
async fn test_blank_batch_is_rejected() -> Result<()> {
    let server = MockServer::start();
    let any_call = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!({}));
    });

    let fx = fixture(&server, &["", "   "], r#"["csv"]"#, false)?;
    let err = engine_for(fx.config.clone()).await?.run().await.unwrap_err();

    assert!(matches!(err, ExtractError::EmptyInput));
    any_call.assert_hits(0);
    assert!(!fx.temp_dir.path().join("out").exists());

    Ok(())
}
