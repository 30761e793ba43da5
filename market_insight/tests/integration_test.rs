use market_insight::export::{DatasetKind, ExportFormat};
use market_insight::recommend::SoilConditions;
use market_insight::{ApiResponse, AppConfig, ForecastMethod, MarketService};
use pretty_assertions::assert_eq;

fn seeded_config(root: &std::path::Path) -> AppConfig {
    AppConfig {
        random_seed: Some(2024),
        ..AppConfig::with_root(root)
    }
}

#[test]
fn test_setup_generates_and_trains() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(dir.path());

    let report = MarketService::setup(&config).unwrap();
    assert!(report.data_generated);
    assert_eq!(report.crop_records, 120);
    assert_eq!(report.models_trained, 5);

    let again = MarketService::setup(&config).unwrap();
    assert!(!again.data_generated);
    assert_eq!(again.models_trained, 0);

    let service = MarketService::load(config);
    let status = service.status();
    assert!(status.data_available);
    assert_eq!(status.models_loaded, 5);

    let forecast = service.predict("wheat", Some(14)).unwrap();
    assert_eq!(forecast.method, ForecastMethod::MlModel);
    assert_eq!(forecast.len(), 14);
}

#[test]
fn test_service_workflow_without_models() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(dir.path());
    MarketService::generate(&config).unwrap();

    let service = MarketService::load(config);
    let forecast = service.predict("rice", None).unwrap();
    assert_eq!(forecast.method, ForecastMethod::SimpleForecast);
    assert_eq!(forecast.len(), 30);

    let insights = service.insights(Some("wheat"), None).unwrap();
    assert_eq!(insights.summary.unwrap().volume, 30);

    let predictions = service.predictions("corn", 30).unwrap();
    assert!((30.0..=95.0).contains(&predictions.confidence));

    let performance = service.performance(Some("north")).unwrap();
    assert_eq!(performance.len(), 5);

    let overview = service.market(None);
    assert_eq!(overview.latest_prices.len(), 5);
    assert_eq!(overview.data.len(), 30);

    let analysis = service.analyze(Some("barley"), None);
    assert_eq!(analysis.records_analyzed, 1461);
}

#[test]
fn test_error_envelope_for_unknown_crop() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(dir.path());
    MarketService::generate(&config).unwrap();
    let service = MarketService::load(config);

    let response = ApiResponse::from_result(service.predict("quinoa", Some(5)));
    assert!(!response.success);
    assert_eq!(response.error_kind.as_deref(), Some("missing_data"));
}

#[test]
fn test_export_and_recommend() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(dir.path());
    MarketService::generate(&config).unwrap();
    let service = MarketService::load(config);

    let export = service.export(DatasetKind::Crop, ExportFormat::Csv).unwrap();
    let text = export.data.as_str().unwrap();
    assert!(text.starts_with("year,crop_type,region,production,yield\n"));
    assert_eq!(text.lines().count(), 121);

    let json = service.export(DatasetKind::Market, ExportFormat::Json).unwrap();
    assert_eq!(json.data.as_array().unwrap().len(), 1461 * 5);

    let suggestions = service.recommend(&SoilConditions {
        temperature: 28.0,
        humidity: 75.0,
        ph: 6.0,
        rainfall: 220.0,
        ..Default::default()
    });
    let crops: Vec<&str> = suggestions.iter().map(|s| s.crop.as_str()).collect();
    assert_eq!(crops, vec!["Rice", "Corn"]);
}
