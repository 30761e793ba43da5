use market_insight::data::{parse_date, CropQuery, MarketQuery};
use market_insight::export::{DatasetKind, ExportFormat};
use market_insight::notifications::CustomAlertRequest;
use market_insight::recommend::SoilConditions;
use market_insight::{ApiResponse, AppConfig, MarketError, MarketService, Result};
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::process::ExitCode;
use std::str::FromStr;

const USAGE: &str = "Usage: agri_market <command> [--flag value ...]

Commands:
  setup                 Generate missing data files and train models
  generate              Regenerate the synthetic datasets
  train                 Train per-crop price models
  status | health       Service state
  market-data           --crop --start YYYY-MM-DD --end YYYY-MM-DD
  crop-data             --crop --region
  market                --crop
  analyze               --crop --region
  predict               --crop [--days]
  recommend             --temperature --humidity --ph --rainfall [--n --p --k]
  weather               [--location]
  weather-forecast      [--location] [--days]
  weather-impact        [--location] [--crop]
  insights              [--crop] [--days]
  performance           [--region]
  predictions           [--crop] [--days]
  notifications         [--user] [--limit] [--read ID]
  alerts                [--location] [--crop] [--summary]
  create-alert          --field price|temperature --operator OP --threshold X [--crop] [--user]
  export                [--type market|crop] [--format csv|json]";

/// Command-line arguments after the command name
struct Args {
    args: Vec<String>,
}

impl Args {
    fn value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(|s| s.as_str())
    }

    fn has(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    fn parse<T: FromStr>(&self, flag: &str) -> Result<Option<T>> {
        match self.value(flag) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                MarketError::InvalidParameter(format!("{} expects a number, got '{}'", flag, raw))
            }),
        }
    }

    fn required<T: FromStr>(&self, flag: &str) -> Result<T> {
        self.parse(flag)?
            .ok_or_else(|| MarketError::InvalidParameter(format!("{} is required", flag)))
    }
}

fn to_value<T: Serialize>(result: Result<T>) -> Result<Value> {
    result.and_then(|data| Ok(serde_json::to_value(data)?))
}

fn run(command: &str, args: &Args, config: AppConfig) -> Result<Value> {
    match command {
        "setup" => to_value(MarketService::setup(&config)),
        "generate" => to_value(MarketService::generate(&config).map(|(crops, market)| {
            serde_json::json!({"crop_records": crops, "market_records": market})
        })),
        "train" => to_value(MarketService::load(config).train()),
        _ => {
            let service = MarketService::load(config);
            dispatch(&service, command, args)
        }
    }
}

fn dispatch(service: &MarketService, command: &str, args: &Args) -> Result<Value> {
    let crop = args.value("--crop");
    let region = args.value("--region");
    let location = args.value("--location");

    match command {
        "status" => to_value(Ok(service.status())),
        "health" => to_value(Ok(service.health())),
        "market-data" => {
            let query = MarketQuery {
                crop_type: crop.map(str::to_string),
                start_date: args.value("--start").map(parse_date).transpose()?,
                end_date: args.value("--end").map(parse_date).transpose()?,
            };
            to_value(Ok(service.market_data(&query)))
        }
        "crop-data" => {
            let query = CropQuery {
                crop_type: crop.map(str::to_string),
                region: region.map(str::to_string),
            };
            to_value(Ok(service.crop_data(&query)))
        }
        "market" => to_value(Ok(service.market(crop))),
        "analyze" => to_value(Ok(service.analyze(crop, region))),
        "predict" => {
            let crop = crop.ok_or_else(|| {
                MarketError::InvalidParameter("--crop is required".to_string())
            })?;
            to_value(service.predict(crop, args.parse("--days")?))
        }
        "recommend" => {
            let conditions = SoilConditions {
                n: args.parse("--n")?.unwrap_or(0.0),
                p: args.parse("--p")?.unwrap_or(0.0),
                k: args.parse("--k")?.unwrap_or(0.0),
                temperature: args.required("--temperature")?,
                humidity: args.required("--humidity")?,
                ph: args.required("--ph")?,
                rainfall: args.required("--rainfall")?,
            };
            to_value(Ok(service.recommend(&conditions)))
        }
        "weather" => to_value(Ok(service.weather(location))),
        "weather-forecast" => {
            let days = args.parse("--days")?.unwrap_or(7);
            to_value(Ok(service.weather_forecast(location, days)))
        }
        "weather-impact" => {
            to_value(Ok(service.weather_impact(location, crop.unwrap_or("wheat"))))
        }
        "insights" => to_value(service.insights(crop, args.parse("--days")?)),
        "performance" => to_value(service.performance(region)),
        "predictions" => {
            let days = args.parse("--days")?.unwrap_or(30);
            to_value(service.predictions(crop.unwrap_or("wheat"), days))
        }
        "notifications" => {
            let user = args.value("--user").unwrap_or("default");
            let limit = args.parse("--limit")?.unwrap_or(10);
            let mut notifications = service.notifications(user, limit);
            if let Some(id) = args.parse::<u64>("--read")? {
                service.mark_read(id)?;
                notifications = service.notifications(user, limit);
            }
            to_value(Ok(notifications))
        }
        "alerts" => {
            let crop = crop.unwrap_or("wheat");
            if args.has("--summary") {
                to_value(Ok(service.daily_summary(location, crop)))
            } else {
                to_value(Ok(service.alerts(location, crop)))
            }
        }
        "create-alert" => {
            let request = CustomAlertRequest {
                field: args.value("--field").unwrap_or("price").to_string(),
                operator: args.value("--operator").unwrap_or(">").to_string(),
                threshold: args.required("--threshold")?,
                crop_type: crop.map(str::to_string),
            };
            let user = args.value("--user").unwrap_or("default");
            let created = service.create_alert(user, &request)?;
            let triggered = service.check_custom_alerts(location);
            to_value(Ok(serde_json::json!({"alert": created, "triggered": triggered})))
        }
        "export" => {
            let kind: DatasetKind = args.value("--type").unwrap_or("market").parse()?;
            let format: ExportFormat = args.value("--format").unwrap_or("csv").parse()?;
            to_value(service.export(kind, format))
        }
        other => Err(MarketError::InvalidParameter(format!(
            "unknown command '{}'",
            other
        ))),
    }
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let mut argv = env::args().skip(1);
    let Some(command) = argv.next() else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };
    if command == "--help" || command == "-h" {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let args = Args {
        args: argv.collect(),
    };
    let config = AppConfig::from_env();
    log::debug!("Running {} with {:?}", command, config);

    let response = ApiResponse::from_result(run(&command, &args, config));
    let success = response.success;
    match serde_json::to_string_pretty(&response) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("failed to encode response: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
