// src/lambda/mod.rs

//! AWS Lambda handler for the bill watcher.
//!
//! Each invocation runs exactly one poll cycle. Scheduling is left to the
//! trigger (e.g. an EventBridge rule).

use lambda_runtime::{Error as LambdaError, LambdaEvent};

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{CycleReport, run_once};

/// Environment variable naming a TOML config file bundled with the function.
pub const CONFIG_PATH_ENV: &str = "BILLWATCH_CONFIG";

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct CycleRequest {
    /// Poll this feed instead of the configured one
    #[serde(default)]
    pub feed_url: Option<String>,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct CycleResponse {
    /// Whether the cycle ran to completion
    pub success: bool,

    /// Cycle summary, absent when the cycle was aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CycleReport>,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<CycleRequest>,
) -> std::result::Result<CycleResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting poll cycle: feed_url={:?}", request.feed_url);

    let outcome = match load_lambda_config(&request) {
        Ok(config) => run_once(&config).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => {
            let execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                "Cycle completed: {} fetched, {} logged, {} notified in {}ms",
                report.fetched, report.logged, report.notified, execution_time_ms
            );
            Ok(CycleResponse {
                success: true,
                report: Some(report),
                error: None,
                execution_time_ms,
            })
        }
        Err(e) => {
            error!("Cycle failed: {}", e);
            Ok(CycleResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

/// Load configuration suitable for Lambda environment.
fn load_lambda_config(request: &CycleRequest) -> Result<Config> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => Config::load(&path)?,
        Err(_) => Config::default(),
    };
    config.apply_env_overrides();

    if let Some(url) = &request.feed_url {
        config.feed.url = url.clone();
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_request_defaults() {
        let req: CycleRequest = serde_json::from_str("{}").unwrap();
        assert!(req.feed_url.is_none());
    }

    #[test]
    fn test_cycle_request_with_feed() {
        let json = r#"{"feed_url": "https://example.com/bills.xml"}"#;
        let req: CycleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.feed_url.as_deref(), Some("https://example.com/bills.xml"));
    }

    #[test]
    fn test_failed_response_omits_report() {
        let response = CycleResponse {
            error: Some("Fetch error: HTTP 503".to_string()),
            execution_time_ms: 12,
            ..Default::default()
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("report").is_none());
        assert_eq!(json["execution_time_ms"], 12);
    }
}
