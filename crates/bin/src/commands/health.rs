//! Health check command - checks a running Feedback server.

use std::time::Duration;

use serde::Deserialize;

use crate::cli::HealthArgs;

/// Body of `GET /health`
#[derive(Debug, Deserialize)]
struct HealthReport {
    status: String,
    #[serde(default)]
    backend: String,
}

/// Accept either the server's base URL or the full `/health` URL.
fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

async fn check(url: &str, timeout: Duration) -> Result<HealthReport, String> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| e.to_string())?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("failed to connect to {url}: {e}"))?;
    if !response.status().is_success() {
        return Err(format!("server returned HTTP status {}", response.status()));
    }

    let report: HealthReport = response
        .json()
        .await
        .map_err(|e| format!("unreadable health response: {e}"))?;
    if report.status != "healthy" {
        return Err(format!("server returned status {}", report.status));
    }
    Ok(report)
}

/// Run the health check command. Exits with status 1 when the server is unhealthy.
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url);

    match check(&url, Duration::from_secs(args.timeout)).await {
        Ok(report) => {
            println!("healthy ({} backend)", report.backend);
            Ok(())
        }
        Err(reason) => {
            eprintln!("unhealthy: {reason}");
            std::process::exit(1);
        }
    }
}
