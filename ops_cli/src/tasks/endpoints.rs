//! Endpoint smoke-tester — probes every backend service and reports
//! reachability for the chosen environment.
//!
//! Locally every service listens on its own port; in production they all
//! sit behind one public base URL.

use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

const LOCAL_BASE: &str = "http://localhost";
const PROD_BASE: &str = "https://api.brightbudget.app";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One entry in the static service table.
struct ServiceDef {
    name: &'static str,
    port: u16,
    path: &'static str,
    method: &'static str,
}

const SERVICES: &[ServiceDef] = &[
    ServiceDef { name: "google_auth", port: 8081, path: "/auth/google", method: "GET" },
    ServiceDef { name: "signup", port: 8082, path: "/signup/check-email", method: "POST" },
    ServiceDef { name: "language", port: 8083, path: "/language/get", method: "GET" },
    ServiceDef { name: "signin", port: 8084, path: "/signin/check-email", method: "POST" },
    ServiceDef { name: "dashboard", port: 8085, path: "/health", method: "GET" },
    ServiceDef { name: "reset_password", port: 8086, path: "/reset-password/check-email", method: "POST" },
    ServiceDef { name: "dashboard_data", port: 8087, path: "/dashboard/data", method: "GET" },
    ServiceDef { name: "budget", port: 8088, path: "/budget/fetch", method: "GET" },
    ServiceDef { name: "savings", port: 8089, path: "/savings/health", method: "GET" },
    ServiceDef { name: "cash_bank", port: 8090, path: "/cash-bank/distribution", method: "GET" },
    ServiceDef { name: "bills", port: 8091, path: "/bills", method: "GET" },
    ServiceDef { name: "profile", port: 8092, path: "/profile/ping", method: "GET" },
    ServiceDef { name: "income", port: 8093, path: "/incomes", method: "GET" },
    ServiceDef { name: "expense", port: 8094, path: "/expenses", method: "GET" },
    ServiceDef { name: "transaction_delete", port: 8095, path: "/transactions/delete", method: "POST" },
    ServiceDef { name: "categories", port: 8096, path: "/categories", method: "GET" },
    ServiceDef { name: "money_flow", port: 8097, path: "/money-flow/data", method: "GET" },
    ServiceDef { name: "budget_overview", port: 8098, path: "/budget-overview", method: "GET" },
    // transfer endpoints share the cash_bank service port
    ServiceDef { name: "cash_to_bank", port: 8090, path: "/transfer/cash-to-bank", method: "POST" },
    ServiceDef { name: "bank_to_cash", port: 8090, path: "/transfer/bank-to-cash", method: "POST" },
];

#[derive(Debug, Serialize)]
struct ProbeRecord {
    name: String,
    status: String,
    response_code: Option<u16>,
    response_time_ms: Option<f64>,
    error: Option<String>,
    url: String,
    timestamp: String,
}

pub async fn run(environment: &str) -> eyre::Result<String> {
    eyre::ensure!(
        environment == "local" || environment == "production",
        "unknown environment '{environment}' (expected local or production)"
    );

    let base = if environment == "local" { LOCAL_BASE } else { PROD_BASE };
    println!("Testing {environment} environment ({base})");
    println!("{}", "-".repeat(60));

    let client = reqwest::Client::new();
    let mut records = Vec::with_capacity(SERVICES.len());

    for service in SERVICES {
        let record = probe(&client, environment, service).await;
        println!(
            "{:<16} {:<20} {:<4} {:>8} {}",
            record.status,
            record.name,
            record
                .response_code
                .map_or("-".to_string(), |c| c.to_string()),
            record
                .response_time_ms
                .map_or("-".to_string(), |t| format!("{t:.0}ms")),
            record.error.as_deref().unwrap_or(""),
        );
        records.push(record);
    }

    let total = records.len();
    let success = records.iter().filter(|r| r.status == "success").count();
    let errors = records
        .iter()
        .filter(|r| r.status == "server_error" || r.status == "error")
        .count();
    let not_found = records.iter().filter(|r| r.status == "not_found").count();
    let connection_errors = records
        .iter()
        .filter(|r| r.status == "connection_error")
        .count();
    let success_rate = (success as f64 * 1000.0 / total as f64).round() / 10.0;

    println!("{}", "-".repeat(60));
    println!("Total: {total}  OK: {success}  Errors: {errors}  Not found: {not_found}  Unreachable: {connection_errors}");
    println!("Success rate: {success_rate}%");

    let critical: Vec<&ProbeRecord> = records
        .iter()
        .filter(|r| r.status == "server_error" || r.status == "not_found")
        .collect();
    if !critical.is_empty() {
        println!("\nCritical issues:");
        for record in &critical {
            println!(
                "  {}: {} ({})",
                record.name,
                record.error.as_deref().unwrap_or("unknown"),
                record.url
            );
        }
    }

    let summary = json!({
        "environment": environment,
        "total_endpoints": total,
        "successful": success,
        "errors": errors,
        "not_found": not_found,
        "connection_errors": connection_errors,
        "success_rate": success_rate,
        "timestamp": Utc::now().to_rfc3339(),
        "details": records,
    });
    let filename = format!(
        "endpoint_validation_{}_{}.json",
        environment,
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    std::fs::write(&filename, serde_json::to_string_pretty(&summary)?)?;

    Ok(format!(
        "[endpoints] {success}/{total} reachable ({success_rate}%), results saved to {filename}"
    ))
}

async fn probe(client: &reqwest::Client, environment: &str, service: &ServiceDef) -> ProbeRecord {
    let url = if environment == "local" {
        format!("{LOCAL_BASE}:{}{}", service.port, service.path)
    } else {
        format!("{PROD_BASE}{}", service.path)
    };

    let mut request = match service.method {
        "POST" => client.post(&url),
        _ => client.get(&url),
    };
    if service.method == "POST" {
        if let Some(body) = request_body(service.name) {
            request = request.json(&body);
        }
    } else if wants_user_id(service.name) {
        request = request.query(&[("user_id", "test_user")]);
    }

    let started = Instant::now();
    let sent = request.timeout(REQUEST_TIMEOUT).send().await;
    let elapsed_ms = (started.elapsed().as_secs_f64() * 100_000.0).round() / 100.0;

    let mut record = ProbeRecord {
        name: service.name.to_string(),
        status: "unknown".to_string(),
        response_code: None,
        response_time_ms: None,
        error: None,
        url,
        timestamp: Utc::now().to_rfc3339(),
    };

    match sent {
        Ok(response) => {
            let code = response.status().as_u16();
            record.response_code = Some(code);
            record.response_time_ms = Some(elapsed_ms);
            record.status = classify(code).to_string();
            record.error = error_text(code);
        }
        Err(e) if e.is_timeout() => {
            record.status = "timeout".to_string();
            record.error = Some("Request timeout".to_string());
        }
        Err(e) if e.is_connect() => {
            record.status = "connection_error".to_string();
            record.error = Some("Service not running or unreachable".to_string());
        }
        Err(e) => {
            record.status = "error".to_string();
            record.error = Some(e.to_string());
        }
    }

    record
}

fn classify(code: u16) -> &'static str {
    match code {
        200 => "success",
        404 => "not_found",
        500 => "server_error",
        400 | 422 => "client_error",
        _ => "error",
    }
}

fn error_text(code: u16) -> Option<String> {
    match code {
        200 => None,
        404 => Some("Endpoint not found".to_string()),
        500 => Some("Internal server error".to_string()),
        400 | 422 => Some("Bad request/validation error".to_string()),
        _ => Some(format!("HTTP {code}")),
    }
}

/// Synthetic request payloads for endpoints that need one.
fn request_body(name: &str) -> Option<serde_json::Value> {
    match name {
        "signup" | "signin" | "reset_password" => Some(json!({"email": "test@example.com"})),
        "cash_to_bank" => Some(json!({
            "user_id": "test_user",
            "amount": 100.0,
            "date": Utc::now().to_rfc3339(),
        })),
        "bank_to_cash" => Some(json!({
            "user_id": "test_user",
            "amount": 50.0,
            "date": Utc::now().to_rfc3339(),
        })),
        "transaction_delete" => Some(json!({
            "user_id": "test_user",
            "transaction_id": "test_transaction",
        })),
        _ => None,
    }
}

/// Data-fetch GETs that expect a user scope.
fn wants_user_id(name: &str) -> bool {
    matches!(name, "dashboard_data" | "cash_bank" | "budget" | "savings")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_classify_like_the_report_expects() {
        assert_eq!(classify(200), "success");
        assert_eq!(classify(404), "not_found");
        assert_eq!(classify(500), "server_error");
        assert_eq!(classify(400), "client_error");
        assert_eq!(classify(422), "client_error");
        assert_eq!(classify(503), "error");
    }

    #[test]
    fn error_text_matches_classification() {
        assert_eq!(error_text(200), None);
        assert_eq!(error_text(503), Some("HTTP 503".to_string()));
    }

    #[test]
    fn check_email_services_get_a_synthetic_email() {
        for name in ["signup", "signin", "reset_password"] {
            let body = request_body(name).unwrap();
            assert_eq!(body["email"], "test@example.com");
        }
        assert!(request_body("bills").is_none());
    }

    #[test]
    fn data_fetch_gets_are_user_scoped() {
        assert!(wants_user_id("budget"));
        assert!(!wants_user_id("profile"));
    }
}
