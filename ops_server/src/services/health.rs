//! Post-deployment health verification — sequential probes over the
//! configured endpoints, aggregated into a tiered verdict.
//!
//! The verdict is observational: it is logged at a severity matching its
//! tier but never changes the deployment run's terminal status or the HTTP
//! response already owed to the webhook sender.

use std::time::{Duration, Instant};

use crate::models::health::{HealthEndpoint, HealthSummary, ProbeMethod, ProbeResult, Verdict};

/// Per-probe ceiling.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HealthVerifier {
    client: reqwest::Client,
}

impl HealthVerifier {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Probe every endpoint in order. A failing probe never aborts the
    /// sweep; the full list always runs.
    pub async fn check(&self, endpoints: &[HealthEndpoint]) -> HealthSummary {
        let mut probes = Vec::with_capacity(endpoints.len());

        for endpoint in endpoints {
            let probe = self.probe(endpoint).await;
            if probe.ok {
                tracing::info!(
                    url = %probe.url,
                    latency_ms = probe.latency_ms,
                    "Health probe OK"
                );
            } else {
                tracing::warn!(
                    url = %probe.url,
                    status = ?probe.status,
                    reason = probe.reason.as_deref().unwrap_or("unknown"),
                    "Health probe failed"
                );
            }
            probes.push(probe);
        }

        let summary = HealthSummary::from_probes(probes);
        match summary.verdict {
            Verdict::Healthy => tracing::info!(
                percentage = summary.percentage,
                "Post-deployment health: {}/{} probes OK, system operational",
                summary.succeeded,
                summary.total
            ),
            Verdict::Degraded => tracing::warn!(
                percentage = summary.percentage,
                "Post-deployment health degraded: {}/{} probes OK, some services need attention",
                summary.succeeded,
                summary.total
            ),
            Verdict::Unhealthy => tracing::error!(
                percentage = summary.percentage,
                "Post-deployment health check failed: {}/{} probes OK, verify services manually",
                summary.succeeded,
                summary.total
            ),
        }

        summary
    }

    async fn probe(&self, endpoint: &HealthEndpoint) -> ProbeResult {
        let started = Instant::now();

        let request = match endpoint.method {
            ProbeMethod::Get => self.client.get(&endpoint.url),
            ProbeMethod::Post => {
                let builder = self.client.post(&endpoint.url);
                match &endpoint.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };

        let sent = request.timeout(PROBE_TIMEOUT).send().await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match sent {
            Ok(response) => {
                let status = response.status().as_u16();
                let ok = status == 200;
                ProbeResult {
                    url: endpoint.url.clone(),
                    method: endpoint.method,
                    status: Some(status),
                    latency_ms,
                    ok,
                    reason: if ok { None } else { Some(format!("HTTP {status}")) },
                }
            }
            Err(e) if e.is_timeout() => ProbeResult {
                url: endpoint.url.clone(),
                method: endpoint.method,
                status: None,
                latency_ms,
                ok: false,
                reason: Some(format!("timeout after {}s", PROBE_TIMEOUT.as_secs())),
            },
            Err(e) => ProbeResult {
                url: endpoint.url.clone(),
                method: endpoint.method,
                status: None,
                latency_ms,
                ok: false,
                reason: Some(format!("request failed: {e}")),
            },
        }
    }
}

impl Default for HealthVerifier {
    fn default() -> Self {
        Self::new()
    }
}
