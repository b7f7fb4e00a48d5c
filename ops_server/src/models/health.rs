//! Health probe targets and post-deployment verification results.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeMethod {
    Get,
    Post,
}

impl ProbeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeMethod::Get => "GET",
            ProbeMethod::Post => "POST",
        }
    }
}

/// One critical service path probed after a successful deployment.
#[derive(Debug, Clone)]
pub struct HealthEndpoint {
    pub method: ProbeMethod,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

impl HealthEndpoint {
    /// Classify a configured URL. Check-email style paths are exercised with
    /// a synthetic POST payload; everything else is a plain GET.
    pub fn from_url(url: &str) -> Self {
        if url.contains("check-email") {
            Self {
                method: ProbeMethod::Post,
                url: url.to_string(),
                body: Some(serde_json::json!({"email": "test@example.com"})),
            }
        } else {
            Self {
                method: ProbeMethod::Get,
                url: url.to_string(),
                body: None,
            }
        }
    }
}

/// Outcome of probing a single endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub method: ProbeMethod,
    pub status: Option<u16>,
    pub latency_ms: u64,
    pub ok: bool,
    pub reason: Option<String>,
}

/// Verdict tier derived from the probe success percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Healthy,
    Degraded,
    Unhealthy,
}

impl Verdict {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 75 {
            Verdict::Healthy
        } else if percentage >= 50 {
            Verdict::Degraded
        } else {
            Verdict::Unhealthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Healthy => "healthy",
            Verdict::Degraded => "degraded",
            Verdict::Unhealthy => "unhealthy",
        }
    }
}

/// Aggregate of one verification sweep.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub succeeded: usize,
    pub total: usize,
    /// Floor of successes * 100 / total. Integer division on purpose: the
    /// tier boundaries are defined over the floored percentage.
    pub percentage: u32,
    pub verdict: Verdict,
    pub probes: Vec<ProbeResult>,
}

impl HealthSummary {
    pub fn from_probes(probes: Vec<ProbeResult>) -> Self {
        let total = probes.len();
        let succeeded = probes.iter().filter(|p| p.ok).count();
        let percentage = if total == 0 {
            100
        } else {
            (succeeded * 100 / total) as u32
        };
        Self {
            succeeded,
            total,
            percentage,
            verdict: Verdict::from_percentage(percentage),
            probes,
        }
    }
}
