//! Single-endpoint probe execution.
//!
//! # Responsibilities
//! - Measure reachability and time-to-first-byte for one endpoint
//! - Prefer a streaming request, fall back to non-streaming once
//! - Retry once with relaxed TLS validation on certificate failures
//! - Represent every failure mode in the returned outcome, never an error
//!
//! # Design Decisions
//! - Connectivity, not request success, is what is measured: any received
//!   HTTP status means the endpoint is reachable
//! - The warm-up request primes the connection pool; its result and its
//!   latency are discarded entirely

use std::time::{Duration, Instant};

use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::json;

use crate::probe::classify::classify_request_error;
use crate::probe::types::{EndpointDescriptor, ErrorKind, ProbeOutcome, ProbeSettings};

/// Statuses that say the endpoint rejected the streaming request itself
/// rather than being unreachable; worth one non-streaming retry.
const STREAM_REJECTED_STATUSES: [u16; 4] = [400, 404, 405, 422];

/// Path probed under each profile's base URL.
const PROBE_PATH: &str = "/v1/messages";

enum Attempt {
    Response { status: StatusCode, latency: Duration },
    Failed { kind: ErrorKind, detail: String },
}

/// Issues health/latency measurements. One instance serves a whole batch;
/// the underlying clients and their connection pools are shared read-only.
pub struct Prober {
    strict: Client,
    relaxed: Option<Client>,
    settings: ProbeSettings,
}

impl Prober {
    pub fn new(settings: ProbeSettings) -> Result<Self, reqwest::Error> {
        let strict = Client::builder().build()?;
        let relaxed = if settings.allow_invalid_certs {
            Some(Client::builder().danger_accept_invalid_certs(true).build()?)
        } else {
            None
        };
        Ok(Self {
            strict,
            relaxed,
            settings,
        })
    }

    /// Probe one endpoint. Expected network failures never escape as errors;
    /// they come back classified inside the outcome.
    pub async fn probe(&self, descriptor: &EndpointDescriptor) -> ProbeOutcome {
        let timeout = descriptor
            .timeout_override
            .unwrap_or(self.settings.timeout);

        if self.settings.warmup {
            self.warm_up(descriptor, timeout).await;
        }

        let mut attempt = self.measure(&self.strict, descriptor, timeout).await;

        if let Some(relaxed) = self.relaxed_client_for(&attempt) {
            tracing::debug!(
                name = %descriptor.name,
                "TLS validation failed, retrying with relaxed validation"
            );
            attempt = self.measure(relaxed, descriptor, timeout).await;
        }

        self.finish(descriptor, attempt)
    }

    /// The relaxed-validation client, when the attempt failed on certificate
    /// policy and the run allows a relaxed retry. With the retry disabled a
    /// TLS failure is terminal for the probe.
    fn relaxed_client_for(&self, attempt: &Attempt) -> Option<&Client> {
        match attempt {
            Attempt::Failed {
                kind: ErrorKind::TlsFailure,
                ..
            } => self.relaxed.as_ref(),
            _ => None,
        }
    }

    /// Streaming-preferred measurement with a single non-streaming fallback.
    async fn measure(
        &self,
        client: &Client,
        descriptor: &EndpointDescriptor,
        timeout: Duration,
    ) -> Attempt {
        let first = self.request(client, descriptor, timeout, true).await;
        match first {
            Attempt::Response { status, .. }
                if STREAM_REJECTED_STATUSES.contains(&status.as_u16()) =>
            {
                tracing::debug!(
                    name = %descriptor.name,
                    status = %status,
                    "Streaming probe rejected, retrying non-streaming"
                );
                self.request(client, descriptor, timeout, false).await
            }
            other => other,
        }
    }

    async fn request(
        &self,
        client: &Client,
        descriptor: &EndpointDescriptor,
        timeout: Duration,
        streaming: bool,
    ) -> Attempt {
        let started = Instant::now();
        match self.build_request(client, descriptor, timeout, streaming).send().await {
            Ok(response) => {
                let status = response.status();
                let mut latency = started.elapsed();
                if streaming && status.is_success() {
                    // Headers alone can come from an intermediary that never
                    // produces events; the first body chunk marks a live
                    // stream. Failure here keeps the header-based latency.
                    let remaining = timeout.saturating_sub(latency);
                    let mut stream = response.bytes_stream();
                    if let Ok(Some(Ok(_))) =
                        tokio::time::timeout(remaining, stream.next()).await
                    {
                        latency = started.elapsed();
                    }
                }
                Attempt::Response { status, latency }
            }
            Err(err) => Attempt::Failed {
                kind: classify_request_error(&err),
                detail: err.to_string(),
            },
        }
    }

    fn build_request(
        &self,
        client: &Client,
        descriptor: &EndpointDescriptor,
        timeout: Duration,
        streaming: bool,
    ) -> RequestBuilder {
        let url = format!("{}{}", descriptor.base_url.trim_end_matches('/'), PROBE_PATH);
        let body = json!({
            "model": self.settings.probe_model,
            "max_tokens": 1,
            "stream": streaming,
            "messages": [{"role": "user", "content": "ping"}],
        });

        let mut request = client
            .post(url)
            .timeout(timeout)
            .header("anthropic-version", "2023-06-01")
            .json(&body);
        if !descriptor.token.is_empty() {
            request = request
                .header("x-api-key", &descriptor.token)
                .header("authorization", format!("Bearer {}", descriptor.token));
        }
        request
    }

    /// Connection priming only; result and latency are discarded.
    async fn warm_up(&self, descriptor: &EndpointDescriptor, timeout: Duration) {
        let request = self.strict.get(&descriptor.base_url).timeout(timeout);
        if let Err(err) = request.send().await {
            tracing::trace!(name = %descriptor.name, error = %err, "Warm-up request failed");
        }
    }

    fn finish(&self, descriptor: &EndpointDescriptor, attempt: Attempt) -> ProbeOutcome {
        match attempt {
            Attempt::Response { status, latency } => {
                let rate_limited = self.settings.degraded_statuses.contains(&status.as_u16());
                tracing::debug!(
                    name = %descriptor.name,
                    status = %status,
                    latency_ms = latency.as_millis() as u64,
                    rate_limited,
                    "Probe response"
                );
                ProbeOutcome {
                    name: descriptor.name.clone(),
                    reachable: true,
                    latency: Some(latency),
                    http_status: Some(status.as_u16()),
                    error_kind: rate_limited.then_some(ErrorKind::RateLimited),
                    raw_detail: None,
                }
            }
            Attempt::Failed { kind, detail } => {
                tracing::debug!(
                    name = %descriptor.name,
                    kind = %kind,
                    detail = %detail,
                    "Probe failed"
                );
                ProbeOutcome::failed(descriptor.name.clone(), kind, detail)
            }
        }
    }
}
