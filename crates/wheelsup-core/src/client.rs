use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::trip::{Airport, Suggestion, TripRequest, WeatherPreview};
use crate::EstimateError;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Selects the backend host. The base URL is the only environment-driven
/// setting the core carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
}

impl BackendConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

/// Seam for the authoritative estimate call. One attempt per invocation,
/// no caching, no automatic retry.
#[async_trait]
pub trait EstimateBackend: Send + Sync {
    async fn request_estimate(
        &self,
        request: &TripRequest,
    ) -> Result<RemoteEstimate, EstimateError>;
}

/// Seam for the advisory weather-preview lookup.
#[async_trait]
pub trait WeatherBackend: Send + Sync {
    async fn preview_weather(
        &self,
        airport: Airport,
        arrival_date: &str,
        arrival_time: &str,
    ) -> Result<WeatherPreview, EstimateError>;
}

/// Seam for the advisory address-suggestion lookup.
#[async_trait]
pub trait SuggestionBackend: Send + Sync {
    async fn suggest_places(&self, query: &str) -> Result<Vec<Suggestion>, EstimateError>;
}

/// Parsed, schema-checked payload of a successful estimate call. The server
/// also echoes the instants it computed; the engine recomputes the leave
/// instant locally, so the echoes are informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEstimate {
    pub base_travel_minutes: u32,
    pub weather_extra_minutes: u32,
    pub weather_summary: Option<String>,
    pub arrival_date_time: Option<String>,
    pub recommended_leave_date_time: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EstimateRequestBody<'a> {
    from_address_text: &'a str,
    selected_place_id: Option<&'a str>,
    airport: Airport,
    arrival_date: &'a str,
    arrival_time: &'a str,
    transport_mode: &'a str,
    cab_buffer_minutes: u32,
    use_weather_api: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WeatherPreviewRequestBody<'a> {
    preview_weather: bool,
    airport: Airport,
    arrival_date: &'a str,
    arrival_time: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EstimateResponseBody {
    recommended_leave_date_time: Option<String>,
    arrival_date_time: Option<String>,
    breakdown: Option<BreakdownBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BreakdownBody {
    base_travel_minutes: Option<f64>,
    weather_extra_minutes: Option<f64>,
    weather_summary: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestResponseBody {
    Wrapped { suggestions: Vec<Suggestion> },
    Bare(Vec<Suggestion>),
}

/// HTTP client for the estimate service. Holds a single pooled `reqwest`
/// client with an explicit per-request timeout, so a hung backend resolves
/// to an error instead of never returning.
pub struct HttpEstimateClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl HttpEstimateClient {
    pub fn new(config: BackendConfig) -> Result<Self, EstimateError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http, config })
    }

    fn estimate_url(&self) -> String {
        format!("{}/api/estimate", self.config.base_url)
    }

    fn suggest_url(&self) -> String {
        format!("{}/api/places/suggest", self.config.base_url)
    }
}

#[async_trait]
impl EstimateBackend for HttpEstimateClient {
    async fn request_estimate(
        &self,
        request: &TripRequest,
    ) -> Result<RemoteEstimate, EstimateError> {
        let body = EstimateRequestBody {
            from_address_text: &request.from_address_text,
            selected_place_id: request.selected_place_id.as_deref(),
            airport: request.airport,
            arrival_date: &request.arrival_date,
            arrival_time: &request.arrival_time,
            transport_mode: request.transport_mode.as_str(),
            cab_buffer_minutes: request.effective_cab_buffer(),
            use_weather_api: true,
        };

        debug!(
            "requesting estimate — airport={} arrival={} {} mode={}",
            request.airport,
            request.arrival_date,
            request.arrival_time,
            request.transport_mode.as_str()
        );

        let response = self.http.post(self.estimate_url()).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(
                "estimate call failed — status={} body_len={}",
                status.as_u16(),
                text.len()
            );
            return Err(EstimateError::Remote {
                status: status.as_u16(),
                message: text,
            });
        }

        parse_estimate_body(&text)
    }
}

#[async_trait]
impl WeatherBackend for HttpEstimateClient {
    async fn preview_weather(
        &self,
        airport: Airport,
        arrival_date: &str,
        arrival_time: &str,
    ) -> Result<WeatherPreview, EstimateError> {
        let body = WeatherPreviewRequestBody {
            preview_weather: true,
            airport,
            arrival_date,
            arrival_time,
        };

        let response = self.http.post(self.estimate_url()).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(EstimateError::Remote {
                status: status.as_u16(),
                message: text,
            });
        }

        parse_weather_preview_body(&text)
    }
}

#[async_trait]
impl SuggestionBackend for HttpEstimateClient {
    async fn suggest_places(&self, query: &str) -> Result<Vec<Suggestion>, EstimateError> {
        let response = self
            .http
            .get(self.suggest_url())
            .query(&[("q", query)])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(EstimateError::Remote {
                status: status.as_u16(),
                message: text,
            });
        }

        parse_suggestions_body(&text)
    }
}

/// Schema check for the estimate payload. A missing or non-positive
/// `baseTravelMinutes` is a malformed response, never coerced to zero.
fn parse_estimate_body(text: &str) -> Result<RemoteEstimate, EstimateError> {
    let body: EstimateResponseBody = serde_json::from_str(text)
        .map_err(|e| EstimateError::MalformedResponse(e.to_string()))?;

    let breakdown = body
        .breakdown
        .ok_or_else(|| EstimateError::MalformedResponse("missing breakdown".to_string()))?;

    let base_travel_minutes = minutes_field(breakdown.base_travel_minutes)
        .filter(|m| *m > 0)
        .ok_or_else(|| {
            EstimateError::MalformedResponse(
                "breakdown.baseTravelMinutes missing or non-positive".to_string(),
            )
        })?;

    let weather_extra_minutes =
        minutes_field(breakdown.weather_extra_minutes).ok_or_else(|| {
            EstimateError::MalformedResponse(
                "breakdown.weatherExtraMinutes missing or negative".to_string(),
            )
        })?;

    Ok(RemoteEstimate {
        base_travel_minutes,
        weather_extra_minutes,
        weather_summary: breakdown.weather_summary.filter(|s| !s.trim().is_empty()),
        arrival_date_time: body.arrival_date_time,
        recommended_leave_date_time: body.recommended_leave_date_time,
    })
}

/// The preview is advisory; a thin or partial payload degrades to an empty
/// summary with zero extra minutes instead of failing.
fn parse_weather_preview_body(text: &str) -> Result<WeatherPreview, EstimateError> {
    let body: EstimateResponseBody = serde_json::from_str(text)
        .map_err(|e| EstimateError::MalformedResponse(e.to_string()))?;

    let breakdown = body
        .breakdown
        .ok_or_else(|| EstimateError::MalformedResponse("missing breakdown".to_string()))?;

    Ok(WeatherPreview {
        summary: breakdown.weather_summary.unwrap_or_default(),
        extra_minutes: minutes_field(breakdown.weather_extra_minutes).unwrap_or(0),
    })
}

/// Accepts either a bare array of suggestions or a `{"suggestions": [...]}`
/// envelope, the two shapes the suggest endpoint is known to produce.
fn parse_suggestions_body(text: &str) -> Result<Vec<Suggestion>, EstimateError> {
    let body: SuggestResponseBody = serde_json::from_str(text)
        .map_err(|e| EstimateError::MalformedResponse(e.to_string()))?;

    Ok(match body {
        SuggestResponseBody::Wrapped { suggestions } => suggestions,
        SuggestResponseBody::Bare(suggestions) => suggestions,
    })
}

/// Converts a raw wire number into whole non-negative minutes.
/// Rejects negatives, non-finite values and fractional minutes.
fn minutes_field(raw: Option<f64>) -> Option<u32> {
    let value = raw?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_estimate_body_happy_path() {
        let text = r#"{
            "recommendedLeaveDateTime": "2025-01-15T13:53:00Z",
            "arrivalDateTime": "2025-01-15T15:00:00Z",
            "breakdown": {
                "baseTravelMinutes": 45,
                "cabBufferMinutes": 10,
                "weatherExtraMinutes": 12,
                "weatherSummary": "Heavy rain",
                "totalMinutes": 67
            }
        }"#;
        let estimate = parse_estimate_body(text).unwrap();
        assert_eq!(estimate.base_travel_minutes, 45);
        assert_eq!(estimate.weather_extra_minutes, 12);
        assert_eq!(estimate.weather_summary.as_deref(), Some("Heavy rain"));
        assert_eq!(
            estimate.arrival_date_time.as_deref(),
            Some("2025-01-15T15:00:00Z")
        );
    }

    #[test]
    fn test_parse_estimate_body_rejects_non_positive_base() {
        for bad in [
            r#"{"breakdown": {"baseTravelMinutes": 0, "weatherExtraMinutes": 0}}"#,
            r#"{"breakdown": {"baseTravelMinutes": -5, "weatherExtraMinutes": 0}}"#,
            r#"{"breakdown": {"baseTravelMinutes": "45", "weatherExtraMinutes": 0}}"#,
            r#"{"breakdown": {"weatherExtraMinutes": 0}}"#,
            r#"{}"#,
        ] {
            assert!(
                matches!(
                    parse_estimate_body(bad),
                    Err(EstimateError::MalformedResponse(_))
                ),
                "expected malformed response for {bad}"
            );
        }
    }

    #[test]
    fn test_parse_estimate_body_rejects_fractional_minutes() {
        let text = r#"{"breakdown": {"baseTravelMinutes": 45.5, "weatherExtraMinutes": 0}}"#;
        assert!(parse_estimate_body(text).is_err());
    }

    #[test]
    fn test_parse_weather_preview_degrades_to_neutral() {
        let preview = parse_weather_preview_body(r#"{"breakdown": {}}"#).unwrap();
        assert_eq!(preview.summary, "");
        assert_eq!(preview.extra_minutes, 0);

        let preview = parse_weather_preview_body(
            r#"{"breakdown": {"weatherSummary": "Weather unavailable", "weatherExtraMinutes": 0}}"#,
        )
        .unwrap();
        assert_eq!(preview.summary, "Weather unavailable");
    }

    #[test]
    fn test_parse_suggestions_both_shapes() {
        let bare = r#"[{"id": "a", "label": "A St"}, {"id": "b", "label": "B Ave"}]"#;
        let wrapped = r#"{"suggestions": [{"place_id": "a", "label": "A St"}]}"#;

        assert_eq!(parse_suggestions_body(bare).unwrap().len(), 2);
        let suggestions = parse_suggestions_body(wrapped).unwrap();
        assert_eq!(suggestions[0].id, "a");
    }

    #[test]
    fn test_parse_suggestions_rejects_garbage() {
        assert!(parse_suggestions_body("not json").is_err());
        assert!(parse_suggestions_body(r#"{"unexpected": true}"#).is_err());
    }

    #[test]
    fn test_backend_config_strips_trailing_slash() {
        let config = BackendConfig::new("https://example.com/");
        assert_eq!(config.base_url, "https://example.com");
    }
}
