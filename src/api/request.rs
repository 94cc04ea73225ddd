//! Request shapes of the dashboard backend. Nothing here performs I/O; a
//! [`Transport`](crate::api::Transport) sends what these functions build.
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;
use serde::Serialize;
use serde_json::{json, Value};
use crate::api::ApiError;
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}
impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(path)
        }
    }
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
    /// Absolute URL under `base`. Path segments are kept as given.
    pub fn url(&self, base: &str) -> Result<Url, ApiError> {
        let joined = format!("{}{}", base.trim_end_matches('/'), self.path);
        let mut url = Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }
}
/// Optional `startTime`/`endTime` bounds, milliseconds since the epoch.
/// Unset and zero bounds are left out of the query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}
impl TimeRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
    /// The `minutes` before `end_ms`, with negative counts treated as zero.
    /// `None` when the start does not fit in an `i64` of milliseconds.
    pub fn last_minutes(end_ms: i64, minutes: i64) -> Option<Self> {
        let span = minutes.max(0).checked_mul(60_000)?;
        Some(Self::new(end_ms.checked_sub(span)?, end_ms))
    }
    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(start) = self.start.filter(|v| *v != 0) {
            request = request.with_query("startTime", start);
        }
        if let Some(end) = self.end.filter(|v| *v != 0) {
            request = request.with_query("endTime", end);
        }
        request
    }
}
pub fn ecg(range: TimeRange) -> ApiRequest {
    range.apply(ApiRequest::get("/ecg"))
}
pub fn ecg_anomalies(range: TimeRange) -> ApiRequest {
    range.apply(ApiRequest::get("/ecg/anomalies"))
}
pub fn eeg(range: TimeRange) -> ApiRequest {
    range.apply(ApiRequest::get("/eeg"))
}
pub fn eeg_anomalies(range: TimeRange) -> ApiRequest {
    range.apply(ApiRequest::get("/eeg/anomalies"))
}
pub fn anomalies(range: TimeRange) -> ApiRequest {
    range.apply(ApiRequest::get("/anomalies"))
}
pub fn anomaly_recommendations(anomaly_id: &str) -> ApiRequest {
    ApiRequest::get(format!("/anomalies/{}/recommendations", encode_segment(anomaly_id)))
}
pub fn fit_connect() -> ApiRequest {
    ApiRequest::post("/google-fit/connect")
}
pub fn fit_disconnect() -> ApiRequest {
    ApiRequest::post("/google-fit/disconnect")
}
pub fn fit_sync() -> ApiRequest {
    ApiRequest::post("/google-fit/sync")
}
pub fn fit_status() -> ApiRequest {
    ApiRequest::get("/google-fit/status")
}
pub fn llm_recommendations<T: Serialize>(health_data: &T) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::post("/llm/recommendations").with_body(serde_json::to_value(health_data)?))
}
pub fn llm_analysis(anomaly_id: &str) -> ApiRequest {
    ApiRequest::get(format!("/llm/analysis/{}", encode_segment(anomaly_id)))
}
pub fn llm_config(api_key: &str) -> ApiRequest {
    ApiRequest::post("/llm/config").with_body(json!({ "apiKey": api_key }))
}
// RFC 3986 unreserved characters stay as they are
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');
// ids come from the backend; keep them inside one path segment
fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
#[cfg(test)]
mod tests {
    use super::*;
    const BASE: &str = "http://localhost:5000/api";
    #[test]
    fn range_bounds_become_query_parameters() {
        let url = ecg(TimeRange::new(1_000, 2_000)).url(BASE).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/ecg?startTime=1000&endTime=2000"
        );
    }
    #[test]
    fn missing_and_zero_bounds_are_omitted() {
        let request = eeg(TimeRange {
            start: Some(0),
            end: None,
        });
        assert!(request.query.is_empty());
        assert_eq!(request.url(BASE).unwrap().as_str(), "http://localhost:5000/api/eeg");
        let only_end = anomalies(TimeRange {
            start: None,
            end: Some(5),
        });
        assert_eq!(only_end.query, vec![("endTime".to_owned(), "5".to_owned())]);
    }
    #[test]
    fn fit_and_llm_shapes() {
        assert_eq!(fit_connect().method, Method::Post);
        assert_eq!(fit_status().method, Method::Get);
        assert_eq!(fit_sync().path, "/google-fit/sync");
        let config = llm_config("sk-1");
        assert_eq!(config.body, Some(json!({"apiKey": "sk-1"})));
        let recs = llm_recommendations(&json!({"anomalies": []})).unwrap();
        assert_eq!(recs.path, "/llm/recommendations");
        assert_eq!(recs.method, Method::Post);
    }
    #[test]
    fn minute_lookback_checks_overflow() {
        assert_eq!(TimeRange::last_minutes(600_000, 5), Some(TimeRange::new(300_000, 600_000)));
        assert_eq!(TimeRange::last_minutes(600_000, -1), Some(TimeRange::new(600_000, 600_000)));
        assert_eq!(TimeRange::last_minutes(600_000, i64::MAX), None);
        assert_eq!(TimeRange::last_minutes(i64::MIN + 1, 1), None);
    }
    #[test]
    fn ids_stay_in_one_segment() {
        assert_eq!(llm_analysis("a/b c").path, "/llm/analysis/a%2Fb%20c");
        assert_eq!(llm_analysis("id-1_v2.~x").path, "/llm/analysis/id-1_v2.~x");
        assert_eq!(llm_analysis("é?").path, "/llm/analysis/%C3%A9%3F");
        assert_eq!(
            anomaly_recommendations("42").path,
            "/anomalies/42/recommendations"
        );
    }
    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let url = fit_disconnect().url("http://example.test/api/").unwrap();
        assert_eq!(url.as_str(), "http://example.test/api/google-fit/disconnect");
        assert!(matches!(
            fit_status().url("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
