use serde::de::DeserializeOwned;
use serde_json::Value;
use crate::api::llm::HealthData;
use crate::api::request::{self, ApiRequest, TimeRange};
use crate::api::transport::Transport;
use crate::api::ApiError;
use crate::types::{Anomaly, EegSample, Sample};
/// Typed view of the dashboard backend over any [`Transport`].
pub struct DashboardApi<T: Transport> {
    transport: T,
}
impl<T: Transport> DashboardApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
    pub fn transport(&self) -> &T {
        &self.transport
    }
    pub fn ecg(&self, range: TimeRange) -> Result<Vec<Sample>, ApiError> {
        self.fetch(request::ecg(range))
    }
    pub fn ecg_anomalies(&self, range: TimeRange) -> Result<Vec<Anomaly>, ApiError> {
        self.fetch(request::ecg_anomalies(range))
    }
    pub fn eeg(&self, range: TimeRange) -> Result<Vec<EegSample>, ApiError> {
        self.fetch(request::eeg(range))
    }
    pub fn eeg_anomalies(&self, range: TimeRange) -> Result<Vec<Anomaly>, ApiError> {
        self.fetch(request::eeg_anomalies(range))
    }
    pub fn anomalies(&self, range: TimeRange) -> Result<Vec<Anomaly>, ApiError> {
        self.fetch(request::anomalies(range))
    }
    pub fn anomaly_recommendations(&self, anomaly_id: &str) -> Result<Value, ApiError> {
        self.transport.send(&request::anomaly_recommendations(anomaly_id))
    }
    pub fn fit_connect(&self) -> Result<Value, ApiError> {
        self.transport.send(&request::fit_connect())
    }
    pub fn fit_disconnect(&self) -> Result<Value, ApiError> {
        self.transport.send(&request::fit_disconnect())
    }
    pub fn fit_sync(&self) -> Result<Value, ApiError> {
        self.transport.send(&request::fit_sync())
    }
    pub fn fit_status(&self) -> Result<Value, ApiError> {
        self.transport.send(&request::fit_status())
    }
    pub fn llm_recommendations(&self, health_data: &HealthData) -> Result<Value, ApiError> {
        self.transport.send(&request::llm_recommendations(health_data)?)
    }
    pub fn llm_analysis(&self, anomaly_id: &str) -> Result<Value, ApiError> {
        self.transport.send(&request::llm_analysis(anomaly_id))
    }
    pub fn set_llm_api_key(&self, api_key: &str) -> Result<Value, ApiError> {
        self.transport.send(&request::llm_config(api_key))
    }
    fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let value = self.transport.send(&request)?;
        Ok(serde_json::from_value(value)?)
    }
}
