// src/api/llm.rs
//! Chat-completions client for health recommendations and anomaly analysis.
use std::fmt::Write as _;
use serde::{Deserialize, Serialize};
use crate::api::request::ApiRequest;
use crate::api::transport::{HttpTransport, Transport};
use crate::api::ApiError;
use crate::config::LlmSettings;
use crate::types::{Anomaly, EegSample, Sample};
pub const SYSTEM_PROMPT: &str = "You are a medical AI assistant specializing in cardiology and neurology. \
Provide accurate, helpful, and concise health recommendations based on ECG and EEG data. \
Always prioritize patient safety and recommend consulting healthcare professionals for serious concerns.";
pub const APP_TITLE: &str = "NeuroCardiac Digital Twin";
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medical_conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medications: Vec<String>,
}
/// Summary handed to the model (and to `POST /llm/recommendations`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ecg_data: Vec<Sample>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eeg_data: Vec<EegSample>,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}
impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_owned(),
            content: content.to_owned(),
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}
#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}
/// Per-call overrides; unset fields fall back to [`LlmSettings`].
#[derive(Clone, Debug, Default)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}
pub struct LlmClient<T: Transport> {
    transport: T,
    settings: LlmSettings,
}
impl LlmClient<HttpTransport> {
    /// HTTP client for `settings.base_url`. Fails without a non-blank API key.
    pub fn http(settings: &LlmSettings) -> Result<Self, ApiError> {
        let key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ApiError::MissingApiKey)?;
        let transport = HttpTransport::new(settings.base_url.clone())?
            .with_bearer(key)?
            .with_header("X-Title", APP_TITLE)?;
        Ok(Self::with_transport(transport, settings.clone()))
    }
}
impl<T: Transport> LlmClient<T> {
    pub fn with_transport(transport: T, settings: LlmSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }
    pub fn health_recommendations(
        &self,
        data: &HealthData,
        options: &CompletionOptions,
    ) -> Result<String, ApiError> {
        self.complete(&health_recommendations_prompt(data), options)
    }
    pub fn analyze_anomaly(
        &self,
        anomaly: &Anomaly,
        data: &HealthData,
        options: &CompletionOptions,
    ) -> Result<String, ApiError> {
        self.complete(&anomaly_analysis_prompt(anomaly, data), options)
    }
    pub fn completion_request(&self, prompt: &str, options: &CompletionOptions) -> CompletionRequest {
        CompletionRequest {
            model: options
                .model
                .clone()
                .unwrap_or_else(|| self.settings.model.clone()),
            messages: vec![
                ChatMessage::new("system", SYSTEM_PROMPT),
                ChatMessage::new("user", prompt),
            ],
            temperature: options.temperature.unwrap_or(self.settings.temperature),
            max_tokens: options.max_tokens.unwrap_or(self.settings.max_tokens),
        }
    }
    /// Send one prompt and return the first choice's text.
    pub fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, ApiError> {
        let body = serde_json::to_value(self.completion_request(prompt, options))?;
        let request = ApiRequest::post("/chat/completions").with_body(body);
        self.transport
            .send(&request)
            .and_then(|reply| {
                let response: CompletionResponse = serde_json::from_value(reply)?;
                response
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .ok_or_else(|| ApiError::Decode("completion has no choices".to_owned()))
            })
            .map_err(|e| {
                log::error!("LLM API request failed: {e}");
                e
            })
    }
}
/// Tracks whether the dashboard holds an LLM API key.
#[derive(Clone, Debug, Default)]
pub struct LlmConnection {
    api_key: Option<String>,
}
impl LlmConnection {
    pub fn connect(&mut self, api_key: &str) -> Result<(), ApiError> {
        let key = api_key.trim();
        if key.is_empty() {
            return Err(ApiError::MissingApiKey);
        }
        self.api_key = Some(key.to_owned());
        log::info!("LLM API connected");
        Ok(())
    }
    pub fn disconnect(&mut self) {
        if self.api_key.take().is_some() {
            log::info!("LLM API disconnected");
        }
    }
    pub fn is_connected(&self) -> bool {
        self.api_key.is_some()
    }
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
    /// HTTP client using the held key on top of `settings`.
    pub fn client(&self, settings: &LlmSettings) -> Result<LlmClient<HttpTransport>, ApiError> {
        let settings = LlmSettings {
            api_key: self.api_key.clone(),
            ..settings.clone()
        };
        LlmClient::http(&settings)
    }
}
pub fn health_recommendations_prompt(data: &HealthData) -> String {
    let mut prompt =
        String::from("Based on the following health data, provide personalized health recommendations:\n\n");
    if !data.anomalies.is_empty() {
        prompt.push_str("Detected Anomalies:\n");
        for (i, anomaly) in data.anomalies.iter().enumerate() {
            let _ = writeln!(
                prompt,
                "{}. {} ({}, Severity: {})",
                i + 1,
                anomaly.description,
                anomaly.kind,
                anomaly.severity
            );
        }
        prompt.push('\n');
    }
    push_profile(&mut prompt, data.user_profile.as_ref());
    prompt.push_str("Please provide:\n");
    prompt.push_str("1. A brief analysis of the health data\n");
    prompt.push_str("2. Specific recommendations to address any detected issues\n");
    prompt.push_str("3. General health advice based on the overall patterns\n");
    prompt.push_str("4. Any warning signs the user should watch for\n");
    prompt
}
pub fn anomaly_analysis_prompt(anomaly: &Anomaly, data: &HealthData) -> String {
    let mut prompt = String::from("Please analyze the following health anomaly in detail:\n\n");
    let _ = writeln!(prompt, "Anomaly Type: {}", anomaly.kind);
    let _ = writeln!(prompt, "Description: {}", anomaly.description);
    let _ = writeln!(prompt, "Severity: {}", anomaly.severity);
    let _ = writeln!(prompt, "Details: {}\n", anomaly.details);
    push_profile(&mut prompt, data.user_profile.as_ref());
    prompt.push_str("Please provide:\n");
    prompt.push_str("1. A detailed explanation of what this anomaly might indicate\n");
    prompt.push_str("2. Potential causes and risk factors\n");
    prompt.push_str("3. Specific recommendations to address this issue\n");
    prompt.push_str("4. When the user should consider seeking medical attention\n");
    prompt
}
fn push_profile(prompt: &mut String, profile: Option<&UserProfile>) {
    let Some(profile) = profile else {
        return;
    };
    prompt.push_str("User Profile:\n");
    if let Some(age) = profile.age.filter(|a| *a > 0) {
        let _ = writeln!(prompt, "Age: {age}");
    }
    if let Some(gender) = profile.gender.as_deref().filter(|g| !g.is_empty()) {
        let _ = writeln!(prompt, "Gender: {gender}");
    }
    if !profile.medical_conditions.is_empty() {
        let _ = writeln!(prompt, "Medical Conditions: {}", profile.medical_conditions.join(", "));
    }
    if !profile.medications.is_empty() {
        let _ = writeln!(prompt, "Medications: {}", profile.medications.join(", "));
    }
    prompt.push('\n');
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::Method;
    use crate::api::transport::MemoryTransport;
    use crate::signal::demo_anomalies;
    use chrono::DateTime;
    use approx::assert_relative_eq;
    use serde_json::json;
    fn profile() -> UserProfile {
        UserProfile {
            age: Some(54),
            gender: Some("female".to_owned()),
            medical_conditions: vec!["hypertension".to_owned(), "migraine".to_owned()],
            medications: Vec::new(),
        }
    }
    #[test]
    fn recommendations_prompt_lists_anomalies_and_profile() {
        let anomalies = demo_anomalies(DateTime::from_timestamp_millis(0).unwrap());
        let data = HealthData {
            anomalies: anomalies.clone(),
            user_profile: Some(profile()),
            ..Default::default()
        };
        let prompt = health_recommendations_prompt(&data);
        let first = format!(
            "1. {} ({}, Severity: {})\n",
            anomalies[0].description, anomalies[0].kind, anomalies[0].severity
        );
        assert!(prompt.starts_with("Based on the following health data"));
        assert!(prompt.contains("Detected Anomalies:\n"));
        assert!(prompt.contains(&first));
        assert!(prompt.contains("Age: 54\nGender: female\n"));
        assert!(prompt.contains("Medical Conditions: hypertension, migraine\n"));
        assert!(!prompt.contains("Medications:"));
        assert!(prompt.ends_with("4. Any warning signs the user should watch for\n"));
    }
    #[test]
    fn analysis_prompt_without_profile() {
        let anomaly = demo_anomalies(DateTime::from_timestamp_millis(0).unwrap()).remove(0);
        let prompt = anomaly_analysis_prompt(&anomaly, &HealthData::default());
        assert!(prompt.contains(&format!("Anomaly Type: {}\n", anomaly.kind)));
        assert!(prompt.contains(&format!("Details: {}\n\n", anomaly.details)));
        assert!(!prompt.contains("User Profile:"));
    }
    #[test]
    fn completion_uses_defaults_and_reads_first_choice() {
        let transport = MemoryTransport::new();
        transport.reply(
            Method::Post,
            "/chat/completions",
            Ok(json!({"choices": [{"message": {"role": "assistant", "content": "Rest well."}}]})),
        );
        let client = LlmClient::with_transport(&transport, LlmSettings::default());
        let text = client
            .health_recommendations(&HealthData::default(), &CompletionOptions::default())
            .unwrap();
        assert_eq!(text, "Rest well.");
        let body = transport.sent()[0].body.clone().unwrap();
        assert_eq!(body["model"], "nvidia/llama3-70b-instruct");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["role"], "user");
        assert_relative_eq!(body["temperature"].as_f64().unwrap(), 0.7, epsilon = 1e-6);
    }
    #[test]
    fn options_override_settings() {
        let client = LlmClient::with_transport(MemoryTransport::new(), LlmSettings::default());
        let options = CompletionOptions {
            model: Some("other/model".to_owned()),
            temperature: Some(0.1),
            max_tokens: Some(64),
        };
        let request = client.completion_request("hi", &options);
        assert_eq!(request.model, "other/model");
        assert_eq!(request.max_tokens, 64);
        assert_eq!(request.messages[1].content, "hi");
    }
    #[test]
    fn empty_choices_and_errors_surface() {
        let transport = MemoryTransport::new();
        transport
            .reply(Method::Post, "/chat/completions", Ok(json!({"choices": []})))
            .reply(
                Method::Post,
                "/chat/completions",
                Err((401, json!({"message": "invalid key"}))),
            );
        let client = LlmClient::with_transport(&transport, LlmSettings::default());
        let options = CompletionOptions::default();
        assert!(matches!(client.complete("x", &options), Err(ApiError::Decode(_))));
        let err = client.complete("x", &options).unwrap_err();
        assert_eq!(err.to_string(), "invalid key");
    }
    #[test]
    fn connection_toggle_needs_a_key() {
        let mut connection = LlmConnection::default();
        assert!(matches!(connection.connect("   "), Err(ApiError::MissingApiKey)));
        assert!(!connection.is_connected());
        connection.connect(" sk-test ").unwrap();
        assert_eq!(connection.api_key(), Some("sk-test"));
        assert!(connection.client(&LlmSettings::default()).is_ok());
        connection.disconnect();
        assert!(!connection.is_connected());
        assert!(matches!(
            connection.client(&LlmSettings::default()),
            Err(ApiError::MissingApiKey)
        ));
    }
}
