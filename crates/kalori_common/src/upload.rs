//! Upload client - sends an accepted photo to the analysis service
//!
//! One multipart POST per confirmation: a single `foodImage` part named
//! `food.jpg` with type `image/jpeg`. No timeout and no retry; the user
//! retries by confirming another photo.
//!
//! The response is read leniently. Missing fields fall back to placeholder
//! text and are not errors:
//! - calories: `data.jumlah_kalori`, then `data.perkiraan_kalori`, then
//!   `"Kalori tidak diketahui"`
//! - food name: `data.nama_makanan`, then `"Tidak diketahui"`

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use crate::artifact::PhotoArtifact;

/// Multipart field carrying the photo
pub const UPLOAD_FIELD: &str = "foodImage";

/// File name announced for every upload
pub const UPLOAD_FILE_NAME: &str = "food.jpg";

/// Food name shown when the service did not recognise the dish
pub const UNKNOWN_FOOD: &str = "Tidak diketahui";

/// Calorie text shown when the service returned no estimate
pub const UNKNOWN_CALORIES: &str = "Kalori tidak diketahui";

/// Classified upload failures. Only used for diagnostics; the user sees one message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid JSON response: {0}")]
    Parse(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl UploadError {
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::Network(_) => "network",
            UploadError::Parse(_) => "parse",
            UploadError::Server(_) => "server",
        }
    }
}

/// Nutritional estimate extracted from a response
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub food_name: String,
    /// Whatever JSON the service produced (number, string, ...), unnormalized
    pub calorie_value: Value,
}

impl AnalysisResult {
    /// Extract the result from a parsed response body
    pub fn from_response(response: &Value) -> Self {
        let calorie_value = data_field(response, "jumlah_kalori")
            .or_else(|| data_field(response, "perkiraan_kalori"))
            .cloned()
            .unwrap_or_else(|| Value::String(UNKNOWN_CALORIES.to_string()));

        let food_name = match data_field(response, "nama_makanan") {
            None | Some(Value::Null) => UNKNOWN_FOOD.to_string(),
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
        };

        Self {
            food_name,
            calorie_value,
        }
    }

    /// Calorie value as displayed: strings bare, everything else as JSON.
    ///
    /// Numbers keep their JSON spelling, so `350.0` stays `350.0` rather than
    /// being trimmed to `350`.
    pub fn calorie_text(&self) -> String {
        match &self.calorie_value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

fn data_field<'a>(response: &'a Value, name: &str) -> Option<&'a Value> {
    response.get("data")?.get(name)
}

/// Result of one upload attempt
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Success(AnalysisResult),
    Failure(UploadError),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success(_))
    }
}

// ============================================================================
// Uploader Trait
// ============================================================================

/// Anything that can turn an accepted artifact into an outcome
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload once. Never fails outright; failures are part of the outcome.
    async fn upload(&self, artifact: &PhotoArtifact) -> UploadOutcome;
}

/// Build the multipart body for an artifact
pub async fn build_form(artifact: &PhotoArtifact) -> Result<Form, UploadError> {
    let bytes = tokio::fs::read(artifact.path()).await.map_err(|e| {
        UploadError::Server(format!("failed to read {}: {}", artifact.path().display(), e))
    })?;

    let part = Part::bytes(bytes)
        .file_name(UPLOAD_FILE_NAME)
        .mime_str(artifact.mime_type())
        .map_err(|e| UploadError::Server(format!("invalid part: {}", e)))?;

    Ok(Form::new().part(UPLOAD_FIELD, part))
}

// ============================================================================
// HTTP Upload Client (Production)
// ============================================================================

/// reqwest-backed client for the analyze-food endpoint
pub struct HttpUploadClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpUploadClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(format!("kalori/{}", crate::VERSION))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn try_upload(&self, artifact: &PhotoArtifact) -> Result<AnalysisResult, UploadError> {
        let form = build_form(artifact).await?;
        debug!(
            endpoint = %self.endpoint,
            path = %artifact.path().display(),
            mime = artifact.mime_type(),
            captured_at = %artifact.captured_at(),
            "Uploading photo"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            // A JSON error body means the service answered; anything else is transport noise
            return Err(match serde_json::from_str::<Value>(&body) {
                Ok(_) => UploadError::Server(format!("HTTP {}", status)),
                Err(_) => UploadError::Network(format!("HTTP {} without a JSON body", status)),
            });
        }

        let json: Value =
            serde_json::from_str(&body).map_err(|e| UploadError::Parse(e.to_string()))?;
        info!(response = %json, "API response");

        Ok(AnalysisResult::from_response(&json))
    }
}

#[async_trait]
impl Uploader for HttpUploadClient {
    async fn upload(&self, artifact: &PhotoArtifact) -> UploadOutcome {
        match self.try_upload(artifact).await {
            Ok(result) => UploadOutcome::Success(result),
            Err(e) => UploadOutcome::Failure(e),
        }
    }
}

// ============================================================================
// Fake Uploader (Testing)
// ============================================================================

/// Fake uploader with pre-defined outcomes
pub struct FakeUploader {
    outcomes: Mutex<Vec<UploadOutcome>>,
    uploaded: Mutex<Vec<PathBuf>>,
}

impl FakeUploader {
    /// Outcomes are returned in order; the last one repeats
    pub fn new(outcomes: Vec<UploadOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            uploaded: Mutex::new(Vec::new()),
        }
    }

    pub fn always(outcome: UploadOutcome) -> Self {
        Self::new(vec![outcome])
    }

    /// Number of upload calls made
    pub fn call_count(&self) -> usize {
        self.uploaded.lock().unwrap().len()
    }

    /// Paths of every artifact handed to `upload`, in order
    pub fn uploaded_paths(&self) -> Vec<PathBuf> {
        self.uploaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl Uploader for FakeUploader {
    async fn upload(&self, artifact: &PhotoArtifact) -> UploadOutcome {
        self.uploaded
            .lock()
            .unwrap()
            .push(artifact.path().to_path_buf());

        let mut outcomes = self.outcomes.lock().unwrap();
        match outcomes.len() {
            0 => UploadOutcome::Failure(UploadError::Server("no scripted outcome".to_string())),
            1 => outcomes[0].clone(),
            _ => outcomes.remove(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_name_and_exact_calories() {
        let result = AnalysisResult::from_response(&json!({
            "data": {"nama_makanan": "Nasi Goreng", "jumlah_kalori": 350}
        }));
        assert_eq!(result.food_name, "Nasi Goreng");
        assert_eq!(result.calorie_value, json!(350));
        assert_eq!(result.calorie_text(), "350");
    }

    #[test]
    fn test_extract_estimate_without_name() {
        let result = AnalysisResult::from_response(&json!({
            "data": {"perkiraan_kalori": "~400 kcal"}
        }));
        assert_eq!(result.food_name, UNKNOWN_FOOD);
        assert_eq!(result.calorie_value, json!("~400 kcal"));
        assert_eq!(result.calorie_text(), "~400 kcal");
    }

    #[test]
    fn test_extract_empty_data_uses_placeholders() {
        let result = AnalysisResult::from_response(&json!({"data": {}}));
        assert_eq!(result.food_name, "Tidak diketahui");
        assert_eq!(result.calorie_value, json!("Kalori tidak diketahui"));
    }

    #[test]
    fn test_exact_calories_win_over_estimate() {
        let result = AnalysisResult::from_response(&json!({
            "data": {"jumlah_kalori": "520", "perkiraan_kalori": 480}
        }));
        assert_eq!(result.calorie_value, json!("520"));
    }

    #[test]
    fn test_null_calories_count_as_present() {
        let result = AnalysisResult::from_response(&json!({
            "data": {"jumlah_kalori": null, "perkiraan_kalori": 480, "nama_makanan": null}
        }));
        assert_eq!(result.calorie_value, Value::Null);
        assert_eq!(result.calorie_text(), "null");
        assert_eq!(result.food_name, UNKNOWN_FOOD);
    }

    #[test]
    fn test_client_reports_endpoint() {
        let client = HttpUploadClient::new("http://10.0.0.5/analyze-food").unwrap();
        assert_eq!(client.endpoint(), "http://10.0.0.5/analyze-food");
    }

    #[test]
    fn test_float_calories_keep_json_spelling() {
        let result = AnalysisResult::from_response(&json!({
            "data": {"nama_makanan": "Soto Ayam", "jumlah_kalori": 350.0}
        }));
        assert_eq!(result.calorie_text(), "350.0");
    }

    #[test]
    fn test_missing_or_odd_data_object() {
        let missing = AnalysisResult::from_response(&json!({"status": "ok"}));
        assert_eq!(missing.food_name, UNKNOWN_FOOD);
        assert_eq!(missing.calorie_value, json!(UNKNOWN_CALORIES));

        let scalar = AnalysisResult::from_response(&json!({"data": "nope"}));
        assert_eq!(scalar.food_name, UNKNOWN_FOOD);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(UploadError::Network("x".into()).kind(), "network");
        assert_eq!(UploadError::Parse("x".into()).kind(), "parse");
        assert_eq!(UploadError::Server("x".into()).kind(), "server");
    }

    #[tokio::test]
    async fn test_build_form_fails_for_missing_file() {
        let artifact = PhotoArtifact::jpeg("/nonexistent/kalori/plate.jpg");
        let err = build_form(&artifact).await.unwrap_err();
        assert_eq!(err.kind(), "server");
    }

    #[tokio::test]
    async fn test_fake_uploader_sequence() {
        let ok = UploadOutcome::Success(AnalysisResult::from_response(&json!({"data": {}})));
        let failed = UploadOutcome::Failure(UploadError::Network("refused".into()));
        let uploader = FakeUploader::new(vec![ok.clone(), failed.clone()]);
        let artifact = PhotoArtifact::jpeg("a.jpg");

        assert_eq!(uploader.upload(&artifact).await, ok);
        assert_eq!(uploader.upload(&artifact).await, failed);
        assert_eq!(uploader.upload(&artifact).await, failed);
        assert_eq!(uploader.call_count(), 3);
    }
}
