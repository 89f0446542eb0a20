use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Analysis Results
// =============================================================================

/// One word or object identified in an image.
///
/// Holds the model's array element exactly as parsed and serializes it back
/// unchanged. `word()`, `definition()` and `sample_sentence()` are text views
/// for display and per-word storage: strings verbatim, absent or `null` as
/// empty, anything else as its JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    /// Create a result with the three standard fields.
    pub fn new(
        word: impl Into<String>,
        definition: impl Into<String>,
        sample_sentence: impl Into<String>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("word".into(), Value::String(word.into()));
        fields.insert("definition".into(), Value::String(definition.into()));
        fields.insert("sampleSentence".into(), Value::String(sample_sentence.into()));
        Self(Value::Object(fields))
    }

    /// Wrap one element of the model's JSON array, whatever its shape.
    pub fn from_model_value(value: Value) -> Self {
        Self(value)
    }

    pub fn word(&self) -> String {
        self.text("word")
    }

    pub fn definition(&self) -> String {
        self.text("definition")
    }

    pub fn sample_sentence(&self) -> String {
        self.text("sampleSentence")
    }

    /// The element as the model produced it.
    pub fn raw(&self) -> &Value {
        &self.0
    }

    fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

// =============================================================================
// HTTP Envelopes
// =============================================================================

/// JSON request body for the URL-reference input shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeImageRequest {
    /// Public URL of the image to analyze.
    #[serde(default)]
    pub image: Option<String>,
}

/// Success envelope returned by the analysis endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEnvelope {
    /// Results in model output order. Empty means nothing was detected.
    pub analysis: Vec<AnalysisResult>,

    /// Storage key of the uploaded image (multipart input only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    /// Non-fatal problem the caller should know about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl AnalysisEnvelope {
    /// Envelope with results only.
    pub fn new(analysis: Vec<AnalysisResult>) -> Self {
        Self {
            analysis,
            image_path: None,
            warning: None,
        }
    }
}

/// Error envelope returned by the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,

    /// Optional structured details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
