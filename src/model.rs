use schemars::JsonSchema;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a reminder generation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReminderRequest {
    /// Base64 encoded JPEG, without a data URI prefix
    #[serde(default, deserialize_with = "falsy_as_none")]
    pub base64_image: Option<String>,
}

/// Read an image field where `null`, `false`, `0` and `""` all mean "not sent"
fn falsy_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(de::Error::custom(format!(
            "invalid type: {}, expected a base64 string",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl GenerateReminderRequest {
    /// The image payload, if one was actually sent
    pub fn image(&self) -> Option<&str> {
        self.base64_image.as_deref().filter(|image| !image.is_empty())
    }
}

/// Structured result produced by the model and returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Reminder {
    /// Whether a restriction date and time was found on the sign
    pub time_and_date_found: bool,
    /// Text of the calendar event file
    pub calendar_file_data: String,
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
