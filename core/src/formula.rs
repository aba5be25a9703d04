use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::categorize::{categorize, has_content};
use crate::error::ErrorDetail;
use crate::recovery::RecoveryResult;

/// Request to generate a cosmetic formula from a free-text brief
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Product brief, e.g. "Lightweight daytime moisturizer for oily skin with SPF 30"
    pub message: String,
    /// Also write the recovered formula to the server's configured save path
    #[serde(default, alias = "saveFile")]
    pub save_file: bool,
}

/// Recovery outcome as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenerateResult {
    /// Whether a JSON value could be recovered from the agent's reply
    pub parsed: bool,
    /// The recovered value (object, array or scalar), null when parsing failed
    pub data: Option<Value>,
    /// The agent's reply, verbatim
    pub raw: String,
    /// Why recovery or the exchange failed
    pub error: Option<String>,
    /// `data` regrouped into the canonical display sections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_data: Option<Value>,
}

impl GenerateResult {
    /// Result for an exchange that never produced a usable reply.
    pub fn exchange_failed(raw: String, error: String) -> Self {
        Self {
            parsed: false,
            data: None,
            raw,
            error: Some(error),
            formatted_data: None,
        }
    }

    /// Attach the categorized view when the recovered value has content.
    pub fn with_formatted_data(mut self) -> Self {
        if self.parsed {
            self.formatted_data = self.data.as_ref().filter(|d| has_content(d)).map(categorize);
        }
        self
    }
}

impl From<RecoveryResult> for GenerateResult {
    fn from(result: RecoveryResult) -> Self {
        Self {
            parsed: result.succeeded,
            data: result.value,
            raw: result.raw,
            error: result.failure_reason,
            formatted_data: None,
        }
    }
}

/// Uniform envelope for POST /generate. Transport status is always 200.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub ok: bool,
    pub result: Option<GenerateResult>,
    pub error: Option<ErrorDetail>,
}

impl GenerateResponse {
    pub fn success(result: GenerateResult) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: ErrorDetail, result: Option<GenerateResult>) -> Self {
        Self {
            ok: false,
            result,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::recover;
    use serde_json::json;

    #[test]
    fn request_accepts_camel_case_save_flag() {
        let req: GenerateRequest =
            serde_json::from_value(json!({"message": "toner", "saveFile": true})).unwrap();
        assert!(req.save_file);

        let req: GenerateRequest = serde_json::from_value(json!({"message": "toner"})).unwrap();
        assert!(!req.save_file);
    }

    #[test]
    fn parsed_object_gets_formatted_data() {
        let result = GenerateResult::from(recover(r#"{"name": "Glow"} TERMINATE"#))
            .with_formatted_data();
        assert!(result.parsed);
        let formatted = result.formatted_data.expect("formatted data");
        assert_eq!(formatted["Product Name"]["name"], "Glow");
    }

    #[test]
    fn empty_or_failed_data_is_not_formatted() {
        let empty = GenerateResult::from(recover("{}")).with_formatted_data();
        assert!(empty.parsed);
        assert_eq!(empty.formatted_data, None);

        let failed = GenerateResult::from(recover("no formula here")).with_formatted_data();
        assert!(!failed.parsed);
        assert_eq!(failed.formatted_data, None);
    }

    #[test]
    fn wire_shape_omits_absent_formatted_data() {
        let result = GenerateResult::from(recover("plain words"));
        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire["parsed"], false);
        assert_eq!(wire["data"], Value::Null);
        assert_eq!(wire["raw"], "plain words");
        assert!(wire["error"].is_string());
        assert!(wire.get("formatted_data").is_none());
    }
}
