//! The label entity returned by label creation.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{DhlError, DhlResult};

/// A created shipping label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    /// Label identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,
    /// Label format, e.g. `PDF`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_type: Option<String>,
    /// Tracking code for track-and-trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_code: Option<String>,
    /// Sorting code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code: Option<String>,
    /// Caller-supplied order reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    /// Piece number within the shipment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piece_number: Option<u32>,
    /// Base64-encoded label document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Parcel {
    /// Builds a `Parcel` from a decoded label response.
    ///
    /// # Errors
    ///
    /// Returns [`DhlError::Decode`] when the value is not a label object.
    pub fn from_value(operation: &'static str, value: Value) -> DhlResult<Self> {
        if !value.is_object() {
            return Err(DhlError::Decode {
                operation,
                message: "expected a label object".to_string(),
                body: value.to_string(),
            });
        }

        let body = value.to_string();
        serde_json::from_value(value).map_err(|e| DhlError::Decode {
            operation,
            message: e.to_string(),
            body,
        })
    }

    /// Decodes the embedded label document.
    ///
    /// Returns `Ok(None)` when the response carried no document.
    pub fn pdf_bytes(&self) -> DhlResult<Option<Vec<u8>>> {
        self.pdf
            .as_deref()
            .map(|encoded| {
                STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| DhlError::Serialization {
                        message: format!("Invalid base64 label document: {}", e),
                    })
            })
            .transpose()
    }
}
