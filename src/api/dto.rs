//! Request and response shapes that are not catalog entries themselves.

use serde::{Deserialize, Serialize};

/// Query string of both tariff-adjustment endpoints: `?mode=&value=`.
///
/// Both stay raw strings so that missing and malformed values are reported
/// with the catalog's own messages instead of a generic extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TarifaQuery {
    pub mode: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
