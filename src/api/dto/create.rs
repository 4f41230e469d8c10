//! DTOs for the create endpoint.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;
use validator::Validate;

static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

/// Request to create a short code.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRequest {
    /// Destination URL. A missing scheme is completed with `http://`.
    #[validate(length(min = 1, max = 2048, message = "URL must be between 1 and 2048 characters"))]
    pub url: String,

    /// Optional caller-chosen code. Blank means none.
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(min = 1, max = 32))]
    #[validate(regex(path = *CUSTOM_CODE_REGEX, message = "Custom code must be alphanumeric"))]
    pub custom_code: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|code| !code.trim().is_empty()))
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub code: String,
    pub short_url: String,
    pub destination: String,
}
