use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::operation::{ParameterOrRef, PathItem, RequestBodyOrRef, ResponseOrRef};
use super::schema::SchemaOrRef;

pub const SCHEMAS_REF: &str = "#/components/schemas/";
pub const PARAMETERS_REF: &str = "#/components/parameters/";
pub const RESPONSES_REF: &str = "#/components/responses/";
pub const REQUEST_BODIES_REF: &str = "#/components/requestBodies/";

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub version: String,
}

/// Tag definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A server URL definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Components object holding reusable definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterOrRef>,

    #[serde(
        rename = "requestBodies",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub request_bodies: IndexMap<String, RequestBodyOrRef>,
}

impl Components {
    /// Look up `#/components/schemas/<name>`. Only one level is followed.
    pub fn schema(&self, ref_path: &str) -> Option<(&str, &SchemaOrRef)> {
        let name = ref_path.strip_prefix(SCHEMAS_REF)?;
        self.schemas.get_key_value(name).map(|(k, v)| (k.as_str(), v))
    }

    pub fn parameter(&self, ref_path: &str) -> Option<&ParameterOrRef> {
        self.parameters.get(ref_path.strip_prefix(PARAMETERS_REF)?)
    }

    pub fn response(&self, ref_path: &str) -> Option<&ResponseOrRef> {
        self.responses.get(ref_path.strip_prefix(RESPONSES_REF)?)
    }

    pub fn request_body(&self, ref_path: &str) -> Option<&RequestBodyOrRef> {
        self.request_bodies
            .get(ref_path.strip_prefix(REQUEST_BODIES_REF)?)
    }
}

/// Canonical OpenAPI 3.x document. Legacy documents are upgraded into this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,

    #[serde(default)]
    pub info: Info,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,

    #[serde(default)]
    pub components: Components,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}
