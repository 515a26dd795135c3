use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use super::operation::{
    MediaType, Operation, Parameter, ParameterLocation, ParameterOrRef, PathItem, RequestBody,
    RequestBodyOrRef, Response, ResponseOrRef,
};
use super::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};
use super::spec::{
    Components, Info, OpenApiSpec, PARAMETERS_REF, RESPONSES_REF, SCHEMAS_REF, Server, Tag,
};
use crate::error::ParseError;
use crate::ir::HttpMethod;

const DEFINITIONS_REF: &str = "#/definitions/";
const LEGACY_PARAMETERS_REF: &str = "#/parameters/";
const LEGACY_RESPONSES_REF: &str = "#/responses/";

const JSON: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Version reported by upgraded documents.
const UPGRADED_VERSION: &str = "3.0.3";

/// A Swagger 2.0 document.
#[derive(Debug, Clone, Deserialize)]
pub struct Swagger {
    #[serde(deserialize_with = "version_string")]
    pub swagger: String,

    #[serde(default)]
    pub info: Info,

    pub host: Option<String>,

    #[serde(rename = "basePath")]
    pub base_path: Option<String>,

    #[serde(default)]
    pub schemes: Vec<String>,

    #[serde(default)]
    pub consumes: Vec<String>,

    #[serde(default)]
    pub produces: Vec<String>,

    #[serde(default)]
    pub paths: IndexMap<String, LegacyPathItem>,

    #[serde(default)]
    pub definitions: IndexMap<String, SchemaOrRef>,

    #[serde(default)]
    pub parameters: IndexMap<String, LegacyParameter>,

    #[serde(default)]
    pub responses: IndexMap<String, LegacyResponse>,

    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Accept `swagger: 2.0` written as a bare YAML number.
fn version_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Text(String),
        Number(f64),
    }

    Ok(match Version::deserialize(deserializer)? {
        Version::Text(text) => text,
        Version::Number(number) => format!("{number:.1}"),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyPathItem {
    #[serde(default)]
    pub parameters: Vec<LegacyParameterOrRef>,
    pub get: Option<LegacyOperation>,
    pub put: Option<LegacyOperation>,
    pub post: Option<LegacyOperation>,
    pub delete: Option<LegacyOperation>,
    pub options: Option<LegacyOperation>,
    pub head: Option<LegacyOperation>,
    pub patch: Option<LegacyOperation>,
}

impl LegacyPathItem {
    fn operations(&self) -> impl Iterator<Item = (HttpMethod, &LegacyOperation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Head, &self.head),
            (HttpMethod::Patch, &self.patch),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyOperation {
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<LegacyParameterOrRef>,
    #[serde(default)]
    pub responses: IndexMap<String, LegacyResponseOrRef>,
    pub deprecated: Option<bool>,
}

/// A Swagger 2.0 parameter. Non-body parameters describe their type inline.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyParameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<SchemaOrRef>,
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub format: Option<String>,
    pub items: Option<LegacyItems>,
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LegacyParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Parameter(LegacyParameter),
}

/// `items` of a non-body parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyItems {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub format: Option<String>,
    pub items: Option<Box<LegacyItems>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyResponse {
    #[serde(default)]
    pub description: String,
    pub schema: Option<SchemaOrRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LegacyResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(LegacyResponse),
}

impl Swagger {
    /// Upgrade to the canonical OpenAPI 3 form.
    pub fn upgrade(self) -> Result<OpenApiSpec, ParseError> {
        if !self.swagger.starts_with("2.") {
            return Err(ParseError::UnsupportedVersion {
                dialect: "swagger".to_string(),
                version: self.swagger.clone(),
            });
        }

        let servers = self.servers();
        let mut components = Components::default();

        for (name, schema) in &self.definitions {
            let mut schema = schema.clone();
            rewrite_schema_refs(&mut schema);
            components.schemas.insert(name.clone(), schema);
        }

        for (name, param) in &self.parameters {
            let location = format!("parameters.{name}");
            match param.location.as_str() {
                "body" => {
                    let body = self.body_request(param, &self.consumes);
                    components
                        .request_bodies
                        .insert(name.clone(), RequestBodyOrRef::RequestBody(body));
                }
                // Form fields only make sense merged into an operation's body.
                "formData" => {}
                _ => {
                    let param = convert_parameter(param, &location)?;
                    components
                        .parameters
                        .insert(name.clone(), ParameterOrRef::Parameter(param));
                }
            }
        }

        for (name, response) in &self.responses {
            components.responses.insert(
                name.clone(),
                ResponseOrRef::Response(convert_response(response, &self.produces)),
            );
        }

        let mut paths = IndexMap::new();
        for (path, item) in &self.paths {
            paths.insert(path.clone(), self.convert_path_item(path, item)?);
        }

        Ok(OpenApiSpec {
            openapi: UPGRADED_VERSION.to_string(),
            info: self.info.clone(),
            servers,
            paths,
            components,
            tags: self.tags.clone(),
        })
    }

    fn servers(&self) -> Vec<Server> {
        let base_path = self.base_path.clone().unwrap_or_default();
        match &self.host {
            Some(host) => {
                let schemes = if self.schemes.is_empty() {
                    vec!["https".to_string()]
                } else {
                    self.schemes.clone()
                };
                schemes
                    .iter()
                    .map(|scheme| Server {
                        url: format!("{scheme}://{host}{base_path}"),
                        description: None,
                    })
                    .collect()
            }
            None if !base_path.is_empty() => vec![Server {
                url: base_path,
                description: None,
            }],
            None => Vec::new(),
        }
    }

    fn convert_path_item(&self, path: &str, item: &LegacyPathItem) -> Result<PathItem, ParseError> {
        let mut converted = PathItem::default();
        let mut shared_payload = Vec::new();

        for (i, param) in item.parameters.iter().enumerate() {
            let location = format!("paths.{path}.parameters[{i}]");
            let param = self.lookup_parameter(param, &location)?;
            if is_payload(param) {
                shared_payload.push(param.clone());
            } else {
                converted
                    .parameters
                    .push(ParameterOrRef::Parameter(convert_parameter(param, &location)?));
            }
        }

        for (method, op) in item.operations() {
            let location = format!("paths.{path}.{}", method.as_str().to_ascii_lowercase());
            let op = self.convert_operation(op, &shared_payload, &location)?;
            *converted.operation_mut(method) = Some(op);
        }

        Ok(converted)
    }

    fn convert_operation(
        &self,
        op: &LegacyOperation,
        shared_payload: &[LegacyParameter],
        location: &str,
    ) -> Result<Operation, ParseError> {
        let consumes = if op.consumes.is_empty() {
            &self.consumes
        } else {
            &op.consumes
        };
        let produces = if op.produces.is_empty() {
            &self.produces
        } else {
            &op.produces
        };

        let mut parameters = Vec::new();
        let mut body = None;
        let mut form_fields: Vec<LegacyParameter> = shared_payload
            .iter()
            .filter(|p| p.location == "formData")
            .cloned()
            .collect();
        if let Some(shared_body) = shared_payload.iter().find(|p| p.location == "body") {
            body = Some(self.body_request(shared_body, consumes));
        }

        for (i, param) in op.parameters.iter().enumerate() {
            let param_location = format!("{location}.parameters[{i}]");
            let param = self.lookup_parameter(param, &param_location)?;
            match param.location.as_str() {
                "body" => body = Some(self.body_request(param, consumes)),
                "formData" => form_fields.push(param.clone()),
                _ => parameters.push(ParameterOrRef::Parameter(convert_parameter(
                    param,
                    &param_location,
                )?)),
            }
        }

        if body.is_none() && !form_fields.is_empty() {
            body = Some(form_request(&form_fields, consumes));
        }

        let responses = op
            .responses
            .iter()
            .map(|(status, response)| {
                let converted = match response {
                    LegacyResponseOrRef::Ref { ref_path } => ResponseOrRef::Ref {
                        ref_path: rewrite_ref(ref_path),
                    },
                    LegacyResponseOrRef::Response(r) => {
                        ResponseOrRef::Response(convert_response(r, produces))
                    }
                };
                (status.clone(), converted)
            })
            .collect();

        Ok(Operation {
            operation_id: op.operation_id.clone(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            tags: op.tags.clone(),
            parameters,
            request_body: body.map(RequestBodyOrRef::RequestBody),
            responses,
            deprecated: op.deprecated,
        })
    }

    /// Follow a `#/parameters/...` reference one level.
    fn lookup_parameter<'a>(
        &'a self,
        param: &'a LegacyParameterOrRef,
        location: &str,
    ) -> Result<&'a LegacyParameter, ParseError> {
        match param {
            LegacyParameterOrRef::Parameter(p) => Ok(p),
            LegacyParameterOrRef::Ref { ref_path } => ref_path
                .strip_prefix(LEGACY_PARAMETERS_REF)
                .and_then(|name| self.parameters.get(name))
                .ok_or_else(|| ParseError::Upgrade {
                    location: location.to_string(),
                    reason: format!("unresolved parameter reference `{ref_path}`"),
                }),
        }
    }

    fn body_request(&self, param: &LegacyParameter, consumes: &[String]) -> RequestBody {
        let content_type = consumes
            .iter()
            .find(|c| c.contains("json"))
            .or_else(|| consumes.first())
            .map(String::as_str)
            .unwrap_or(JSON);
        let mut schema = param.schema.clone();
        if let Some(schema) = schema.as_mut() {
            rewrite_schema_refs(schema);
        }

        let mut content = IndexMap::new();
        content.insert(content_type.to_string(), MediaType { schema });
        RequestBody {
            description: param.description.clone(),
            content,
            required: param.required,
        }
    }
}

fn is_payload(param: &LegacyParameter) -> bool {
    matches!(param.location.as_str(), "body" | "formData")
}

fn convert_parameter(param: &LegacyParameter, location: &str) -> Result<Parameter, ParseError> {
    let param_location = match param.location.as_str() {
        "query" => ParameterLocation::Query,
        "header" => ParameterLocation::Header,
        "path" => ParameterLocation::Path,
        other => {
            return Err(ParseError::Upgrade {
                location: location.to_string(),
                reason: format!("unsupported parameter location `{other}`"),
            });
        }
    };

    Ok(Parameter {
        name: param.name.clone(),
        location: param_location,
        description: param.description.clone(),
        required: param.required,
        schema: Some(parameter_schema(param).into()),
    })
}

/// Build a schema from the inline `type`/`format`/`items` of a non-body parameter.
fn parameter_schema(param: &LegacyParameter) -> Schema {
    let mut schema = inline_schema(param.param_type.as_deref(), param.format.clone());
    if let Some(items) = &param.items {
        schema.items = Some(Box::new(items_schema(items).into()));
    }
    schema.enum_values = param.enum_values.clone();
    schema
}

fn items_schema(items: &LegacyItems) -> Schema {
    let mut schema = inline_schema(items.item_type.as_deref(), items.format.clone());
    if let Some(nested) = &items.items {
        schema.items = Some(Box::new(items_schema(nested).into()));
    }
    schema
}

fn inline_schema(type_name: Option<&str>, format: Option<String>) -> Schema {
    match type_name {
        Some("file") => Schema::typed(SchemaType::String, Some("binary".to_string())),
        Some(name) => match schema_type(name) {
            Some(t) => Schema::typed(t, format),
            None => Schema {
                format,
                ..Default::default()
            },
        },
        None => Schema {
            format,
            ..Default::default()
        },
    }
}

fn schema_type(name: &str) -> Option<SchemaType> {
    match name {
        "string" => Some(SchemaType::String),
        "number" => Some(SchemaType::Number),
        "integer" => Some(SchemaType::Integer),
        "boolean" => Some(SchemaType::Boolean),
        "array" => Some(SchemaType::Array),
        "object" => Some(SchemaType::Object),
        _ => None,
    }
}

/// Merge `formData` parameters into one object-shaped request body.
fn form_request(fields: &[LegacyParameter], consumes: &[String]) -> RequestBody {
    let has_file = fields
        .iter()
        .any(|f| f.param_type.as_deref() == Some("file"));
    let content_type = if has_file || consumes.iter().any(|c| c == MULTIPART) {
        MULTIPART
    } else {
        FORM_URLENCODED
    };

    let mut schema = Schema::typed(SchemaType::Object, None);
    for field in fields {
        schema
            .properties
            .insert(field.name.clone(), parameter_schema(field).into());
        if field.required {
            schema.required.push(field.name.clone());
        }
    }

    let mut content = IndexMap::new();
    content.insert(
        content_type.to_string(),
        MediaType {
            schema: Some(schema.into()),
        },
    );
    RequestBody {
        description: None,
        content,
        required: fields.iter().any(|f| f.required),
    }
}

fn convert_response(response: &LegacyResponse, produces: &[String]) -> Response {
    let mut content = IndexMap::new();
    if let Some(schema) = &response.schema {
        let mut schema = schema.clone();
        rewrite_schema_refs(&mut schema);
        let media_type = produces.first().map(String::as_str).unwrap_or(JSON);
        content.insert(
            media_type.to_string(),
            MediaType {
                schema: Some(schema),
            },
        );
    }
    Response {
        description: response.description.clone(),
        content,
    }
}

/// Map a legacy reference onto its `#/components/...` location.
fn rewrite_ref(ref_path: &str) -> String {
    if let Some(name) = ref_path.strip_prefix(DEFINITIONS_REF) {
        format!("{SCHEMAS_REF}{name}")
    } else if let Some(name) = ref_path.strip_prefix(LEGACY_PARAMETERS_REF) {
        format!("{PARAMETERS_REF}{name}")
    } else if let Some(name) = ref_path.strip_prefix(LEGACY_RESPONSES_REF) {
        format!("{RESPONSES_REF}{name}")
    } else {
        ref_path.to_string()
    }
}

fn rewrite_schema_refs(schema: &mut SchemaOrRef) {
    match schema {
        SchemaOrRef::Ref { ref_path } => *ref_path = rewrite_ref(ref_path),
        SchemaOrRef::Schema(s) => {
            for prop in s.properties.values_mut() {
                rewrite_schema_refs(prop);
            }
            if let Some(items) = s.items.as_mut() {
                rewrite_schema_refs(items);
            }
            if let Some(AdditionalProperties::Schema(ap)) = s.additional_properties.as_mut() {
                rewrite_schema_refs(ap);
            }
        }
    }
}

