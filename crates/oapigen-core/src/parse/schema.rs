use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

impl SchemaType {
    /// The keyword as written in a document; also the key used by the type table.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Null => "null",
        }
    }
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

/// A reference or inline schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    pub fn reference(ref_path: impl Into<String>) -> Self {
        SchemaOrRef::Ref {
            ref_path: ref_path.into(),
        }
    }
}

impl From<Schema> for SchemaOrRef {
    fn from(schema: Schema) -> Self {
        SchemaOrRef::Schema(Box::new(schema))
    }
}

/// The subset of a JSON Schema object the generator reads. Unknown keywords are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,
}

impl Schema {
    /// A schema with just a `type` and optional `format`.
    pub fn typed(schema_type: SchemaType, format: Option<String>) -> Self {
        Schema {
            schema_type: Some(TypeSet::Single(schema_type)),
            format,
            ..Default::default()
        }
    }

    /// The effective type keyword.
    ///
    /// A multi-type set yields its first non-null member. A schema without
    /// `type` is inferred from its shape: `properties` or
    /// `additionalProperties` make it an object, `items` an array.
    pub fn type_name(&self) -> Option<&'static str> {
        match &self.schema_type {
            Some(TypeSet::Single(t)) => Some(t.as_str()),
            Some(TypeSet::Multiple(types)) => types
                .iter()
                .find(|t| **t != SchemaType::Null)
                .or_else(|| types.first())
                .map(SchemaType::as_str),
            None if !self.properties.is_empty() || self.additional_properties.is_some() => {
                Some(SchemaType::Object.as_str())
            }
            None if self.items.is_some() => Some(SchemaType::Array.as_str()),
            None => None,
        }
    }

    /// The schema declared by `additionalProperties`, if it is a schema rather than a flag.
    pub fn additional_schema(&self) -> Option<&SchemaOrRef> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(schema)) => Some(schema),
            _ => None,
        }
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_multi() {
        let schema: Schema = serde_json::from_str(r#"{"type": ["null", "integer"]}"#).unwrap();
        assert_eq!(schema.type_name(), Some("integer"));
    }

    #[test]
    fn test_type_name_inferred() {
        let object: Schema =
            serde_json::from_str(r#"{"properties": {"a": {"type": "string"}}}"#).unwrap();
        assert_eq!(object.type_name(), Some("object"));

        let array: Schema = serde_json::from_str(r#"{"items": {"type": "string"}}"#).unwrap();
        assert_eq!(array.type_name(), Some("array"));

        assert_eq!(Schema::default().type_name(), None);
    }

    #[test]
    fn test_additional_properties_forms() {
        let flag: Schema = serde_json::from_str(r#"{"additionalProperties": true}"#).unwrap();
        assert!(flag.additional_schema().is_none());

        let nested: Schema =
            serde_json::from_str(r#"{"additionalProperties": {"type": "integer"}}"#).unwrap();
        assert!(matches!(
            nested.additional_schema(),
            Some(SchemaOrRef::Schema(s)) if s.type_name() == Some("integer")
        ));
    }
}
