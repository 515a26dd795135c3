use std::collections::HashMap;

use crate::error::DiagnosticKind;
use crate::ir::{Identifier, TypeRef};
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};
use crate::parse::spec::Components;

use super::name_normalizer::normalize;

/// Type and format names mapped to Go types. Formats are looked up before types.
const TYPE_TABLE: &[(&str, &str)] = &[
    ("integer", "int32"),
    ("int32", "int32"),
    ("int64", "int64"),
    ("long", "int64"),
    ("number", "float32"),
    ("float", "float32"),
    ("double", "float64"),
    ("BigDecimal", "float64"),
    ("boolean", "bool"),
    ("string", "string"),
    ("uuid", "string"),
    ("UUID", "string"),
    ("uri", "string"),
    ("URI", "string"),
    ("date", "string"),
    ("password", "string"),
    ("byte", "string"),
    ("binary", "string"),
    ("ByteArray", "string"),
    ("date-time", "time.Time"),
    ("DateTime", "time.Time"),
    ("file", "*os.File"),
    ("File", "*os.File"),
    ("array", "[]interface{}"),
    ("object", "map[string]interface{}"),
];

/// How many levels of array items / additionalProperties are followed.
const NESTING_DEPTH: u8 = 1;

fn lookup(key: &str) -> Option<&'static str> {
    TYPE_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, target)| *target)
}

/// Map a type/format pair through the scalar table.
pub fn scalar(type_name: &str, format: Option<&str>) -> Option<&'static str> {
    format.and_then(lookup).or_else(|| lookup(type_name))
}

/// Resolves document schemas to Go types against one set of components.
pub struct TypeMapper<'a> {
    components: &'a Components,
    /// Raw schema name to model name, once the emitted models are known.
    /// Until then every component schema counts as a model.
    models: Option<HashMap<String, Identifier>>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(components: &'a Components) -> Self {
        Self {
            components,
            models: None,
        }
    }

    /// Only resolve references to these schemas; anything else is unresolved.
    pub fn restrict_models(&mut self, models: HashMap<String, Identifier>) {
        self.models = Some(models);
    }

    /// Resolve a schema to a Go type.
    ///
    /// The error names why the schema has no Go counterpart; callers drop the
    /// element it belongs to.
    pub fn resolve(&self, schema: &SchemaOrRef) -> Result<TypeRef, DiagnosticKind> {
        self.resolve_at(schema, NESTING_DEPTH)
    }

    /// Resolve the body of a named component schema without treating it as a reference.
    pub fn resolve_schema(&self, schema: &Schema) -> Result<TypeRef, DiagnosticKind> {
        self.resolve_inline(schema, NESTING_DEPTH)
    }

    /// The generated model type for a `#/components/schemas/...` reference.
    pub fn model(&self, ref_path: &str) -> Result<TypeRef, DiagnosticKind> {
        let unresolved = || DiagnosticKind::UnresolvedRef(ref_path.to_string());
        let (raw, _) = self.components.schema(ref_path).ok_or_else(unresolved)?;
        match &self.models {
            Some(models) => models
                .get(raw)
                .map(|name| TypeRef::Model(name.to_string()))
                .ok_or_else(unresolved),
            None => Ok(TypeRef::Model(normalize(raw, true).to_string())),
        }
    }

    fn resolve_at(&self, schema: &SchemaOrRef, depth: u8) -> Result<TypeRef, DiagnosticKind> {
        match schema {
            SchemaOrRef::Ref { ref_path } => self.model(ref_path),
            SchemaOrRef::Schema(schema) => self.resolve_inline(schema, depth),
        }
    }

    fn resolve_inline(&self, schema: &Schema, depth: u8) -> Result<TypeRef, DiagnosticKind> {
        let format = schema.format.as_deref();
        match schema.type_name() {
            Some("array") => match &schema.items {
                Some(items) if depth > 0 => {
                    Ok(TypeRef::sequence(self.resolve_at(items, depth - 1)?))
                }
                _ => table(SchemaType::Array.as_str(), None),
            },
            Some("object") => match schema.additional_schema() {
                Some(additional) if depth > 0 => {
                    Ok(TypeRef::map(self.resolve_additional(additional, depth - 1)?))
                }
                _ => table(SchemaType::Object.as_str(), None),
            },
            Some(type_name) => table(type_name, format),
            None => match format {
                Some(format) => table(format, None),
                None => Err(DiagnosticKind::UnmappedType("untyped schema".to_string())),
            },
        }
    }

    /// Resolve the value shape of an `additionalProperties` schema.
    ///
    /// Arrays resolve their items; objects use their own `items` when
    /// present, otherwise their declared type.
    fn resolve_additional(
        &self,
        additional: &SchemaOrRef,
        depth: u8,
    ) -> Result<TypeRef, DiagnosticKind> {
        let SchemaOrRef::Schema(schema) = additional else {
            return self.resolve_at(additional, depth);
        };
        match (schema.type_name(), &schema.items) {
            (Some("array"), Some(items)) => Ok(TypeRef::sequence(self.resolve_at(items, depth)?)),
            (Some("object"), Some(items)) => self.resolve_at(items, depth),
            (Some("object"), None) => table(SchemaType::Object.as_str(), None),
            _ => self.resolve_inline(schema, depth),
        }
    }
}

fn table(type_name: &str, format: Option<&str>) -> Result<TypeRef, DiagnosticKind> {
    scalar(type_name, format)
        .map(TypeRef::Scalar)
        .ok_or_else(|| match format {
            Some(format) => DiagnosticKind::UnmappedType(format!("{type_name}/{format}")),
            None => DiagnosticKind::UnmappedType(type_name.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components() -> Components {
        serde_json::from_str(
            r#"{"schemas": {"Pet": {"type": "object"}, "pet-tag": {"type": "string"}}}"#,
        )
        .unwrap()
    }

    fn resolve(mapper: &TypeMapper, json: &str) -> Result<TypeRef, DiagnosticKind> {
        let schema: SchemaOrRef = serde_json::from_str(json).unwrap();
        mapper.resolve(&schema)
    }

    fn render(mapper: &TypeMapper, json: &str) -> String {
        resolve(mapper, json).unwrap().to_string()
    }

    #[test]
    fn test_scalar_format_first() {
        assert_eq!(scalar("integer", None), Some("int32"));
        assert_eq!(scalar("integer", Some("int64")), Some("int64"));
        assert_eq!(scalar("string", Some("date-time")), Some("time.Time"));
        assert_eq!(scalar("string", Some("email")), Some("string"));
        assert_eq!(scalar("number", Some("double")), Some("float64"));
        assert_eq!(scalar("null", None), None);
    }

    #[test]
    fn test_primitives() {
        let c = components();
        let m = TypeMapper::new(&c);
        assert_eq!(render(&m, r#"{"type": "boolean"}"#), "bool");
        assert_eq!(render(&m, r#"{"type": "string", "format": "binary"}"#), "string");
        assert_eq!(render(&m, r#"{"type": ["string", "null"]}"#), "string");
        assert_eq!(render(&m, r#"{"type": "object"}"#), "map[string]interface{}");
    }

    #[test]
    fn test_array_items() {
        let c = components();
        let m = TypeMapper::new(&c);
        assert_eq!(
            render(&m, r#"{"type": "array", "items": {"type": "integer", "format": "int64"}}"#),
            "[]int64"
        );
        assert_eq!(
            render(&m, r##"{"type": "array", "items": {"$ref": "#/components/schemas/Pet"}}"##),
            "[]Pet"
        );
        assert_eq!(render(&m, r#"{"type": "array"}"#), "[]interface{}");
    }

    #[test]
    fn test_nesting_is_bounded() {
        let c = components();
        let m = TypeMapper::new(&c);
        let nested = r#"{"type": "array", "items": {"type": "array", "items": {"type": "string"}}}"#;
        assert_eq!(render(&m, nested), "[][]interface{}");
    }

    #[test]
    fn test_additional_properties() {
        let c = components();
        let m = TypeMapper::new(&c);
        assert_eq!(
            render(&m, r#"{"type": "object", "additionalProperties": {"type": "integer"}}"#),
            "map[string]int32"
        );
        assert_eq!(
            render(
                &m,
                r#"{"type": "object", "additionalProperties": {"type": "array", "items": {"type": "string"}}}"#
            ),
            "map[string][]string"
        );
        assert_eq!(
            render(
                &m,
                r#"{"type": "object", "additionalProperties": {"type": "object", "items": {"type": "boolean"}}}"#
            ),
            "map[string]bool"
        );
        assert_eq!(
            render(
                &m,
                r#"{"type": "object", "additionalProperties": {"type": "object"}}"#
            ),
            "map[string]map[string]interface{}"
        );
        assert_eq!(
            render(&m, r#"{"type": "object", "additionalProperties": true}"#),
            "map[string]interface{}"
        );
    }

    #[test]
    fn test_refs() {
        let c = components();
        let m = TypeMapper::new(&c);
        assert_eq!(
            resolve(&m, r##"{"$ref": "#/components/schemas/pet-tag"}"##),
            Ok(TypeRef::Model("PetTag".to_string()))
        );
        assert_eq!(
            resolve(&m, r##"{"$ref": "#/components/schemas/Missing"}"##),
            Err(DiagnosticKind::UnresolvedRef(
                "#/components/schemas/Missing".to_string()
            ))
        );
    }

    #[test]
    fn test_restricted_models() {
        let c = components();
        let mut m = TypeMapper::new(&c);
        m.restrict_models(HashMap::from([("Pet".to_string(), normalize("Pet", true))]));
        assert_eq!(
            render(&m, r##"{"type": "array", "items": {"$ref": "#/components/schemas/Pet"}}"##),
            "[]Pet"
        );
        assert_eq!(
            resolve(&m, r##"{"$ref": "#/components/schemas/pet-tag"}"##),
            Err(DiagnosticKind::UnresolvedRef(
                "#/components/schemas/pet-tag".to_string()
            ))
        );
        assert!(
            resolve(
                &m,
                r##"{"type": "object", "additionalProperties": {"$ref": "#/components/schemas/pet-tag"}}"##
            )
            .is_err()
        );
    }

    #[test]
    fn test_unmapped() {
        let c = components();
        let m = TypeMapper::new(&c);
        assert_eq!(
            resolve(&m, r#"{"type": "null"}"#),
            Err(DiagnosticKind::UnmappedType("null".to_string()))
        );
        assert!(resolve(&m, "{}").is_err());
        assert!(
            resolve(
                &m,
                r#"{"type": "array", "items": {"type": "null"}}"#
            )
            .is_err()
        );
    }
}
