use std::fmt;

use super::types::Identifier;

/// A named schema.
#[derive(Debug, Clone)]
pub struct IrModel {
    pub original_name: String,
    pub name: Identifier,
    pub description: Option<String>,
    pub kind: IrModelKind,
}

#[derive(Debug, Clone)]
pub enum IrModelKind {
    /// An object schema; properties sorted by raw name.
    Struct(Vec<IrProperty>),
    /// Any other shape, rendered as a named alias of the mapped type.
    Alias(TypeRef),
}

/// A property of an object schema.
#[derive(Debug, Clone)]
pub struct IrProperty {
    pub original_name: String,
    pub name: Identifier,
    pub property_type: TypeRef,
    pub required: bool,
    pub description: Option<String>,
}

/// A resolved Go type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A type straight from the scalar table, e.g. `int64` or `time.Time`.
    Scalar(&'static str),
    /// A generated model type.
    Model(String),
    /// `[]T`
    Sequence(Box<TypeRef>),
    /// `map[string]T`
    Map(Box<TypeRef>),
}

impl TypeRef {
    pub fn sequence(element: TypeRef) -> Self {
        TypeRef::Sequence(Box::new(element))
    }

    pub fn map(value: TypeRef) -> Self {
        TypeRef::Map(Box::new(value))
    }

    /// Whether the rendered type already has a usable zero value of `nil`.
    pub fn is_nillable(&self) -> bool {
        match self {
            TypeRef::Sequence(_) | TypeRef::Map(_) => true,
            TypeRef::Scalar(name) => {
                name.starts_with('*')
                    || name.starts_with("[]")
                    || name.starts_with("map[")
                    || *name == "interface{}"
            }
            TypeRef::Model(_) => false,
        }
    }

    /// Go package the rendered type needs, if any.
    pub fn import(&self) -> Option<&'static str> {
        match self {
            TypeRef::Scalar(name) if name.contains("time.") => Some("time"),
            TypeRef::Scalar(name) if name.contains("os.") => Some("os"),
            TypeRef::Scalar(_) | TypeRef::Model(_) => None,
            TypeRef::Sequence(inner) | TypeRef::Map(inner) => inner.import(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(name) => f.write_str(name),
            TypeRef::Model(name) => f.write_str(name),
            TypeRef::Sequence(inner) => write!(f, "[]{inner}"),
            TypeRef::Map(inner) => write!(f, "map[string]{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let t = TypeRef::map(TypeRef::sequence(TypeRef::Model("Pet".into())));
        assert_eq!(t.to_string(), "map[string][]Pet");
    }

    #[test]
    fn test_import() {
        assert_eq!(
            TypeRef::sequence(TypeRef::Scalar("time.Time")).import(),
            Some("time")
        );
        assert_eq!(TypeRef::Scalar("*os.File").import(), Some("os"));
        assert_eq!(TypeRef::Scalar("int64").import(), None);
    }

    #[test]
    fn test_nillable() {
        assert!(TypeRef::Scalar("map[string]interface{}").is_nillable());
        assert!(TypeRef::Scalar("*os.File").is_nillable());
        assert!(!TypeRef::Scalar("string").is_nillable());
        assert!(!TypeRef::Model("Pet".into()).is_nillable());
    }
}
