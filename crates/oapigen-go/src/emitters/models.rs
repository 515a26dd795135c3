use std::collections::HashSet;

use minijinja::{Environment, Value, context};
use oapigen_core::ir::{IrModel, IrModelKind, IrProperty, TypeRef};

use crate::go_types;
use crate::names::TypeNames;

/// Emit `model_<name>.go` for one schema.
pub fn emit_model(
    env: &Environment<'_>,
    model: &IrModel,
    types: &TypeNames,
    package: &str,
) -> Result<String, minijinja::Error> {
    let type_name = types.model(model.name.as_str());

    let description = model.description.as_deref().map(go_types::comment).unwrap_or_default();
    let doc = match description.as_slice() {
        [] => vec![format!("// {type_name} is generated from the {} schema.", model.original_name)],
        [line] => vec![format!(
            "// {type_name} represents {}",
            go_types::describe(line.trim_start_matches("// ")).unwrap_or_default()
        )],
        lines => {
            let mut doc = vec![
                format!("// {type_name} is generated from the {} schema.", model.original_name),
                "//".to_string(),
            ];
            doc.extend(lines.iter().cloned());
            doc
        }
    };

    match &model.kind {
        IrModelKind::Alias(ty) => env.get_template("model.go.j2")?.render(context! {
            package => package,
            imports => go_types::imports([ty]),
            doc => doc,
            type_name => type_name,
            alias => types.render(ty),
        }),
        IrModelKind::Struct(properties) => {
            let field_names: HashSet<&str> = properties.iter().map(|p| p.name.as_str()).collect();
            let fields: Vec<Value> = properties
                .iter()
                .map(|property| field_context(property, types))
                .collect();
            let accessors: Vec<Value> = properties
                .iter()
                .filter(|property| {
                    let name = property.name.as_str();
                    let clash = ["Get", "Has", "Set"]
                        .iter()
                        .any(|prefix| field_names.contains(format!("{prefix}{name}").as_str()));
                    if clash {
                        log::debug!(
                            "schemas.{}.{}: accessors would shadow a field, skipped",
                            model.original_name,
                            property.original_name
                        );
                    }
                    !clash
                })
                .map(|property| accessor_context(property, types))
                .collect();

            env.get_template("model.go.j2")?.render(context! {
                package => package,
                imports => go_types::imports(properties.iter().map(|p| &p.property_type)),
                doc => doc,
                type_name => type_name,
                fields => fields,
                accessors => accessors,
                receiver => go_types::receiver(type_name),
            })
        }
    }
}

/// Whether the field is declared as `*T` rather than `T`.
///
/// Models are always pointers so recursive schemas compile; optional scalars
/// are pointers so an unset field is distinguishable from its zero value.
fn is_pointer(property: &IrProperty) -> bool {
    match &property.property_type {
        TypeRef::Model(_) => true,
        ty => !property.required && !ty.is_nillable(),
    }
}

fn field_context(property: &IrProperty, types: &TypeNames) -> Value {
    let value_type = types.render(&property.property_type);
    let go_type = if is_pointer(property) {
        format!("*{value_type}")
    } else {
        value_type
    };
    let json = if property.required {
        property.original_name.clone()
    } else {
        format!("{},omitempty", property.original_name)
    };
    context! {
        name => property.name.as_str(),
        go_type => go_type,
        json => json,
        doc => property.description.as_deref().map(go_types::comment).unwrap_or_default(),
    }
}

fn accessor_context(property: &IrProperty, types: &TypeNames) -> Value {
    let pointer = is_pointer(property);
    context! {
        name => property.name.as_str(),
        value_type => types.render(&property.property_type),
        pointer => pointer,
        nillable => pointer || property.property_type.is_nillable(),
    }
}

#[cfg(test)]
mod tests {
    use oapigen_core::ir::IrSpec;

    use super::*;
    use crate::emitters::environment;
    use crate::emitters::fixtures::{PETSTORE, ir};

    fn render(ir: &IrSpec, model: &str) -> String {
        let env = environment().unwrap();
        let model = ir.models.iter().find(|m| m.name == model).unwrap();
        emit_model(&env, model, &TypeNames::new(ir), "petstore").unwrap()
    }

    #[test]
    fn test_struct_fields() {
        let out = render(&ir(PETSTORE), "Pet");
        let start = out.find("// Pet is").unwrap();
        let end = out.find("\n// GetAttributes").unwrap();
        insta::assert_snapshot!(&out[start..end], @r#"
        // Pet is generated from the Pet schema.
        type Pet struct {
        	Attributes map[string]string `json:"attributes,omitempty"`
        	BornAt *time.Time `json:"born_at,omitempty"`
        	ID int64 `json:"id"`
        	Name string `json:"name"`
        	Tag *string `json:"tag,omitempty"`
        }
        "#);
        assert!(out.contains("import (\n\t\"time\"\n)\n"));
    }

    #[test]
    fn test_accessors() {
        let out = render(&ir(PETSTORE), "Pet");
        assert!(out.contains(
            "func (p *Pet) GetTag() (ret string) {\n\tif p == nil || p.Tag == nil {\n\t\treturn ret\n\t}\n\treturn *p.Tag\n}\n"
        ));
        assert!(out.contains("func (p *Pet) HasTag() bool {\n\treturn p != nil && p.Tag != nil\n}\n"));
        assert!(out.contains("func (p *Pet) SetTag(val string) {\n\tp.Tag = &val\n}\n"));

        assert!(out.contains("func (p *Pet) GetID() (ret int64) {\n\tif p == nil {\n\t\treturn ret\n\t}\n\treturn p.ID\n}\n"));
        assert!(out.contains("func (p *Pet) HasID() bool {\n\treturn p != nil\n}\n"));
        assert!(out.contains("func (p *Pet) SetID(val int64) {\n\tp.ID = val\n}\n"));

        assert!(out.contains(
            "func (p *Pet) HasAttributes() bool {\n\treturn p != nil && p.Attributes != nil\n}\n"
        ));
        assert!(out.contains("func (p *Pet) SetBornAt(val time.Time) {\n\tp.BornAt = &val\n}\n"));
    }

    #[test]
    fn test_alias_model() {
        let out = render(&ir(PETSTORE), "Pets");
        assert_eq!(
            out,
            "// Code generated by oapigen. DO NOT EDIT.\n\npackage petstore\n\n// Pets is generated from the Pets schema.\ntype Pets []Pet\n"
        );
    }

    #[test]
    fn test_model_references_and_renames() {
        let ir = ir(r##"
openapi: 3.0.0
info: { title: t, version: "1" }
paths:
  /x:
    get: { operationId: x }
components:
  schemas:
    Service:
      description: |
        A shelter.

        Opened daily.
      type: object
      properties:
        parent: { $ref: "#/components/schemas/Service" }
        name: { type: string, description: Display name. }
        getName: { type: string }
"##);
        let out = render(&ir, "Service");
        assert!(out.contains(
            "// ServiceModel is generated from the Service schema.\n//\n// A shelter.\n//\n// Opened daily.\ntype ServiceModel struct {\n"
        ));
        assert!(out.contains("\t// Display name.\n\tName *string `json:\"name,omitempty\"`\n"));
        assert!(out.contains("\tParent *ServiceModel `json:\"parent,omitempty\"`\n"));
        assert!(out.contains("func (s *ServiceModel) GetParent() (ret ServiceModel) {\n"));
        assert!(!out.contains(") GetName()"));
        assert!(out.contains("func (s *ServiceModel) GetGetName() (ret string) {\n"));
    }
}
