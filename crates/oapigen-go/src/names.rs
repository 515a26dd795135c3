use std::collections::{HashMap, HashSet};

use oapigen_core::ir::{IrMethod, IrService, IrSpec, TypeRef};

/// Package-level names every generated client declares.
const FIXED_DECLARATIONS: &[&str] = &["APIError", "APIVersion", "NewService", "Service", "UserAgent"];

/// Fields of `Service` that are not per-service.
const SERVICE_FIELDS: &[&str] = &["BasePath", "UserAgent"];

/// Go type name of a service: `Pet` → `PetService`.
pub fn service_type(service: &IrService) -> String {
    format!("{}Service", service.name)
}

/// Go type name of a method's call builder: `PetListPetsCall`.
pub fn call_type(service: &IrService, method: &IrMethod) -> String {
    format!("{}{}Call", service.name, method.name)
}

/// Field of the root `Service` that holds `service`.
pub fn service_field(service: &IrService) -> String {
    if SERVICE_FIELDS.contains(&service.name.as_str()) {
        service_type(service)
    } else {
        service.name.to_string()
    }
}

/// Package-level type names for one generated package.
///
/// Models whose names clash with a declaration the client already makes
/// (`Service`, a `...Service` type, a `...Call` builder) get a `Model` suffix.
#[derive(Debug, Default)]
pub struct TypeNames {
    models: HashMap<String, String>,
}

impl TypeNames {
    pub fn new(ir: &IrSpec) -> Self {
        let mut declared: HashSet<String> =
            FIXED_DECLARATIONS.iter().map(|s| s.to_string()).collect();
        for service in &ir.services {
            let type_name = service_type(service);
            declared.insert(format!("New{type_name}"));
            declared.insert(type_name);
            for method in &service.methods {
                declared.insert(call_type(service, method));
            }
        }

        let mut taken = declared.clone();
        taken.extend(ir.models.iter().map(|m| m.name.to_string()));

        let mut models = HashMap::new();
        for model in &ir.models {
            if !declared.contains(model.name.as_str()) {
                continue;
            }
            let mut name = format!("{}Model", model.name);
            while taken.contains(&name) {
                name.push_str("Model");
            }
            log::warn!(
                "schemas.{}: Go type `{}` is already declared, using `{name}`",
                model.original_name,
                model.name
            );
            taken.insert(name.clone());
            models.insert(model.name.to_string(), name);
        }
        Self { models }
    }

    /// The declared name of a model.
    pub fn model<'a>(&'a self, name: &'a str) -> &'a str {
        self.models.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Render a type with model renames applied.
    pub fn render(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Scalar(name) => (*name).to_string(),
            TypeRef::Model(name) => self.model(name).to_string(),
            TypeRef::Sequence(inner) => format!("[]{}", self.render(inner)),
            TypeRef::Map(inner) => format!("map[string]{}", self.render(inner)),
        }
    }
}
