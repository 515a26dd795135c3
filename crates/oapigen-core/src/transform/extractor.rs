use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::config::TagAttachment;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::ir::{
    HttpMethod, Identifier, IrInfo, IrMethod, IrModel, IrModelKind, IrParameter,
    IrParameterLocation, IrProperty, IrRequestBody, IrServer, IrService, IrSpec, TypeRef,
};
use crate::parse::operation::{
    Operation, Parameter, ParameterLocation, ParameterOrRef, PathItem, RequestBodyOrRef,
    ResponseOrRef, preferred_media_type,
};
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::parse::spec::OpenApiSpec;

use super::name_normalizer::{normalize, operation_identifier, parameter_identifier, route_to_name};
use super::type_mapper::TypeMapper;

/// Raw name of the service that collects untagged operations.
const DEFAULT_SERVICE: &str = "default";

/// Suffix of the per-operation call type; part of the method collision key.
const CALL_SUFFIX: &str = "Call";

/// Options controlling how operations are grouped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub tag_attachment: TagAttachment,
}

/// One (path, method) pair attached to a service.
#[derive(Debug, Clone, Copy)]
struct Route<'a> {
    path: &'a str,
    method: HttpMethod,
    item: &'a PathItem,
    op: &'a Operation,
}

/// A service before its methods are built.
#[derive(Debug, Clone)]
struct Bucket<'a> {
    name: Identifier,
    original_name: Option<String>,
    description: Option<String>,
    routes: Vec<Route<'a>>,
}

/// Builds the IR from a canonical document.
///
/// Services, methods and models are each computed once per instance; later
/// calls return the stored result. Soft failures are collected as
/// diagnostics and the offending element is left out.
pub struct Extractor<'a> {
    spec: &'a OpenApiSpec,
    options: ExtractOptions,
    types: TypeMapper<'a>,
    partition: Option<Vec<Bucket<'a>>>,
    services: Option<Vec<IrService>>,
    models: Option<Vec<IrModel>>,
    /// Whether `types` only resolves references to emitted models.
    models_restricted: bool,
    /// `<Service><Method>Call` names already emitted.
    seen: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Extractor<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self::with_options(spec, ExtractOptions::default())
    }

    pub fn with_options(spec: &'a OpenApiSpec, options: ExtractOptions) -> Self {
        Self {
            spec,
            options,
            types: TypeMapper::new(&spec.components),
            partition: None,
            services: None,
            models: None,
            models_restricted: false,
            seen: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Services sorted by normalized name, each with its sorted methods.
    pub fn services(&mut self) -> &[IrService] {
        if self.services.is_none() {
            let services = self.build_services();
            self.services = Some(services);
        }
        self.services.as_deref().unwrap_or(&[])
    }

    /// One model per component schema, sorted by raw schema name.
    pub fn models(&mut self) -> &[IrModel] {
        if self.models.is_none() {
            let models = self.build_models();
            self.models = Some(models);
        }
        self.models.as_deref().unwrap_or(&[])
    }

    /// Soft failures recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Run every extraction step and hand over the result.
    pub fn into_ir(mut self) -> IrSpec {
        self.services();
        self.models();

        let info = IrInfo {
            title: self.spec.info.title.clone(),
            description: self.spec.info.description.clone(),
            version: self.spec.info.version.clone(),
        };
        let servers = self
            .spec
            .servers
            .iter()
            .map(|s| IrServer {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect();

        IrSpec {
            info,
            servers,
            services: self.services.unwrap_or_default(),
            models: self.models.unwrap_or_default(),
            diagnostics: self.diagnostics,
        }
    }

    fn record(&mut self, location: impl Into<String>, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            location: location.into(),
            kind,
        };
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    // --- service partition ---

    fn partition(&mut self) -> &[Bucket<'a>] {
        if self.partition.is_none() {
            let partition = self.build_partition();
            self.partition = Some(partition);
        }
        self.partition.as_deref().unwrap_or(&[])
    }

    fn build_partition(&mut self) -> Vec<Bucket<'a>> {
        let spec = self.spec;
        let mut buckets: IndexMap<Identifier, Bucket<'a>> = IndexMap::new();

        if spec.tags.is_empty() {
            let bucket = default_bucket();
            buckets.insert(bucket.name.clone(), bucket);
        }
        for tag in &spec.tags {
            let name = normalize(&tag.name, true);
            match buckets.get_mut(&name) {
                Some(existing) => {
                    if existing.description.is_none() {
                        existing.description = tag.description.clone();
                    }
                    self.record(
                        format!("tags.{}", tag.name),
                        DiagnosticKind::DuplicateService(name.to_string()),
                    );
                }
                None => {
                    buckets.insert(
                        name.clone(),
                        Bucket {
                            name,
                            original_name: Some(tag.name.clone()),
                            description: tag.description.clone(),
                            routes: Vec::new(),
                        },
                    );
                }
            }
        }
        let declared: Vec<Identifier> = buckets
            .values()
            .filter(|b| b.original_name.is_some())
            .map(|b| b.name.clone())
            .collect();

        for (path, item) in &spec.paths {
            for (method, op) in item.operations() {
                let route = Route {
                    path: path.as_str(),
                    method,
                    item,
                    op,
                };
                let location = route_location(method, path);

                match op.tags.as_slice() {
                    [] => attach_default(&mut buckets, route),
                    [_] if declared.is_empty() => attach_default(&mut buckets, route),
                    [tag] => match self.options.tag_attachment {
                        TagAttachment::AllServices => {
                            for name in &declared {
                                if let Some(bucket) = buckets.get_mut(name) {
                                    bucket.routes.push(route);
                                }
                            }
                        }
                        TagAttachment::ByName => {
                            let name = normalize(tag, true);
                            if declared.contains(&name) {
                                if let Some(bucket) = buckets.get_mut(&name) {
                                    bucket.routes.push(route);
                                }
                            } else {
                                self.record(
                                    location,
                                    DiagnosticKind::UndeclaredTag(tag.clone()),
                                );
                                attach_default(&mut buckets, route);
                            }
                        }
                    },
                    tags => {
                        self.record(location, DiagnosticKind::MultipleTags(tags.len()));
                    }
                }
            }
        }

        let mut partition: Vec<Bucket<'a>> = buckets.into_values().collect();
        partition.sort_by(|a, b| a.name.cmp(&b.name));
        log::debug!("partitioned operations into {} services", partition.len());
        partition
    }

    // --- methods ---

    fn build_services(&mut self) -> Vec<IrService> {
        self.restrict_models();
        let buckets = self.partition().to_vec();
        buckets
            .into_iter()
            .map(|bucket| {
                let methods = self.build_methods(&bucket);
                IrService {
                    name: bucket.name,
                    original_name: bucket.original_name,
                    description: bucket.description,
                    methods,
                }
            })
            .collect()
    }

    fn build_methods(&mut self, bucket: &Bucket<'a>) -> Vec<IrMethod> {
        let mut routes = bucket.routes.clone();
        routes.sort_by(|a, b| {
            a.path
                .cmp(b.path)
                .then_with(|| a.method.as_str().cmp(b.method.as_str()))
        });

        let mut methods = Vec::with_capacity(routes.len());
        for route in routes {
            let location = route_location(route.method, route.path);
            let original_name = route
                .op
                .operation_id
                .clone()
                .unwrap_or_else(|| route_to_name(route.method.as_str(), route.path));
            let name = operation_identifier(&original_name);
            if name.as_str().is_empty() {
                self.record(location, DiagnosticKind::EmptyIdentifier(original_name));
                continue;
            }

            let call_type = format!("{}{}{CALL_SUFFIX}", bucket.name, name);
            if !self.seen.insert(call_type.clone()) {
                self.record(location, DiagnosticKind::DuplicateMethod(call_type));
                continue;
            }

            methods.push(self.build_method(route, original_name, name, &location));
        }
        log::debug!("service {}: {} methods", bucket.name, methods.len());
        methods
    }

    fn build_method(
        &mut self,
        route: Route<'a>,
        original_name: String,
        name: Identifier,
        location: &str,
    ) -> IrMethod {
        let mut path_params = Vec::new();
        let mut query_params = Vec::new();
        let mut header_params = Vec::new();
        let mut cookie_params = Vec::new();

        for param in self.collect_parameters(route, location) {
            let Some(param) = self.build_parameter(param, location) else {
                continue;
            };
            match param.location {
                IrParameterLocation::Path => path_params.push(param),
                IrParameterLocation::Query => query_params.push(param),
                IrParameterLocation::Header => header_params.push(param),
                IrParameterLocation::Cookie => cookie_params.push(param),
            }
        }
        // Arguments share one namespace; earlier locations win.
        let mut used: HashSet<Identifier> = HashSet::new();
        for bucket in [
            &mut path_params,
            &mut query_params,
            &mut header_params,
            &mut cookie_params,
        ] {
            bucket.sort_by(|a, b| a.original_name.cmp(&b.original_name));
            let mut kept = Vec::with_capacity(bucket.len());
            for param in bucket.drain(..) {
                if used.insert(param.name.clone()) {
                    kept.push(param);
                } else {
                    self.record(
                        format!("{location} parameter `{}`", param.original_name),
                        DiagnosticKind::DuplicateParameter(param.name.to_string()),
                    );
                }
            }
            *bucket = kept;
        }
        let path_params = self.order_path_params(route.path, path_params, location);

        IrMethod {
            original_name,
            name,
            method: route.method,
            path: route.path.to_string(),
            summary: route.op.summary.clone(),
            description: route.op.description.clone(),
            deprecated: route.op.deprecated.unwrap_or(false),
            path_params,
            query_params,
            header_params,
            cookie_params,
            request_body: self.request_body(route.op, location),
            response: self.response(route.op, location),
        }
    }

    /// Path-item parameters followed by the operation's own; the operation
    /// wins on the same name and location.
    fn collect_parameters(&mut self, route: Route<'a>, location: &str) -> Vec<&'a Parameter> {
        let mut merged: Vec<&'a Parameter> = Vec::new();
        for param in route.item.parameters.iter().chain(&route.op.parameters) {
            let Some(param) = self.lookup_parameter(param, location) else {
                continue;
            };
            match merged
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(slot) => *slot = param,
                None => merged.push(param),
            }
        }
        merged
    }

    fn lookup_parameter(
        &mut self,
        param: &'a ParameterOrRef,
        location: &str,
    ) -> Option<&'a Parameter> {
        let spec = self.spec;
        match param {
            ParameterOrRef::Parameter(p) => Some(p),
            ParameterOrRef::Ref { ref_path } => match spec.components.parameter(ref_path) {
                Some(ParameterOrRef::Parameter(p)) => Some(p),
                _ => {
                    self.record(location, DiagnosticKind::UnresolvedRef(ref_path.clone()));
                    None
                }
            },
        }
    }

    fn build_parameter(&mut self, param: &Parameter, location: &str) -> Option<IrParameter> {
        let param_location = format!("{location} parameter `{}`", param.name);
        let name = parameter_identifier(&param.name);
        if name.as_str().is_empty() {
            self.record(
                param_location,
                DiagnosticKind::EmptyIdentifier(param.name.clone()),
            );
            return None;
        }
        let resolved = match &param.schema {
            Some(schema) => self.types.resolve(schema),
            None => Err(DiagnosticKind::UnmappedType("parameter without schema".to_string())),
        };
        let param_type = match resolved {
            Ok(t) => t,
            Err(kind) => {
                self.record(param_location, kind);
                return None;
            }
        };

        Some(IrParameter {
            original_name: param.name.clone(),
            name,
            location: match param.location {
                ParameterLocation::Path => IrParameterLocation::Path,
                ParameterLocation::Query => IrParameterLocation::Query,
                ParameterLocation::Header => IrParameterLocation::Header,
                ParameterLocation::Cookie => IrParameterLocation::Cookie,
            },
            param_type,
            required: param.required || param.location == ParameterLocation::Path,
            description: param.description.clone(),
        })
    }

    /// Reorder path parameters to follow the `{name}` placeholders of `path`.
    ///
    /// Placeholders without a parameter stay in the path untouched; declared
    /// path parameters that the template never mentions are dropped.
    fn order_path_params(
        &mut self,
        path: &str,
        params: Vec<IrParameter>,
        location: &str,
    ) -> Vec<IrParameter> {
        let mut remaining = params;
        let mut ordered = Vec::with_capacity(remaining.len());

        for placeholder in placeholders(path) {
            match remaining.iter().position(|p| p.original_name == placeholder) {
                Some(idx) => ordered.push(remaining.remove(idx)),
                None if ordered
                    .iter()
                    .any(|p: &IrParameter| p.original_name == placeholder) => {}
                None => self.record(
                    location,
                    DiagnosticKind::UnmatchedPlaceholder(placeholder.to_string()),
                ),
            }
        }
        for param in remaining {
            self.record(
                location,
                DiagnosticKind::UnusedPathParameter(param.original_name),
            );
        }
        ordered
    }

    fn request_body(&mut self, op: &'a Operation, location: &str) -> Option<IrRequestBody> {
        let spec = self.spec;
        let body = match op.request_body.as_ref()? {
            RequestBodyOrRef::RequestBody(body) => body,
            RequestBodyOrRef::Ref { ref_path } => match spec.components.request_body(ref_path) {
                Some(RequestBodyOrRef::RequestBody(body)) => body,
                _ => {
                    self.record(location, DiagnosticKind::UnresolvedRef(ref_path.clone()));
                    return None;
                }
            },
        };

        let body_location = format!("{location} request body");
        let (content_type, media) = preferred_media_type(&body.content)?;
        let resolved = match &media.schema {
            Some(schema) => self.types.resolve(schema),
            None => Err(DiagnosticKind::UnmappedType(content_type.to_string())),
        };
        match resolved {
            Ok(body_type) => Some(IrRequestBody {
                body_type,
                content_type: content_type.to_string(),
                required: body.required,
                description: body.description.clone(),
            }),
            Err(kind) => {
                self.record(body_location, kind);
                None
            }
        }
    }

    /// Type of the first 2xx response in status order, falling back to `default`.
    fn response(&mut self, op: &'a Operation, location: &str) -> Option<TypeRef> {
        let spec = self.spec;
        let (status, response) = op
            .responses
            .iter()
            .filter(|(status, _)| status.starts_with('2'))
            .min_by(|a, b| a.0.cmp(b.0))
            .or_else(|| op.responses.get_key_value("default"))?;

        let response = match response {
            ResponseOrRef::Response(r) => r,
            ResponseOrRef::Ref { ref_path } => match spec.components.response(ref_path) {
                Some(ResponseOrRef::Response(r)) => r,
                _ => {
                    self.record(location, DiagnosticKind::UnresolvedRef(ref_path.clone()));
                    return None;
                }
            },
        };

        // A response without content has no typed body.
        let schema = preferred_media_type(&response.content)?.1.schema.as_ref()?;
        match self.types.resolve(schema) {
            Ok(t) => Some(t),
            Err(kind) => {
                self.record(format!("{location} response {status}"), kind);
                None
            }
        }
    }

    // --- models ---

    /// Settle which schemas become models before anything resolves a reference.
    ///
    /// A schema is dropped when its name collides with an earlier one or when
    /// its alias target cannot be resolved. Dropping one alias can strand
    /// another, so the pass repeats until nothing changes.
    fn restrict_models(&mut self) {
        if self.models_restricted {
            return;
        }
        self.models_restricted = true;

        let spec = self.spec;
        let mut names: Vec<&'a String> = spec.components.schemas.keys().collect();
        names.sort();

        let mut used: HashSet<Identifier> = HashSet::new();
        let mut accepted: HashMap<String, Identifier> = HashMap::new();
        for raw in names {
            let name = normalize(raw, true);
            if !name.as_str().is_empty() && used.insert(name.clone()) {
                accepted.insert(raw.clone(), name);
            }
        }

        loop {
            self.types.restrict_models(accepted.clone());
            let stranded: Vec<String> = accepted
                .keys()
                .filter(|raw| {
                    spec.components.schemas.get(raw.as_str()).is_some_and(|schema| {
                        match schema {
                            SchemaOrRef::Schema(s) if is_struct(s) => false,
                            SchemaOrRef::Schema(s) => self.types.resolve_schema(s).is_err(),
                            SchemaOrRef::Ref { .. } => self.types.resolve(schema).is_err(),
                        }
                    })
                })
                .cloned()
                .collect();
            if stranded.is_empty() {
                break;
            }
            for raw in stranded {
                accepted.remove(&raw);
            }
        }
        log::debug!("{} schemas accepted as models", accepted.len());
    }

    fn build_models(&mut self) -> Vec<IrModel> {
        self.restrict_models();
        let spec = self.spec;
        let mut names: Vec<&'a String> = spec.components.schemas.keys().collect();
        names.sort();

        let mut used: HashSet<Identifier> = HashSet::new();
        let mut models = Vec::with_capacity(names.len());
        for raw in names {
            let Some(schema) = spec.components.schemas.get(raw) else {
                continue;
            };
            let location = format!("schemas.{raw}");
            let name = normalize(raw, true);
            if name.as_str().is_empty() {
                self.record(location, DiagnosticKind::EmptyIdentifier(raw.clone()));
                continue;
            }
            if !used.insert(name.clone()) {
                self.record(location, DiagnosticKind::DuplicateModel(name.to_string()));
                continue;
            }

            let (description, kind) = match schema {
                SchemaOrRef::Schema(s) if is_struct(s) => (
                    s.description.clone().or_else(|| s.title.clone()),
                    IrModelKind::Struct(self.build_properties(s, &location)),
                ),
                SchemaOrRef::Schema(s) => match self.types.resolve_schema(s) {
                    Ok(target) => (
                        s.description.clone().or_else(|| s.title.clone()),
                        IrModelKind::Alias(target),
                    ),
                    Err(kind) => {
                        self.record(location, kind);
                        continue;
                    }
                },
                SchemaOrRef::Ref { .. } => match self.types.resolve(schema) {
                    Ok(target) => (None, IrModelKind::Alias(target)),
                    Err(kind) => {
                        self.record(location, kind);
                        continue;
                    }
                },
            };

            models.push(IrModel {
                original_name: raw.clone(),
                name,
                description,
                kind,
            });
        }
        log::debug!("extracted {} models", models.len());
        models
    }

    fn build_properties(&mut self, schema: &Schema, location: &str) -> Vec<IrProperty> {
        let mut fields: Vec<&String> = schema.properties.keys().collect();
        fields.sort();

        let mut used: HashSet<Identifier> = HashSet::new();
        let mut properties = Vec::with_capacity(fields.len());
        for field in fields {
            let Some(property) = schema.properties.get(field) else {
                continue;
            };
            let field_location = format!("{location}.{field}");
            let property_type = match self.types.resolve(property) {
                Ok(t) => t,
                Err(kind) => {
                    self.record(field_location, kind);
                    continue;
                }
            };
            let name = normalize(field, true);
            if name.as_str().is_empty() {
                self.record(field_location, DiagnosticKind::EmptyIdentifier(field.clone()));
                continue;
            }
            if !used.insert(name.clone()) {
                self.record(
                    field_location,
                    DiagnosticKind::DuplicateProperty(name.to_string()),
                );
                continue;
            }

            let description = match property {
                SchemaOrRef::Schema(s) => s.description.clone(),
                SchemaOrRef::Ref { .. } => None,
            };
            properties.push(IrProperty {
                original_name: field.clone(),
                name,
                property_type,
                required: schema.required.contains(field),
                description,
            });
        }
        properties
    }
}

fn default_bucket<'a>() -> Bucket<'a> {
    Bucket {
        name: normalize(DEFAULT_SERVICE, true),
        original_name: None,
        description: None,
        routes: Vec::new(),
    }
}

/// Attach to the default service, creating it on first use.
fn attach_default<'a>(buckets: &mut IndexMap<Identifier, Bucket<'a>>, route: Route<'a>) {
    let name = normalize(DEFAULT_SERVICE, true);
    buckets
        .entry(name)
        .or_insert_with(default_bucket)
        .routes
        .push(route);
}

/// Object schemas with properties, or without any other shape, become structs.
fn is_struct(schema: &Schema) -> bool {
    schema.type_name() == Some("object")
        && (!schema.properties.is_empty() || schema.additional_schema().is_none())
}

fn route_location(method: HttpMethod, path: &str) -> String {
    format!("{} {path}", method.as_str())
}

/// `{name}` placeholders of a path template, left to right.
pub fn placeholders(path: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        found.push(&after[..end]);
        rest = &after[end + 1..];
    }
    found
}
