use super::models::TypeRef;
use super::types::Identifier;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }
}

/// A group of methods derived from one tag, or the default group.
#[derive(Debug, Clone)]
pub struct IrService {
    pub name: Identifier,
    /// The tag name, or `None` for the default service.
    pub original_name: Option<String>,
    pub description: Option<String>,
    /// Sorted by path, then HTTP method.
    pub methods: Vec<IrMethod>,
}

impl IrService {
    pub fn is_default(&self) -> bool {
        self.original_name.is_none()
    }
}

/// One generated entry point for a (path, method) pair.
#[derive(Debug, Clone)]
pub struct IrMethod {
    /// `operationId` as written, or the name derived from the route.
    pub original_name: String,
    pub name: Identifier,
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    /// In placeholder order of `path`.
    pub path_params: Vec<IrParameter>,
    pub query_params: Vec<IrParameter>,
    pub header_params: Vec<IrParameter>,
    pub cookie_params: Vec<IrParameter>,
    pub request_body: Option<IrRequestBody>,
    /// `None` when the operation has no typed success body.
    pub response: Option<TypeRef>,
}

impl IrMethod {
    /// All parameters, bucket by bucket.
    pub fn parameters(&self) -> impl Iterator<Item = &IrParameter> {
        self.path_params
            .iter()
            .chain(&self.query_params)
            .chain(&self.header_params)
            .chain(&self.cookie_params)
    }
}

/// A resolved parameter.
#[derive(Debug, Clone)]
pub struct IrParameter {
    pub original_name: String,
    pub name: Identifier,
    pub location: IrParameterLocation,
    pub param_type: TypeRef,
    pub required: bool,
    pub description: Option<String>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// A resolved request body.
#[derive(Debug, Clone)]
pub struct IrRequestBody {
    pub body_type: TypeRef,
    pub content_type: String,
    pub required: bool,
    pub description: Option<String>,
}
