use std::collections::HashSet;

use minijinja::{Environment, Value, context};
use oapigen_core::ir::{IrMethod, IrParameter, IrParameterLocation, IrService, TypeRef};
use oapigen_core::transform::name_normalizer::normalize;

use crate::go_types;
use crate::names::{self, TypeNames};

/// Method names every call builder declares itself.
const BUILDER_METHODS: &[&str] = &["Do", "Header"];

/// Emit `api_<service>.go`: the service type and one call builder per method.
pub fn emit_api(
    env: &Environment<'_>,
    service: &IrService,
    types: &TypeNames,
    package: &str,
) -> Result<String, minijinja::Error> {
    let type_name = names::service_type(service);

    let doc = match service.description.as_deref().and_then(go_types::describe) {
        Some(description) => format!("// {type_name} represents {description}"),
        None => format!("// {type_name} groups the {} operations.", service_label(service)),
    };

    let used = service.methods.iter().flat_map(|m| {
        m.parameters()
            .map(|p| &p.param_type)
            .chain(m.request_body.as_ref().map(|b| &b.body_type))
            .chain(m.response.as_ref())
    });
    let methods: Vec<Value> = service
        .methods
        .iter()
        .map(|method| method_context(service, method, types))
        .collect();

    env.get_template("api.go.j2")?.render(context! {
        package => package,
        imports => go_types::imports(used),
        doc => doc,
        type_name => type_name,
        methods => methods,
    })
}

fn service_label(service: &IrService) -> &str {
    service.original_name.as_deref().unwrap_or("untagged")
}

fn method_context(service: &IrService, method: &IrMethod, types: &TypeNames) -> Value {
    let call_type = names::call_type(service, method);
    let route = format!("{} {}", method.method.as_str(), method.path);

    let path_fields: Vec<Value> = method
        .path_params
        .iter()
        .map(|param| {
            context! {
                name => go_types::local_name(param.name.as_str()),
                go_type => types.render(&param.param_type),
            }
        })
        .collect();

    let mut args: Vec<String> = method
        .path_params
        .iter()
        .map(|param| {
            format!(
                "{} {}",
                go_types::local_name(param.name.as_str()),
                types.render(&param.param_type)
            )
        })
        .collect();

    let mut taken: HashSet<String> = BUILDER_METHODS.iter().map(|s| s.to_string()).collect();
    let body = method.request_body.as_ref().map(|body| {
        let go_type = types.render(&body.body_type);
        if body.required {
            args.push(format!("body {go_type}"));
        } else {
            taken.insert("Body".to_string());
        }
        context! {
            go_type => go_type,
            content_type => body.content_type.clone(),
            required => body.required,
        }
    });

    let setters: Vec<Value> = method
        .query_params
        .iter()
        .chain(&method.header_params)
        .chain(&method.cookie_params)
        .map(|param| setter_context(param, types, &mut taken))
        .collect();

    let mut doc = vec![match method.summary.as_deref().map(go_types::one_line) {
        Some(summary) if !summary.is_empty() => format!(
            "// {} returns the {call_type} for {}",
            method.name,
            sentence(&summary.to_lowercase())
        ),
        _ => format!("// {} returns the {call_type} for {route}.", method.name),
    }];
    if let Some(description) = method.description.as_deref() {
        let lines = go_types::comment(description);
        if !lines.is_empty() {
            doc.push("//".to_string());
            doc.extend(lines);
        }
    }
    if method.deprecated {
        doc.push("//".to_string());
        doc.push(format!("// Deprecated: {route} is marked as deprecated."));
    }

    let (content_type, body_expr) = match &method.request_body {
        Some(body) => (go_types::quote(&body.content_type), "c.body"),
        None => (go_types::quote(""), "nil"),
    };

    context! {
        name => method.name.as_str(),
        call_type => call_type,
        route => route,
        doc => doc,
        http_method => go_types::method_constant(method.method),
        path_expr => path_expr(&method.path, &method.path_params),
        path_fields => path_fields,
        args => args.join(", "),
        body => body,
        content_type => content_type,
        body_expr => body_expr,
        setters => setters,
        response => method.response.as_ref().map(|t| types.render(t)),
    }
}

fn setter_context(param: &IrParameter, types: &TypeNames, taken: &mut HashSet<String>) -> Value {
    // Path parameters are constructor arguments and never reach here.
    let (location, target) = match param.location {
        IrParameterLocation::Query | IrParameterLocation::Path => ("query", "c.params"),
        IrParameterLocation::Header => ("header", "c.header"),
        IrParameterLocation::Cookie => ("cookie", "c.header"),
    };
    let requirement = if param.required { "required" } else { "optional" };

    let mut name = normalize(&param.original_name, true).to_string();
    if taken.contains(&name) {
        name = format!("{name}{}", upper(location));
    }
    while taken.contains(&name) {
        name.push('_');
    }
    taken.insert(name.clone());

    let arg = go_types::local_name(param.name.as_str());
    let wire_name = go_types::quote(&param.original_name);
    let body = match (&param.param_type, param.location) {
        (TypeRef::Sequence(element), IrParameterLocation::Cookie) => vec![
            format!("for _, v := range {arg} {{"),
            format!("\t{target}.Add(\"Cookie\", {})", cookie_expr(&wire_name, element, "v")),
            "}".to_string(),
        ],
        (_, IrParameterLocation::Cookie) => vec![format!(
            "{target}.Add(\"Cookie\", {})",
            cookie_expr(&wire_name, &param.param_type, &arg)
        )],
        (TypeRef::Sequence(element), _) => vec![
            format!("for _, v := range {arg} {{"),
            format!("\t{target}.Add({wire_name}, {})", value_expr(element, "v")),
            "}".to_string(),
        ],
        (ty, _) => vec![format!("{target}.Set({wire_name}, {})", value_expr(ty, &arg))],
    };

    context! {
        name => name,
        arg => arg,
        go_type => types.render(&param.param_type),
        location => location,
        requirement => requirement,
        wire_name => wire_name,
        doc => param.description.as_deref().map(go_types::comment).unwrap_or_default(),
        body => body,
    }
}

fn upper(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn sentence(text: &str) -> String {
    if text.ends_with('.') {
        text.to_string()
    } else {
        format!("{text}.")
    }
}

/// Go expression rendering `var` for a URL, query string or header.
fn value_expr(ty: &TypeRef, var: &str) -> String {
    match ty {
        TypeRef::Scalar("time.Time") => format!("{var}.Format(time.RFC3339)"),
        TypeRef::Scalar("string") => var.to_string(),
        _ => format!("fmt.Sprint({var})"),
    }
}

fn cookie_expr(wire_name: &str, ty: &TypeRef, var: &str) -> String {
    format!(
        "(&http.Cookie{{Name: {wire_name}, Value: {}}}).String()",
        value_expr(ty, var)
    )
}

/// Go expression for the request path, substituting placeholders in template order.
///
/// Placeholders without a matching parameter stay in the path as written.
fn path_expr(path: &str, params: &[IrParameter]) -> String {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1..].find('}') else {
            break;
        };
        let placeholder = &rest[start + 1..start + 1 + len];
        let end = start + len + 2;
        match params.iter().find(|p| p.original_name == placeholder) {
            Some(param) => {
                literal.push_str(&rest[..start]);
                if !literal.is_empty() {
                    parts.push(go_types::quote(&literal));
                    literal.clear();
                }
                let field = format!("c.{}", go_types::local_name(param.name.as_str()));
                parts.push(format!(
                    "url.PathEscape({})",
                    value_expr(&param.param_type, &field)
                ));
            }
            None => literal.push_str(&rest[..end]),
        }
        rest = &rest[end..];
    }
    literal.push_str(rest);
    if !literal.is_empty() || parts.is_empty() {
        parts.push(go_types::quote(&literal));
    }
    parts.join(" + ")
}

#[cfg(test)]
mod tests {
    use oapigen_core::ir::IrSpec;

    use super::*;
    use crate::emitters::environment;
    use crate::emitters::fixtures::{PETSTORE, ir};

    fn render(ir: &IrSpec, service: &str) -> String {
        let env = environment().unwrap();
        let service = ir.services.iter().find(|s| s.name == service).unwrap();
        emit_api(&env, service, &TypeNames::new(ir), "petstore").unwrap()
    }

    fn path_param(name: &str, ident: &str, ty: TypeRef) -> IrParameter {
        let ir = ir(&format!(
            "openapi: 3.0.0\ninfo: {{ title: t, version: '1' }}\npaths:\n  /x/{{{name}}}:\n    get:\n      parameters:\n        - {{ name: {name}, in: path, required: true, schema: {{ type: string }} }}\n"
        ));
        let mut param = ir.services[0].methods[0].path_params[0].clone();
        assert_eq!(param.name.as_str(), ident);
        param.param_type = ty;
        param
    }

    #[test]
    fn test_path_expr() {
        let pet_id = path_param("petId", "petID", TypeRef::Scalar("int64"));
        assert_eq!(
            path_expr("/pets/{petId}", std::slice::from_ref(&pet_id)),
            r#""/pets/" + url.PathEscape(fmt.Sprint(c.petID))"#
        );
        assert_eq!(
            path_expr("/pets/{petId}/toys", std::slice::from_ref(&pet_id)),
            r#""/pets/" + url.PathEscape(fmt.Sprint(c.petID)) + "/toys""#
        );
        assert_eq!(
            path_expr("/{other}/{petId}", std::slice::from_ref(&pet_id)),
            r#""/{other}/" + url.PathEscape(fmt.Sprint(c.petID))"#
        );
        assert_eq!(path_expr("/health", &[]), r#""/health""#);
        assert_eq!(path_expr("", &[]), r#""""#);

        let name = path_param("name", "name", TypeRef::Scalar("string"));
        assert_eq!(
            path_expr("/{name}", &[name]),
            r#""/" + url.PathEscape(c.name)"#
        );
        let body = path_param("body", "body", TypeRef::Scalar("time.Time"));
        assert_eq!(
            path_expr("/at/{body}", &[body]),
            r#""/at/" + url.PathEscape(c.bodyParam.Format(time.RFC3339))"#
        );
    }

    #[test]
    fn test_service_header_and_imports() {
        let out = render(&ir(PETSTORE), "Pet");
        assert!(out.starts_with("// Code generated by oapigen. DO NOT EDIT.\n\npackage petstore\n"));
        assert!(out.contains("\t\"net/url\"\n)\n"), "no extra imports expected:\n{out}");
        assert!(out.contains(
            "// PetService represents an everything about your pets.\ntype PetService struct {\n\ts *Service\n}\n"
        ));
        assert!(out.contains("func NewPetService(s *Service) *PetService {\n"));
    }

    #[test]
    fn test_list_call() {
        let out = render(&ir(PETSTORE), "Pet");
        let start = out.find("// PetListPetsCall holds").unwrap();
        let end = out.find("// PetCreatePetsCall holds").unwrap();
        insta::assert_snapshot!(&out[start..end], @r#"
        // PetListPetsCall holds the parameters of a GET /pets request.
        type PetListPetsCall struct {
        	s      *Service
        	header http.Header
        	params url.Values
        }

        // ListPets returns the PetListPetsCall for list all pets.
        func (r *PetService) ListPets() *PetListPetsCall {
        	return &PetListPetsCall{
        		s:      r.s,
        		header: make(http.Header),
        		params: url.Values{},
        	}
        }

        // Limit sets the optional query parameter "limit".
        // How many items to return at one time (max 100)
        func (c *PetListPetsCall) Limit(limit int32) *PetListPetsCall {
        	c.params.Set("limit", fmt.Sprint(limit))
        	return c
        }

        // XRequestID sets the optional header parameter "X-Request-ID".
        func (c *PetListPetsCall) XRequestID(xRequestID string) *PetListPetsCall {
        	c.header.Set("X-Request-ID", xRequestID)
        	return c
        }

        // Header returns the request header, for setting values not covered by the call's setters.
        func (c *PetListPetsCall) Header() http.Header {
        	return c.header
        }

        // Do executes the GET /pets request.
        func (c *PetListPetsCall) Do(ctx context.Context) (Pets, error) {
        	var ret Pets
        	err := c.s.send(ctx, http.MethodGet, "/pets", c.params, c.header, "", nil, &ret)
        	return ret, err
        }
        "#);
    }

    #[test]
    fn test_path_and_body_calls() {
        let out = render(&ir(PETSTORE), "Pet");
        assert!(out.contains("func (r *PetService) CreatePets(body NewPet) *PetCreatePetsCall {\n"));
        assert!(out.contains("\t\tbody: body,\n"));
        assert!(out.contains(
            "\treturn c.s.send(ctx, http.MethodPost, \"/pets\", c.params, c.header, \"application/json\", c.body, nil)\n"
        ));

        assert!(out.contains("func (r *PetService) PetByID(petID string) *PetPetByIDCall {\n"));
        assert!(out.contains("\t// path fields\n\tpetID string\n"));
        assert!(out.contains(
            "err := c.s.send(ctx, http.MethodGet, \"/pets/\" + url.PathEscape(c.petID), c.params, c.header, \"\", nil, &ret)"
        ));
        assert!(out.contains("func (c *PetDeletePetCall) Do(ctx context.Context) error {\n"));
    }

    #[test]
    fn test_optional_body_and_setter_collisions() {
        let ir = ir(r#"
openapi: 3.0.0
info: { title: t, version: "1" }
paths:
  /search:
    post:
      operationId: search
      deprecated: true
      parameters:
        - { name: do, in: query, schema: { type: string } }
        - { name: body, in: query, schema: { type: string } }
        - { name: tags, in: query, required: true, schema: { type: array, items: { type: string } } }
        - { name: tags, in: header, schema: { type: string } }
        - { name: since, in: header, schema: { type: string, format: date-time } }
        - { name: session, in: cookie, schema: { type: integer } }
      requestBody:
        content:
          text/plain:
            schema: { type: string }
      responses:
        "200":
          content:
            application/json:
              schema: { type: object, additionalProperties: { type: string } }
"#);
        let out = render(&ir, "Default");

        assert!(out.contains("\t\"time\"\n)"));
        assert!(out.contains("func (r *DefaultService) Search() *DefaultSearchCall {\n"));
        assert!(out.contains("// Deprecated: POST /search is marked as deprecated.\n"));
        assert!(out.contains(
            "func (c *DefaultSearchCall) Body(body string) *DefaultSearchCall {\n\tc.body = body\n"
        ));
        assert!(out.contains("func (c *DefaultSearchCall) BodyQuery(bodyParam string) *DefaultSearchCall {\n"));
        assert!(out.contains("func (c *DefaultSearchCall) DoQuery(do string) *DefaultSearchCall {\n"));
        assert!(out.contains(
            "func (c *DefaultSearchCall) Tags(tags []string) *DefaultSearchCall {\n\tfor _, v := range tags {\n\t\tc.params.Add(\"tags\", v)\n\t}\n"
        ));
        assert!(out.contains("func (c *DefaultSearchCall) TagsHeader(tags string) *DefaultSearchCall {\n"));
        assert!(out.contains("\tc.header.Set(\"since\", since.Format(time.RFC3339))\n"));
        assert!(out.contains(
            "\tc.header.Add(\"Cookie\", (&http.Cookie{Name: \"session\", Value: fmt.Sprint(session)}).String())\n"
        ));
        assert!(out.contains("// Tags sets the required query parameter \"tags\".\n"));
        assert!(out.contains(
            "func (c *DefaultSearchCall) Do(ctx context.Context) (map[string]string, error) {\n"
        ));
        assert!(out.contains("\"text/plain\", c.body, &ret)"));
    }
}
