use minijinja::{Environment, context};
use oapigen_core::ir::IrSpec;

use crate::go_types;
use crate::names;

/// Emit `client.go`: constants, the root `Service` and its constructor.
pub fn emit_client(
    env: &Environment<'_>,
    ir: &IrSpec,
    package: &str,
) -> Result<String, minijinja::Error> {
    let base_path = ir.servers.first().map_or("/", |s| s.url.as_str());
    let mut title = go_types::one_line(&ir.info.title);
    if title.is_empty() {
        title = package.to_string();
    }

    let services: Vec<minijinja::Value> = ir
        .services
        .iter()
        .map(|service| {
            context! {
                field => names::service_field(service),
                type_name => names::service_type(service),
            }
        })
        .collect();

    env.get_template("client.go.j2")?.render(context! {
        package => package,
        title => title,
        version => go_types::quote(&ir.info.version),
        base_path => go_types::quote(base_path),
        services => services,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::environment;
    use crate::emitters::fixtures::{PETSTORE, ir};

    #[test]
    fn test_client_go() {
        let env = environment().unwrap();
        let out = emit_client(&env, &ir(PETSTORE), "petstore").unwrap();
        insta::assert_snapshot!(out, @r#"
        // Code generated by oapigen. DO NOT EDIT.

        package petstore

        import (
        	"context"
        	"net/http"
        )

        const (
        	// APIVersion is the version of the API description the client was generated from.
        	APIVersion = "1.0.0"
        	// UserAgent is sent with every request.
        	UserAgent = "oapigen/" + APIVersion
        )

        const basePath = "https://petstore.example.com/v1"

        // Service represents a Swagger Petstore service.
        type Service struct {
        	client    *http.Client
        	BasePath  string // API endpoint base URL
        	UserAgent string // optional additional User-Agent fragment

        	Default *DefaultService
        	Pet *PetService
        }

        // NewService creates a new Swagger Petstore service. A nil client means http.DefaultClient.
        func NewService(ctx context.Context, client *http.Client) (*Service, error) {
        	if client == nil {
        		client = http.DefaultClient
        	}
        	svc := &Service{client: client, BasePath: basePath}
        	svc.Default = NewDefaultService(svc)
        	svc.Pet = NewPetService(svc)
        	return svc, nil
        }

        func (s *Service) userAgent() string {
        	if s.UserAgent == "" {
        		return UserAgent
        	}
        	return UserAgent + " " + s.UserAgent
        }
        "#);
    }

    #[test]
    fn test_base_path_defaults_to_root() {
        let env = environment().unwrap();
        let ir = ir("openapi: 3.0.0\ninfo: { title: t, version: '2' }\npaths: {}\n");
        let out = emit_client(&env, &ir, "t").unwrap();
        assert!(out.contains("const basePath = \"/\"\n"));
        assert!(out.contains("\tsvc.Default = NewDefaultService(svc)\n"));
    }
}
