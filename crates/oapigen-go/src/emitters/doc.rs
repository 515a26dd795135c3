use minijinja::{Environment, context};
use oapigen_core::ir::IrSpec;

use crate::go_types;

/// Emit `doc.go`, the package synopsis.
pub fn emit_doc(env: &Environment<'_>, ir: &IrSpec, package: &str) -> Result<String, minijinja::Error> {
    let mut title = go_types::one_line(&ir.info.title);
    if title.is_empty() {
        title = package.to_string();
    }
    let description = ir
        .info
        .description
        .as_deref()
        .map(go_types::comment)
        .unwrap_or_default();

    env.get_template("doc.go.j2")?.render(context! {
        package => package,
        title => title,
        description => description,
        version => go_types::one_line(&ir.info.version),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::environment;
    use crate::emitters::fixtures::{PETSTORE, ir};

    #[test]
    fn test_doc_go() {
        let env = environment().unwrap();
        let out = emit_doc(&env, &ir(PETSTORE), "petstore").unwrap();
        insta::assert_snapshot!(out, @r"
        // Code generated by oapigen. DO NOT EDIT.

        // Package petstore provides access to the Swagger Petstore REST API.
        //
        // A sample API that uses a petstore as an example.
        //
        // API version: 1.0.0
        package petstore
        ");
    }

    #[test]
    fn test_doc_go_without_metadata() {
        let env = environment().unwrap();
        let ir = ir("openapi: 3.0.0\ninfo: { title: '', version: '' }\npaths: {}\n");
        let out = emit_doc(&env, &ir, "client").unwrap();
        assert!(out.contains("// Package client provides access to the client REST API.\npackage client\n"));
    }
}
