use minijinja::{Environment, context};

/// Emit `utils.go`: `APIError` and the request plumbing shared by every call builder.
pub fn emit_utils(env: &Environment<'_>, package: &str) -> Result<String, minijinja::Error> {
    env.get_template("utils.go.j2")?
        .render(context! { package => package })
}
