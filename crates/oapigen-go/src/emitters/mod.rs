pub mod api;
pub mod client;
pub mod doc;
pub mod models;
pub mod utils;

use minijinja::Environment;

use crate::go_types::GENERATED_HEADER;

/// Template environment with every Go template registered.
pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_global("header", GENERATED_HEADER);

    env.add_template("doc.go.j2", include_str!("../../templates/doc.go.j2"))?;
    env.add_template("client.go.j2", include_str!("../../templates/client.go.j2"))?;
    env.add_template("api.go.j2", include_str!("../../templates/api.go.j2"))?;
    env.add_template("model.go.j2", include_str!("../../templates/model.go.j2"))?;
    env.add_template("utils.go.j2", include_str!("../../templates/utils.go.j2"))?;
    Ok(env)
}
