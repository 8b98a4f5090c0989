mod handlers;
mod model;
pub mod render;
mod routes;

use minijinja::Environment;

pub use model::*;
pub use routes::router;

pub fn add_templates(env: &mut Environment<'static>) -> Result<(), minijinja::Error> {
    env.add_template("base.html", include_str!("views/base.html"))?;
    env.add_template("index.html", include_str!("views/index.html"))?;
    env.add_template("new.html", include_str!("views/new.html"))?;
    env.add_template("note.html", include_str!("views/note.html"))?;
    Ok(())
}
