use anyhow::Result;
use catalog_backend::DocumentStore;

use crate::app::App;
use crate::commands::{browse::render_catalog, decode_movies};
use crate::output::Output;

pub async fn run_search(categories: Vec<String>, output: &Output) -> Result<()> {
    let app = App::bootstrap()?;

    let documents = app
        .db
        .query_contains_any(
            &app.config.catalog.movies_collection,
            "categories",
            &categories,
        )
        .await?;
    let movies = decode_movies(documents, output);

    if movies.is_empty() {
        output.info(format!("No titles tagged {}", categories.join(" or ")));
        return Ok(());
    }

    render_catalog(&movies, output);
    Ok(())
}
