use anyhow::Result;
use catalog_backend::DocumentStore;
use catalog_models::Movie;
use serde_json::json;

use crate::app::App;
use crate::commands::decode_movies;
use crate::output::Output;

pub async fn run_browse(output: &Output) -> Result<()> {
    let app = App::bootstrap()?;

    let documents = app
        .db
        .list(&app.config.catalog.movies_collection)
        .await?;
    let mut movies = decode_movies(documents, output);

    if movies.is_empty() {
        output.info("The catalog is empty");
        return Ok(());
    }

    // Newest first; undated titles sink to the bottom
    movies.sort_by(|a, b| b.released_at().cmp(&a.released_at()));

    render_catalog(&movies, output);
    Ok(())
}

pub(crate) fn render_catalog(movies: &[Movie], output: &Output) {
    let rows: Vec<Vec<String>> = movies
        .iter()
        .map(|movie| {
            vec![
                movie.id.clone(),
                movie.title.clone(),
                movie.release_date.clone().unwrap_or_default(),
                movie.categories.join(", "),
                if movie.series { "series" } else { "movie" }.to_string(),
            ]
        })
        .collect();

    output.table(
        vec!["Id", "Title", "Released", "Categories", "Kind"],
        rows,
        &json!(movies),
    );
}
