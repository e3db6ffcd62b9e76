use anyhow::Result;
use catalog_backend::DocumentStore;
use catalog_models::Movie;
use catalog_store::WatchlistError;
use serde_json::json;
use tracing::warn;

use crate::app::App;
use crate::commands::decode_movies;
use crate::output::Output;

const RELATED_LIMIT: usize = 5;

pub async fn run_show(id: &str, output: &Output) -> Result<()> {
    let app = App::bootstrap()?;

    let document = app
        .db
        .get(&app.config.catalog.movies_collection, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no title with id `{id}` in the catalog"))?;
    let movie = Movie::from_document(&document.id, &document.fields)?;

    // A corrupt local list is worth mentioning but never blocks the screen
    let in_my_list = match app.watchlist.load() {
        Ok(()) => app.watchlist.contains(id),
        Err(WatchlistError::Decode(e)) => {
            warn!("stored watchlist was corrupt, treating as empty: {e}");
            output.warn("stored My List was unreadable and has been treated as empty");
            false
        }
        Err(e) => return Err(e.into()),
    };

    let related = if movie.categories.is_empty() {
        Vec::new()
    } else {
        let documents = app
            .db
            .query_contains_any(
                &app.config.catalog.movies_collection,
                "categories",
                &movie.categories,
            )
            .await?;
        let mut related = decode_movies(documents, output);
        related.retain(|candidate| candidate.id != movie.id);
        related.truncate(RELATED_LIMIT);
        related
    };

    if output.is_human() {
        render_human(&movie, in_my_list, &related, output);
    } else {
        output.json(&json!({
            "movie": movie,
            "inMyList": in_my_list,
            "related": related,
        }));
    }
    Ok(())
}

fn render_human(movie: &Movie, in_my_list: bool, related: &[Movie], output: &Output) {
    output.info(format!(
        "{} ({})",
        movie.title,
        movie.release_date.as_deref().unwrap_or("unreleased")
    ));
    if !movie.categories.is_empty() {
        output.info(format!("  categories: {}", movie.categories.join(", ")));
    }
    if let Some(synopsis) = &movie.synopsis {
        output.info(format!("  {synopsis}"));
    }
    if let Some(trailer) = &movie.trailer_url {
        output.info(format!("  trailer: {trailer}"));
    }
    if let Some(download) = &movie.download_url {
        output.info(format!("  download: {download}"));
    }
    output.info(format!(
        "  My List: {}",
        if in_my_list { "yes" } else { "no" }
    ));

    if movie.series && !movie.episodes.is_empty() {
        output.info("");
        output.info("Episodes:");
        for episode in &movie.episodes {
            let link = episode
                .download_link
                .as_deref()
                .map(|l| format!("  ({l})"))
                .unwrap_or_default();
            output.info(format!(
                "  S{}E{} {}{}",
                episode.season, episode.episode, episode.title, link
            ));
        }
    }

    if !related.is_empty() {
        output.info("");
        output.info("Related:");
        for candidate in related {
            output.info(format!("  {}  {}", candidate.id, candidate.title));
        }
    }
}
