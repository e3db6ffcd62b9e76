use anyhow::Result;
use catalog_backend::{BackendError, Document, DocumentStore};
use catalog_models::Movie;
use catalog_store::WatchlistError;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::warn;

use crate::app::App;
use crate::output::Output;

/// Hydrate the watchlist, downgrading a corrupt stored value to a warning:
/// the store already fell back to an empty list, which is still usable.
fn load_watchlist(app: &App, output: &Output) -> Result<()> {
    match app.watchlist.load() {
        Ok(()) => Ok(()),
        Err(WatchlistError::Decode(e)) => {
            warn!("stored watchlist was corrupt, treating as empty: {e}");
            output.warn("stored My List was unreadable and has been treated as empty");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn run_list_show(output: &Output) -> Result<()> {
    let app = App::bootstrap()?;
    load_watchlist(&app, output)?;

    let ids = app.watchlist.entries();
    if ids.is_empty() {
        output.info("Your list is empty");
        return Ok(());
    }

    // The store holds bare ids; resolve each against the catalog here
    let progress = if output.is_human() {
        let bar = ProgressBar::new(ids.len() as u64);
        bar.set_style(ProgressStyle::with_template("{msg} {bar:30} {pos}/{len}")?);
        bar.set_message("resolving");
        bar
    } else {
        ProgressBar::hidden()
    };

    let collection = &app.config.catalog.movies_collection;
    let lookups = ids.iter().map(|id| {
        let progress = &progress;
        let db = &app.db;
        async move {
            let result = db.get(collection, id).await;
            progress.inc(1);
            (id.clone(), result)
        }
    });
    let resolved = join_all(lookups).await;
    progress.finish_and_clear();

    let mut movies: Vec<Movie> = Vec::with_capacity(ids.len());
    for (id, result) in resolved {
        match result? {
            Some(doc) => match Movie::from_document(&doc.id, &doc.fields) {
                Ok(movie) => movies.push(movie),
                Err(e) => {
                    warn!("skipping malformed catalog document `{id}`: {e}");
                    output.warn(format!("`{id}` has a malformed catalog entry, skipping"));
                }
            },
            None => output.warn(format!("`{id}` is no longer in the catalog")),
        }
    }

    let rows: Vec<Vec<String>> = movies
        .iter()
        .map(|movie| {
            vec![
                movie.id.clone(),
                movie.title.clone(),
                movie.release_date.clone().unwrap_or_default(),
            ]
        })
        .collect();
    output.table(
        vec!["Id", "Title", "Released"],
        rows,
        &json!({ "ids": ids, "movies": movies }),
    );
    Ok(())
}

/// Best-effort catalog lookup for the title being toggled. Only a confirmed
/// "no such id" blocks the toggle; the toggle itself is local, so an
/// unreachable catalog or a malformed document downgrades to a warning.
fn resolve_title(
    lookup: Result<Option<Document>, BackendError>,
    id: &str,
    output: &Output,
) -> Result<Option<String>> {
    match lookup {
        Ok(Some(document)) => match Movie::from_document(&document.id, &document.fields) {
            Ok(movie) => Ok(Some(movie.title)),
            Err(e) => {
                warn!("catalog document `{id}` is malformed, toggling anyway: {e}");
                output.warn(format!("`{id}` has a malformed catalog entry"));
                Ok(None)
            }
        },
        Ok(None) => Err(anyhow::anyhow!("no title with id `{id}` in the catalog")),
        Err(e) => {
            warn!("catalog lookup for `{id}` failed, toggling anyway: {e}");
            output.warn("could not reach the catalog, toggling by id only");
            Ok(None)
        }
    }
}

pub async fn run_list_toggle(id: &str, output: &Output) -> Result<()> {
    let app = App::bootstrap()?;

    // A typo should not pollute the list, so the id is checked against the
    // catalog first, but the check never blocks the toggle when the catalog
    // is unreachable
    let lookup = app.db.get(&app.config.catalog.movies_collection, id).await;
    let title = resolve_title(lookup, id, output)?;

    load_watchlist(&app, output)?;
    let now_member = app.watchlist.toggle(id)?;

    let label = match &title {
        Some(title) => format!("\"{title}\""),
        None => format!("`{id}`"),
    };
    if now_member {
        output.success(format!("Added {label} to My List"));
    } else {
        output.success(format!("Removed {label} from My List"));
    }
    Ok(())
}
