pub mod auth;
pub mod browse;
pub mod detail;
pub mod init;
pub mod list;
pub mod profile;
pub mod prompts;
pub mod search;

use catalog_models::Movie;

use crate::output::Output;

/// Decode a batch of raw catalog documents, reporting and skipping the
/// malformed ones rather than failing the whole listing.
pub(crate) fn decode_movies(
    documents: Vec<catalog_backend::Document>,
    output: &Output,
) -> Vec<Movie> {
    let mut movies = Vec::with_capacity(documents.len());
    for doc in documents {
        match Movie::from_document(&doc.id, &doc.fields) {
            Ok(movie) => movies.push(movie),
            Err(e) => {
                tracing::warn!("skipping malformed catalog document `{}`: {e}", doc.id);
                output.warn(format!("skipping malformed catalog entry `{}`", doc.id));
            }
        }
    }
    movies
}
