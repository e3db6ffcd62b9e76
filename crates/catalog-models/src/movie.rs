use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::decode::{optional_bool, optional_str, optional_str_array, require_str, DecodeError};

/// One title in the remote catalog. Series carry an episode list; plain
/// movies leave it empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub banner_url: Option<String>,
    pub synopsis: Option<String>,
    pub release_date: Option<String>,
    pub categories: Vec<String>,
    pub trailer_url: Option<String>,
    pub download_url: Option<String>,
    pub series: bool,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub season: String,
    pub episode: String,
    pub title: String,
    pub download_link: Option<String>,
}

impl Movie {
    /// Decode a raw catalog document. The backend stores free-form records;
    /// only `title` is required, everything else degrades to absent.
    pub fn from_document(id: &str, doc: &Map<String, Value>) -> Result<Self, DecodeError> {
        let episodes = match doc.get("episodes") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(fields) => out.push(Episode::from_document(fields)?),
                        _ => {
                            return Err(DecodeError::WrongType {
                                field: "episodes",
                                expected: "array of objects",
                            })
                        }
                    }
                }
                out
            }
            Some(_) => {
                return Err(DecodeError::WrongType {
                    field: "episodes",
                    expected: "array of objects",
                })
            }
        };

        Ok(Self {
            id: id.to_string(),
            title: require_str(doc, "title")?,
            poster_url: optional_str(doc, "posterUrl")?,
            banner_url: optional_str(doc, "bannerUrl")?,
            synopsis: optional_str(doc, "synopsis")?,
            release_date: optional_str(doc, "releaseDate")?,
            categories: optional_str_array(doc, "categories")?,
            trailer_url: optional_str(doc, "trailerUrl")?,
            download_url: optional_str(doc, "downloadUrl")?,
            series: optional_bool(doc, "series")?,
            episodes,
        })
    }

    /// Parse the display release date, accepting the two layouts seen in
    /// catalog data ("December 9, 2017" and "2017-12-09").
    pub fn released_at(&self) -> Option<NaiveDate> {
        let raw = self.release_date.as_deref()?;
        NaiveDate::parse_from_str(raw, "%B %d, %Y")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()
    }
}

impl Episode {
    fn from_document(doc: &Map<String, Value>) -> Result<Self, DecodeError> {
        Ok(Self {
            season: require_str(doc, "season")?,
            episode: require_str(doc, "episode")?,
            title: require_str(doc, "title")?,
            download_link: optional_str(doc, "downloadLink")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_movie_decode_full_document() {
        let doc = as_map(json!({
            "title": "Soul",
            "posterUrl": "https://img.example/soul.jpg",
            "bannerUrl": "https://img.example/soul-banner.jpg",
            "synopsis": "A middle-school band teacher ends up in the Great Before.",
            "releaseDate": "December 25, 2020",
            "categories": ["Animation", "Kids"],
            "trailerUrl": "https://www.youtube.com/watch?v=xOsLIiBStEs",
            "series": false
        }));

        let movie = Movie::from_document("m1", &doc).unwrap();
        assert_eq!(movie.id, "m1");
        assert_eq!(movie.title, "Soul");
        assert_eq!(movie.categories, vec!["Animation", "Kids"]);
        assert!(!movie.series);
        assert!(movie.episodes.is_empty());
        assert_eq!(
            movie.released_at(),
            Some(NaiveDate::from_ymd_opt(2020, 12, 25).unwrap())
        );
    }

    #[test]
    fn test_movie_decode_missing_title() {
        let doc = as_map(json!({ "posterUrl": "https://img.example/x.jpg" }));
        let err = Movie::from_document("m1", &doc).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("title")));
    }

    #[test]
    fn test_movie_decode_mistyped_categories() {
        let doc = as_map(json!({ "title": "Soul", "categories": "Animation" }));
        let err = Movie::from_document("m1", &doc).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::WrongType {
                field: "categories",
                ..
            }
        ));
    }

    #[test]
    fn test_series_with_episodes() {
        let doc = as_map(json!({
            "title": "Stranger Things",
            "series": true,
            "episodes": [
                { "season": "1", "episode": "1", "title": "Chapter One", "downloadLink": "https://dl.example/st-s1e1" },
                { "season": "1", "episode": "2", "title": "Chapter Two" }
            ]
        }));

        let movie = Movie::from_document("s1", &doc).unwrap();
        assert!(movie.series);
        assert_eq!(movie.episodes.len(), 2);
        assert_eq!(movie.episodes[0].title, "Chapter One");
        assert_eq!(movie.episodes[1].download_link, None);
    }

    #[test]
    fn test_iso_release_date() {
        let doc = as_map(json!({ "title": "Knives Out", "releaseDate": "2019-11-27" }));
        let movie = Movie::from_document("m2", &doc).unwrap();
        assert_eq!(
            movie.released_at(),
            Some(NaiveDate::from_ymd_opt(2019, 11, 27).unwrap())
        );
    }

    #[test]
    fn test_unparseable_release_date_is_none() {
        let doc = as_map(json!({ "title": "Knives Out", "releaseDate": "sometime soon" }));
        let movie = Movie::from_document("m2", &doc).unwrap();
        assert_eq!(movie.released_at(), None);
    }
}
