use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::decode::{optional_str, optional_str_array, require_str, DecodeError};

/// The identity record the authentication provider returns after sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_anonymous: bool,
}

/// The `users/{uid}` document the app maintains alongside the identity
/// record: profile details plus the server-side copies of the user's lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub movie_list: Vec<String>,
    pub downloads: Vec<String>,
}

impl UserProfile {
    pub fn new(display_name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email,
            avatar_url: None,
            movie_list: Vec::new(),
            downloads: Vec::new(),
        }
    }

    pub fn from_document(doc: &Map<String, Value>) -> Result<Self, DecodeError> {
        Ok(Self {
            display_name: require_str(doc, "displayName")?,
            email: optional_str(doc, "email")?,
            avatar_url: optional_str(doc, "avatarUrl")?,
            movie_list: optional_str_array(doc, "movie_list")?,
            downloads: optional_str_array(doc, "downloads")?,
        })
    }

    /// Encode back into the free-form document layout the backend stores.
    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert("displayName".into(), json!(self.display_name));
        if let Some(email) = &self.email {
            doc.insert("email".into(), json!(email));
        }
        if let Some(avatar) = &self.avatar_url {
            doc.insert("avatarUrl".into(), json!(avatar));
        }
        doc.insert("movie_list".into(), json!(self.movie_list));
        doc.insert("downloads".into(), json!(self.downloads));
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_document_round_trip() {
        let mut profile = UserProfile::new("John Doe", Some("john@example.com".to_string()));
        profile.avatar_url = Some("https://i.pravatar.cc/150?img=4".to_string());
        profile.movie_list = vec!["m1".to_string(), "m2".to_string()];

        let doc = profile.to_document();
        let decoded = UserProfile::from_document(&doc).unwrap();
        assert_eq!(decoded, profile);
    }

    #[test]
    fn test_profile_requires_display_name() {
        let doc = Map::new();
        let err = UserProfile::from_document(&doc).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("displayName")));
    }

    #[test]
    fn test_guest_profile_defaults() {
        let profile = UserProfile::new("Guest", None);
        assert!(profile.movie_list.is_empty());
        assert!(profile.downloads.is_empty());
        let doc = profile.to_document();
        assert!(!doc.contains_key("email"));
    }
}
