use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
struct SessionData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Persisted sign-in state: tokens and the identity they belong to.
/// One session at a time; signing out clears the file.
pub struct SessionStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            values: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let session_data: SessionData = toml::from_str(&content)?;
            self.values = session_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let session_data = SessionData {
            data: self.values.clone(),
        };
        let content = toml::to_string_pretty(&session_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.values.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<&String> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    pub fn is_signed_in(&self) -> bool {
        self.get("id_token").is_some() && self.get("uid").is_some()
    }

    pub fn get_uid(&self) -> Option<&String> {
        self.get("uid")
    }

    pub fn set_uid(&mut self, uid: String) {
        self.set("uid", uid);
    }

    pub fn get_id_token(&self) -> Option<&String> {
        self.get("id_token")
    }

    pub fn set_id_token(&mut self, token: String) {
        self.set("id_token", token);
    }

    pub fn get_refresh_token(&self) -> Option<&String> {
        self.get("refresh_token")
    }

    pub fn set_refresh_token(&mut self, token: String) {
        self.set("refresh_token", token);
    }

    pub fn get_token_expires(&self) -> Option<DateTime<Utc>> {
        self.get("token_expires")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_token_expires(&mut self, expires: DateTime<Utc>) {
        self.set("token_expires", expires.to_rfc3339());
    }

    pub fn get_display_name(&self) -> Option<&String> {
        self.get("display_name")
    }

    pub fn set_display_name(&mut self, name: String) {
        self.set("display_name", name);
    }

    pub fn get_email(&self) -> Option<&String> {
        self.get("email")
    }

    pub fn set_email(&mut self, email: String) {
        self.set("email", email);
    }

    pub fn is_anonymous(&self) -> bool {
        self.get("anonymous").map(|v| v == "true").unwrap_or(false)
    }

    pub fn set_anonymous(&mut self, anonymous: bool) {
        self.set("anonymous", anonymous.to_string());
    }
}
