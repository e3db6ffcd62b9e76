use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Connection settings for the backend-as-a-service project hosting the
/// identity provider and the document database.
#[derive(Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    pub project_id: String,
    pub api_key: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_movies_collection")]
    pub movies_collection: String,
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
}

fn default_movies_collection() -> String {
    "movies".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            movies_collection: default_movies_collection(),
            users_collection: default_users_collection(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend.project_id.is_empty() || self.backend.project_id == "YOUR_PROJECT_ID" {
            return Err(anyhow::anyhow!("backend.project_id is not configured"));
        }
        if self.backend.api_key.is_empty() || self.backend.api_key == "YOUR_API_KEY" {
            return Err(anyhow::anyhow!("backend.api_key is not configured"));
        }
        if self.catalog.movies_collection.is_empty() {
            return Err(anyhow::anyhow!("catalog.movies_collection cannot be empty"));
        }
        if self.catalog.users_collection.is_empty() {
            return Err(anyhow::anyhow!("catalog.users_collection cannot be empty"));
        }
        Ok(())
    }
}
