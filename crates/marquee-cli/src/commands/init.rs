use anyhow::Result;
use catalog_config::{BackendConfig, CatalogConfig, Config, PathManager};

use crate::commands::prompts;
use crate::output::Output;

pub fn run_init(
    project_id: Option<String>,
    api_key: Option<String>,
    output: &Output,
) -> Result<()> {
    let project_id = prompts::text_or(project_id, "Backend project id")?;
    let api_key = prompts::text_or(api_key, "Backend API key")?;

    let config = Config {
        backend: BackendConfig {
            project_id,
            api_key,
        },
        catalog: CatalogConfig::default(),
    };
    config.validate()?;

    let paths = PathManager::default();
    paths.ensure_directories()?;
    config.save_to_file(&paths.config_file())?;

    output.success(format!(
        "Configuration written to {}",
        paths.config_file().display()
    ));
    Ok(())
}
