use anyhow::Result;
use catalog_backend::DocumentStore;
use catalog_models::UserProfile;
use serde_json::json;

use crate::app::App;
use crate::output::Output;

pub async fn run_profile(avatar: Option<String>, output: &Output) -> Result<()> {
    let app = App::bootstrap()?;
    let uid = app.require_uid()?;

    let collection = &app.config.catalog.users_collection;
    let document = app
        .db
        .get(collection, uid)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no profile document for `{uid}`"))?;
    let mut profile = UserProfile::from_document(&document.fields)?;

    if let Some(avatar) = avatar {
        profile.avatar_url = Some(avatar);
        app.db
            .set(collection, uid, &profile.to_document())
            .await?;
        output.success("Avatar updated");
    }

    if output.is_human() {
        output.info(format!("{} ({})", profile.display_name, uid));
        if let Some(email) = &profile.email {
            output.info(format!("  email: {email}"));
        }
        if let Some(avatar) = &profile.avatar_url {
            output.info(format!("  avatar: {avatar}"));
        }
        output.info(format!("  list entries: {}", profile.movie_list.len()));
        output.info(format!("  downloads: {}", profile.downloads.len()));
    } else {
        output.json(&json!({ "uid": uid, "profile": profile }));
    }
    Ok(())
}
