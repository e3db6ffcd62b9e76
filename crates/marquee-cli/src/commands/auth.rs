use anyhow::Result;
use catalog_backend::{AuthProvider, DocumentStore, Session};
use catalog_models::UserProfile;
use serde_json::json;

use crate::app::App;
use crate::commands::prompts;
use crate::output::Output;

fn persist_session(app: &mut App, session: &Session) -> Result<()> {
    app.session.set_uid(session.user.uid.clone());
    app.session.set_id_token(session.id_token.clone());
    app.session.set_refresh_token(session.refresh_token.clone());
    app.session.set_token_expires(session.expires_at);
    app.session.set_anonymous(session.user.is_anonymous);
    if let Some(name) = &session.user.display_name {
        app.session.set_display_name(name.clone());
    }
    if let Some(email) = &session.user.email {
        app.session.set_email(email.clone());
    }
    app.session.save()?;
    app.db.set_id_token(Some(session.id_token.clone()));
    Ok(())
}

pub async fn run_login(email: Option<String>, output: &Output) -> Result<()> {
    let mut app = App::bootstrap()?;

    let email = prompts::text_or(email, "Email")?;
    let password = prompts::password("Password")?;

    let session = app.auth.sign_in(email.trim(), &password).await?;
    persist_session(&mut app, &session)?;

    let name = session
        .user
        .display_name
        .as_deref()
        .unwrap_or(email.trim());
    output.success(format!("Signed in as {name}"));
    Ok(())
}

pub async fn run_signup(
    email: Option<String>,
    name: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut app = App::bootstrap()?;

    let email = prompts::text_or(email, "Email")?;
    let name = prompts::text_or(name, "Display name")?;
    let password = prompts::password("Password")?;
    let confirm = prompts::password("Confirm password")?;
    if password != confirm {
        return Err(anyhow::anyhow!("passwords do not match"));
    }

    let session = app.auth.sign_up(email.trim(), &password, &name).await?;
    persist_session(&mut app, &session)?;

    // The identity record gets a companion profile document holding the
    // server-side lists.
    let profile = UserProfile::new(&name, Some(email.trim().to_string()));
    app.db
        .set(
            &app.config.catalog.users_collection,
            &session.user.uid,
            &profile.to_document(),
        )
        .await?;

    output.success(format!("Account created for {name}"));
    Ok(())
}

pub async fn run_guest(output: &Output) -> Result<()> {
    let mut app = App::bootstrap()?;

    let session = app.auth.sign_in_anonymously().await?;
    persist_session(&mut app, &session)?;

    let profile = UserProfile::new("Guest", None);
    app.db
        .set(
            &app.config.catalog.users_collection,
            &session.user.uid,
            &profile.to_document(),
        )
        .await?;

    output.success("Signed in as a guest");
    Ok(())
}

pub async fn run_logout(output: &Output) -> Result<()> {
    let mut app = App::bootstrap()?;

    if let Some(token) = app.session.get_id_token().cloned() {
        app.auth.sign_out(&token).await?;
        app.session.clear()?;
        output.success("Signed out");
    } else {
        output.info("Not signed in");
    }
    Ok(())
}

pub async fn run_whoami(output: &Output) -> Result<()> {
    let app = App::bootstrap()?;
    let token = app.require_id_token()?;

    let user = app.auth.current_user(token).await?;

    if output.is_human() {
        let name = user.display_name.as_deref().unwrap_or("(no display name)");
        output.info(format!("{} ({})", name, user.uid));
        if let Some(email) = &user.email {
            output.info(format!("  email: {email}"));
        }
        if user.is_anonymous {
            output.info("  guest session");
        }
    } else {
        output.json(&json!({
            "uid": user.uid,
            "displayName": user.display_name,
            "email": user.email,
            "avatarUrl": user.avatar_url,
            "anonymous": user.is_anonymous,
        }));
    }
    Ok(())
}
