use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};

pub fn text(prompt: &str) -> Result<String> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()?)
}

pub fn password(prompt: &str) -> Result<String> {
    Ok(rpassword::prompt_password(format!("{prompt}: "))?)
}

/// Use the flag value when given, prompt otherwise.
pub fn text_or(provided: Option<String>, prompt: &str) -> Result<String> {
    match provided {
        Some(value) => Ok(value),
        None => text(prompt),
    }
}
