//! Login and logout command handlers

use std::io::Write;

use anyhow::{Context, Result};

use gymflow_core::ApiClient;

use crate::output::Output;

/// Log in and persist the session token
pub async fn login(
    client: &ApiClient,
    username: &str,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };

    let session = client
        .login(username, &password)
        .await
        .context("Login failed")?;

    output.success(&format!(
        "Logged in as {} ({})",
        session.user.display_name, session.user.role
    ));
    Ok(())
}

/// Drop the stored session
pub async fn logout(client: &ApiClient, output: &Output) -> Result<()> {
    client.logout().await;
    output.success("Logged out");
    Ok(())
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
