//! Auth commands: register, login, logout.

use crate::api::Mode;
use crate::commands::Out;
use crate::session::User;
use crate::{api, Config, Result, Session};
use anyhow::Context;
use tracing::info;

/// Creates an account on the server. Does not log in; that is a separate step, matching the
/// server's two endpoints.
pub async fn register(
    config: Config,
    mode: Mode,
    email: &str,
    password: &str,
    name: &str,
) -> Result<Out<User>> {
    let mut store = api::store(&config, None, mode)?;
    let user = store
        .register(email, password, name)
        .await
        .context("Registration failed")?;
    let message = format!(
        "Account created for {}. Sign in with 'spendlog login'.",
        user.email
    );
    Ok(Out::new(message, user))
}

/// Exchanges credentials for a token and establishes the session.
pub async fn login(config: Config, mode: Mode, email: &str, password: &str) -> Result<Out<User>> {
    let mut store = api::store(&config, None, mode)?;
    let response = store.login(email, password).await.context("Login failed")?;
    let session = Session::establish(&config, response.access_token, response.user).await?;
    info!("Session established for user id {}", session.user().id);
    let message = format!("Logged in as {}.", session.user().display_name());
    Ok(Out::new(message, session.user().clone()))
}

/// Clears the saved session. Succeeds even when nobody was logged in.
pub async fn logout(config: Config) -> Result<Out<()>> {
    Session::clear(&config).await?;
    Ok(Out::new_message("Logged out."))
}
