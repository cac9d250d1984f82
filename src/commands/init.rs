//! The init command: create the data directory and the initial configuration.

use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates `$SPENDLOG_HOME`, its `.secrets` subdirectory and an initial `config.json`
/// pointing at the expense API.
pub async fn init(home: &Path, api_base_url: &str, page_size: u32) -> Result<Out<String>> {
    let config = Config::create(home, api_base_url, page_size).await?;
    let root = config.root().display().to_string();
    let message = format!(
        "Initialized spendlog home at {root} pointing at {api_base_url}. \
         Next, create an account with 'spendlog register' or sign in with 'spendlog login'."
    );
    Ok(Out::new(message, root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_a_loadable_home() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("spendlog");
        let out = init(&home, "http://localhost:5001/api", 10).await.unwrap();
        assert!(out.message().contains("Initialized"));

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.api_base_url(), "http://localhost:5001/api");
    }
}
