use std::{env, path::PathBuf};

use anyhow::{Context, Result};

/// Optional HTTP Basic credential pair placed in front of the cookie gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicAuthPair {
    pub username: String,
    pub password: String,
}

/// All runtime configuration, read from the environment once at startup and
/// passed into the state explicitly. Handlers never touch `env` themselves.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Shared admin secret. Empty means the admin surface is fully closed.
    pub admin_token: String,
    pub basic_auth: Option<BasicAuthPair>,
    /// Extra origin allowed by the CSP `connect-src` directive.
    pub trusted_data_origin: Option<String>,
    pub production: bool,
    pub database_url: String,
    /// Holds `people.json` and `research.json`.
    pub data_dir: PathBuf,
    /// Holds `news/*.md` and `publications/publications.bib`.
    pub content_dir: PathBuf,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL env var is missing")?;

        let admin_token = env::var("ADMIN_TOKEN").unwrap_or_default();

        let basic_auth = match (env::var("ADMIN_BASIC_USER"), env::var("ADMIN_BASIC_PASS")) {
            (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                Some(BasicAuthPair { username, password })
            }
            _ => None,
        };

        let trusted_data_origin = env::var("TRUSTED_DATA_ORIGIN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let content_dir = env::var("CONTENT_DIR").unwrap_or_else(|_| "content".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Ok(Self {
            admin_token,
            basic_auth,
            trusted_data_origin,
            production,
            database_url,
            data_dir: PathBuf::from(data_dir),
            content_dir: PathBuf::from(content_dir),
            port,
        })
    }

    pub fn news_dir(&self) -> PathBuf {
        self.content_dir.join("news")
    }

    pub fn bibliography_path(&self) -> PathBuf {
        self.content_dir.join("publications").join("publications.bib")
    }
}

#[cfg(test)]
pub(crate) fn test_config(admin_token: &str) -> AppConfig {
    AppConfig {
        admin_token: admin_token.to_string(),
        basic_auth: None,
        trusted_data_origin: None,
        production: false,
        database_url: "postgres://localhost/lab_site_test".to_string(),
        data_dir: PathBuf::from("data"),
        content_dir: PathBuf::from("content"),
        port: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_paths_derive_from_content_dir() {
        let config = test_config("secret1");
        assert_eq!(config.news_dir(), PathBuf::from("content/news"));
        assert_eq!(
            config.bibliography_path(),
            PathBuf::from("content/publications/publications.bib")
        );
    }
}
