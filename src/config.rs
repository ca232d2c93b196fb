use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::{env, fmt, fs, path::PathBuf};

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Origin allowed to call the API from a browser.
    pub client_url: String,
    /// `None` when no provider credentials were found; private routes then
    /// answer 500.
    pub identity: Option<IdentityConfig>,
}

/// Identity provider credentials.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct IdentityConfig {
    pub project_id: String,
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_IDENTITY_ENDPOINT.to_string()
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Artwork gallery REST API")]
pub struct Args {
    /// Host to bind to (overrides GALLERY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides GALLERY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides GALLERY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Allowed cross-origin client URL (overrides GALLERY_CLIENT_URL)
    #[arg(long)]
    pub client_url: Option<String>,

    /// JSON credential file used when IDENTITY_PROJECT_ID / IDENTITY_API_KEY
    /// are not set (overrides IDENTITY_CREDENTIALS_FILE)
    #[arg(long)]
    pub identity_credentials: Option<PathBuf>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("GALLERY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("GALLERY_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing GALLERY_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading GALLERY_PORT"),
        };
        let env_db = env::var("GALLERY_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/gallery.db".into());
        let env_client =
            env::var("GALLERY_CLIENT_URL").unwrap_or_else(|_| "http://localhost:5173".into());

        let identity = resolve_identity(
            env::var("IDENTITY_PROJECT_ID").ok(),
            env::var("IDENTITY_API_KEY").ok(),
            env::var("IDENTITY_ENDPOINT").ok(),
            args.identity_credentials
                .or_else(|| env::var_os("IDENTITY_CREDENTIALS_FILE").map(PathBuf::from)),
        )?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            client_url: args.client_url.unwrap_or(env_client),
            identity,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Pick provider credentials: the discrete fields win; otherwise the
/// credential file is loaded; otherwise there is no provider.
pub fn resolve_identity(
    project_id: Option<String>,
    api_key: Option<String>,
    endpoint: Option<String>,
    credentials_file: Option<PathBuf>,
) -> Result<Option<IdentityConfig>> {
    let project_id = project_id.filter(|v| !v.trim().is_empty());
    let api_key = api_key.filter(|v| !v.trim().is_empty());
    let endpoint = endpoint.filter(|v| !v.trim().is_empty());

    if let (Some(project_id), Some(api_key)) = (project_id, api_key) {
        return Ok(Some(IdentityConfig {
            project_id,
            api_key,
            endpoint: endpoint.unwrap_or_else(default_endpoint),
        }));
    }

    let Some(path) = credentials_file else {
        return Ok(None);
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("reading identity credentials {}", path.display()))?;
    let mut cfg: IdentityConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing identity credentials {}", path.display()))?;
    if let Some(endpoint) = endpoint {
        cfg.endpoint = endpoint;
    }
    tracing::info!("Loaded identity credentials from {}", path.display());
    Ok(Some(cfg))
}
