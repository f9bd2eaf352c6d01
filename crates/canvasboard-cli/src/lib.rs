//! Canvasboard command line host.
//!
//! Drives the persistence bridge and the preview renderer against a running
//! storage server without a window.

mod commands;

pub use commands::{CliError, CliResult};

use canvasboard_core::ClientConfig;
use canvasboard_core::config::DEFAULT_API_URL;
use canvasboard_core::persistence::{HttpCanvasApi, PersistenceBridge, StaticIdentity};
use canvasboard_core::view_sync::PREVIEW_SCALE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Canvasboard drawing tool
#[derive(Parser, Debug)]
#[command(name = "canvasboard")]
#[command(about = "List, open, export and save Canvasboard canvases")]
#[command(version)]
pub struct Cli {
    /// Storage server base URL
    #[arg(long, env = "CANVASBOARD_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Signed-in user id
    #[arg(long, env = "CANVASBOARD_USER_ID")]
    pub user: Option<String>,

    /// Bearer token for the user
    #[arg(long, env = "CANVASBOARD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List your saved canvases, newest first
    List,
    /// Download a canvas by id and write its scene JSON
    Open {
        id: Uuid,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Save a scene JSON file as a new canvas
    Save {
        file: PathBuf,
        #[arg(short, long)]
        name: String,
    },
    /// Render a scene to PNG, from a local file or a saved canvas
    Export {
        /// Local scene JSON file
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        file: Option<PathBuf>,
        /// Saved canvas id
        #[arg(long)]
        id: Option<Uuid>,
        #[arg(short, long)]
        out: PathBuf,
        /// Raster scale relative to the scene size
        #[arg(long, default_value_t = PREVIEW_SCALE)]
        scale: f64,
        /// Write a base64 data URL instead of raw PNG bytes
        #[arg(long)]
        data_url: bool,
    },
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            user_id: self.user.clone(),
            token: self.token.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

/// Build the HTTP bridge for a configuration.
pub fn connect(config: &ClientConfig) -> CliResult<PersistenceBridge> {
    let user_id = config.user_id.clone().ok_or(CliError::MissingIdentity("user id"))?;
    let token = config.token.clone().ok_or(CliError::MissingIdentity("token"))?;
    let api = HttpCanvasApi::new(config)?;
    Ok(PersistenceBridge::new(
        Arc::new(api),
        Arc::new(StaticIdentity::new(user_id, token)),
    ))
}

/// Run the CLI command
pub async fn run(cli: Cli) -> CliResult<()> {
    let config = cli.client_config();
    let mut stdout = std::io::stdout();
    match cli.command {
        Commands::Export {
            file: Some(file),
            out,
            scale,
            data_url,
            ..
        } => {
            let scene = commands::read_scene(&file)?;
            commands::export(&scene, &out, scale, data_url)
        }
        Commands::Export {
            id: Some(id),
            out,
            scale,
            data_url,
            ..
        } => {
            let bridge = connect(&config)?;
            let scene = commands::fetch_scene(&bridge, id).await?;
            commands::export(&scene, &out, scale, data_url)
        }
        Commands::Export { .. } => Err(CliError::NoSource),
        Commands::List => commands::list(&connect(&config)?, &mut stdout).await,
        Commands::Open { id, out } => {
            let bridge = connect(&config)?;
            let scene = commands::fetch_scene(&bridge, id).await?;
            let json = scene.to_json()?;
            match out {
                Some(path) => Ok(std::fs::write(path, json)?),
                None => commands::write_line(&mut stdout, &json),
            }
        }
        Commands::Save { file, name } => {
            let bridge = connect(&config)?;
            let scene = commands::read_scene(&file)?;
            commands::save(&bridge, &scene, &name, &mut stdout).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_from_file() {
        let cli = Cli::try_parse_from([
            "canvasboard",
            "export",
            "--file",
            "scene.json",
            "--out",
            "scene.png",
            "--scale",
            "0.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                file, id, scale, data_url, ..
            } => {
                assert_eq!(file, Some(PathBuf::from("scene.json")));
                assert!(id.is_none());
                assert!((scale - 0.5).abs() < f64::EPSILON);
                assert!(!data_url);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_export_needs_a_source() {
        assert!(Cli::try_parse_from(["canvasboard", "export", "--out", "x.png"]).is_err());
    }

    #[test]
    fn test_client_config_from_flags() {
        let cli = Cli::try_parse_from([
            "canvasboard",
            "--api-url",
            "http://example.test",
            "--user",
            "alice",
            "--token",
            "secret",
            "--timeout",
            "5",
            "list",
        ])
        .unwrap();
        let config = cli.client_config();
        assert_eq!(config.api_url, "http://example.test");
        assert_eq!(config.user_id.as_deref(), Some("alice"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_connect_requires_identity() {
        let config = ClientConfig::default();
        assert!(matches!(
            connect(&config),
            Err(CliError::MissingIdentity("user id"))
        ));
    }
}
