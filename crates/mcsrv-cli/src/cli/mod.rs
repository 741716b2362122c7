//! CLI for the mcsrv launcher.

mod launch;

use anyhow::Result;
use clap::{ArgAction, Parser};
use mcsrv_core::config::{self, McsrvConfig};
use std::path::PathBuf;

/// Resolve a server release, make sure the local jar matches the catalog, and run it.
#[derive(Debug, Parser)]
#[command(name = "mcsrv")]
#[command(about = "mcsrv: verified server launcher", long_about = None)]
pub struct Cli {
    /// Filename to use for the server.
    #[arg(long, default_value = "server.jar", value_name = "PATH")]
    pub filename: PathBuf,

    /// Version to use: 'release' (default), 'snapshot', or a specific version id.
    #[arg(long, default_value = "release", value_name = "SELECTOR")]
    pub version: String,

    /// Resolve and verify the jar before launching. `--do-version-check=false` launches directly.
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Set,
        value_name = "BOOL"
    )]
    pub do_version_check: bool,

    /// Program that runs the jar (overrides `java` in config.toml).
    #[arg(long, value_name = "PROGRAM")]
    pub java: Option<String>,

    /// Version manifest URL (overrides `manifest_url` in config.toml).
    #[arg(long, value_name = "URL")]
    pub manifest_url: Option<String>,

    /// Arguments passed to the launched process, before the jar flags.
    /// Put them after `--` when they start with '-'.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

impl Cli {
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        launch::run(cli, &cfg).await
    }

    /// Program to launch: flag first, then config.
    pub fn program(&self, cfg: &McsrvConfig) -> String {
        self.java.clone().unwrap_or_else(|| cfg.java.clone())
    }

    /// Catalog URL: flag first, then config.
    pub fn manifest_url(&self, cfg: &McsrvConfig) -> String {
        self.manifest_url
            .clone()
            .unwrap_or_else(|| cfg.manifest_url.clone())
    }
}
