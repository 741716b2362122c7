//! Default command: provision (unless disabled) then supervise the child.

use anyhow::{Context, Result};
use mcsrv_core::config::McsrvConfig;
use mcsrv_core::http::{CurlOptions, CurlSource};
use mcsrv_core::provision::provision;
use mcsrv_core::resolver::VersionSelector;
use mcsrv_core::supervisor::{LaunchSpec, Supervisor};
use std::time::Duration;

use super::Cli;

/// Returns the exit code to terminate with (the child's).
pub async fn run(cli: Cli, cfg: &McsrvConfig) -> Result<i32> {
    let program = cli.program(cfg);

    let spec = if cli.do_version_check {
        let source = CurlSource::new(CurlOptions::from(cfg));
        let manifest_url = cli.manifest_url(cfg);
        let selector: VersionSelector = cli.version.parse()?;
        let path = cli.filename.clone();
        let artifact = tokio::task::spawn_blocking(move || {
            provision(&source, &manifest_url, &selector, &path)
        })
        .await
        .context("provisioning task panicked")??;
        LaunchSpec::verified(&program, &artifact, &cli.args)
    } else {
        tracing::warn!(
            path = %cli.filename.display(),
            "version check disabled; launching without verification"
        );
        LaunchSpec::unchecked(&program, &cli.filename, &cli.args)
    };

    let supervisor = Supervisor::new(Duration::from_millis(cfg.stdin_grace_ms));
    let report = supervisor
        .run(&spec, tokio::io::stdin(), tokio::io::stdout())
        .await?;
    tracing::info!(
        code = report.exit_code(),
        stdin = ?report.stdin,
        stdout = ?report.stdout,
        "run finished"
    );
    Ok(report.exit_code())
}
