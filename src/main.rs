/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Syn-JDK Core. Lists, installs, selects and
    removes local Java runtimes, and browses the catalog.

  Security / Safety Notes:
    Operates within user privileges. Writes only beneath the
    configured install root and log directory; performs HTTPS
    GET requests only.

  Dependencies:
    clap for CLI parsing, chrono for session stamps, tokio
    signal handling for Ctrl-C.

  Operational Scope:
    Invoked by operators or build scripts needing a JDK path.

  Revision History:
    2026-10-16 COD  Authored Syn-JDK Core runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};

use synjdk_core::catalog::DiscoClient;
use synjdk_core::platform;
use synjdk_core::{
    CancellationToken, InstallOutcome, InstalledPackage, Logger, PackageQuery, Result,
    SynjdkConfig, VersionManager,
};

/// Command-line arguments for Syn-JDK-Core.
#[derive(Debug, Parser)]
#[command(
    name = "synjdk",
    version,
    author = "Synavera Systems",
    about = "Local Java runtime manager"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH", global = true)]
    log: Option<PathBuf>,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List installed runtimes.
    List,
    /// Install the first catalog match for this host.
    Install {
        #[arg(long, value_name = "NAME")]
        distribution: String,
        #[arg(long, value_name = "N")]
        jdk_version: u32,
        /// Catalog operating system; defaults to the host.
        #[arg(long, value_name = "OS")]
        os: Option<String>,
        /// Catalog architecture; defaults to the host.
        #[arg(long, value_name = "ARCH")]
        arch: Option<String>,
        /// Fail if the runtime is already installed.
        #[arg(long, action = ArgAction::SetTrue)]
        fresh: bool,
    },
    /// Print the java executable for a distribution, installing it if needed.
    Use {
        distribution: String,
        major_version: u32,
    },
    /// Remove an installed runtime by package id.
    Remove { id: String },
    /// List catalog distributions.
    Distributions,
    /// List catalog major versions.
    MajorVersions {
        /// Only versions still maintained upstream.
        #[arg(long, action = ArgAction::SetTrue)]
        maintained: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Syn-JDK-Core] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = SynjdkConfig::load_from_optional_path(cli.config.as_deref())?;

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| config.log_dir().join(format!("core_{session_stamp}.log")));
    let logger = Arc::new(Logger::new(Some(log_path), cli.verbose)?);
    logger.info("INIT", "Syn-JDK Core awakening.");

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let manager = VersionManager::from_config(&config)?
        .with_logger(logger.clone())
        .with_cancellation(token);

    let outcome = dispatch(cli.command, &config, &manager, &logger).await;
    if let Err(err) = &outcome {
        logger.error("FAILED", err.to_string());
    }
    logger.finalize()?;
    outcome
}

async fn dispatch(
    command: Command,
    config: &SynjdkConfig,
    manager: &VersionManager,
    logger: &Logger,
) -> Result<ExitCode> {
    match command {
        Command::List => {
            let packages = manager.list().await?;
            if packages.is_empty() {
                println!("→ No runtimes installed under {}", manager.root().display());
            }
            for package in &packages {
                print_package(package);
            }
        }
        Command::Install {
            distribution,
            jdk_version,
            os,
            arch,
            fresh,
        } => {
            let query = PackageQuery::new()
                .distribution(distribution)
                .jdk_version(jdk_version)
                .operating_system(os.unwrap_or_else(|| platform::host_os().to_string()))
                .architecture(arch.unwrap_or_else(|| platform::host_arch().to_string()));
            match manager.install(&query).await? {
                InstallOutcome::Installed(package) => {
                    println!("→ Installed");
                    print_package(&package);
                }
                InstallOutcome::AlreadyPresent(package) => {
                    println!("→ Already installed");
                    print_package(&package);
                    if fresh {
                        logger.warn(
                            "INSTALL",
                            format!("{} was already present; --fresh requested", package.id()),
                        );
                        return Ok(ExitCode::from(12));
                    }
                }
            }
        }
        Command::Use {
            distribution,
            major_version,
        } => {
            let package = manager.use_or_install(&distribution, major_version).await?;
            println!("{}", package.java_exec_path.display());
        }
        Command::Remove { id } => {
            let package = manager.get_by_id(&id).await?;
            manager.remove(&package).await?;
            println!("→ Removed {} ({})", package.id(), package.java_dir.display());
        }
        Command::Distributions => {
            let client = DiscoClient::new(&config.catalog)?;
            for distribution in client.distributions().await? {
                println!(
                    "{:<20} {:<28} maintained={}",
                    distribution.api_parameter, distribution.name, distribution.maintained
                );
            }
        }
        Command::MajorVersions { maintained } => {
            let client = DiscoClient::new(&config.catalog)?;
            for version in client.major_versions(maintained).await? {
                println!(
                    "{:<4} {:<4} {:<10} maintained={}",
                    version.major_version,
                    version.term_of_support,
                    version.release_status,
                    version.maintained
                );
            }
        }
    }
    logger.info("COMPLETE", "Syn-JDK Core finished.");
    Ok(ExitCode::SUCCESS)
}

fn print_package(package: &InstalledPackage) {
    let descriptor = &package.descriptor;
    println!(
        "{:<40} {:<12} {:<4} {:<16} {}",
        package.id(),
        descriptor.distribution,
        descriptor.major_version,
        descriptor.java_version,
        package.java_dir.display()
    );
}
