//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], [`validate`], [`check`], or
//! [`health`]. Each handler lives in its own submodule. [`resolve_config`]
//! is the route lookup shared by `run` and `check`.

pub mod check;
pub mod health;
pub mod init;
pub mod run;
pub mod validate;

use std::path::{Path, PathBuf};

use crate::cli::{Cli, Commands, RouteArgs};
use crate::config::sources::{self, AUTO_DETECT_CANDIDATES};
use crate::config::validation::validate;
use crate::config::ConfigSource;
use crate::error::HostGuardError;
use crate::server::LoadedConfig;

pub async fn dispatch(cli: Cli) -> Result<(), HostGuardError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Check(args)) => check::execute(args).await,
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

/// Load the allowed route.
///
/// An explicit `--config` wins, then an auto-detected `hostguard.*` file in
/// the working directory, then `--route-host` with `--route-port` alone.
/// Route flags override whatever the file says.
pub async fn resolve_config(args: &RouteArgs) -> Result<LoadedConfig, HostGuardError> {
    resolve_config_in(args, Path::new(".")).await
}

/// [`resolve_config`] with auto-detection rooted at `dir`.
pub async fn resolve_config_in(
    args: &RouteArgs,
    dir: &Path,
) -> Result<LoadedConfig, HostGuardError> {
    let file_source = resolve_file_source(args, dir).await?;

    let (mut config, mut version, source_name) = match file_source {
        Some(source) => {
            let (config, version) = source.load().await?;
            (config, version, source.name().to_string())
        }
        None => match (&args.route_host, args.route_port) {
            (Some(host), Some(port)) => {
                let (config, version) = sources::from_route_args(host, port)?;
                (config, version, "cli".to_string())
            }
            _ => {
                return Err(HostGuardError::NoConfigSource {
                    hint: "Provide --config <file>, or both --route-host and --route-port.\n  \
                           Run 'hostguard init' to create a config file."
                        .into(),
                })
            }
        },
    };

    if args.route_host.is_some() || args.route_port.is_some() {
        if let Some(ref host) = args.route_host {
            config.route.host.clone_from(host);
        }
        if let Some(port) = args.route_port {
            config.route.port = port;
        }
        if let Err(errors) = validate(&config) {
            return Err(HostGuardError::ConfigValidation { errors });
        }
        let (_, overridden) = sources::from_route_args(&config.route.host, config.route.port)?;
        version = overridden;
    }

    Ok(LoadedConfig {
        config,
        version,
        source_name,
        loaded_at: std::time::Instant::now(),
    })
}

async fn resolve_file_source(
    args: &RouteArgs,
    dir: &Path,
) -> Result<Option<Box<dyn ConfigSource>>, HostGuardError> {
    if let Some(ref path) = args.config {
        return sources::create_file_source(path).map(Some);
    }

    // Flags alone are a complete route; don't let a stray file shadow them
    if args.route_host.is_some() && args.route_port.is_some() {
        return Ok(None);
    }

    match detect_config_file(dir).await {
        Some(path) => {
            tracing::info!(path = %path.display(), "auto-detected config file");
            sources::create_file_source(&path).map(Some)
        }
        None => Ok(None),
    }
}

/// First `hostguard.*` candidate present in `dir`.
pub async fn detect_config_file(dir: &Path) -> Option<PathBuf> {
    for name in AUTO_DETECT_CANDIDATES {
        let path = dir.join(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Some(path);
        }
    }
    None
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  hostguard v{version} \u{2014} Host header validation gate\n\n  \
         No command provided. To get started:\n\n    \
         hostguard init                     Generate a starter config\n    \
         hostguard run                      Start the gate (auto-detects ./hostguard.yaml)\n    \
         hostguard check -H 'Host: x'       Evaluate headers without a server\n    \
         hostguard --help                   See all commands and options\n"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hostguard-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const ROUTE_YAML: &str = "route:\n  host: verification.example\n  port: 8080\n";

    #[tokio::test]
    async fn route_flags_alone_build_a_config() {
        let args = RouteArgs {
            config: None,
            route_host: Some("verification.example".into()),
            route_port: Some(8080),
        };
        let loaded = resolve_config(&args).await.unwrap();
        assert_eq!(loaded.source_name, "cli");
        assert_eq!(loaded.config.route.host, "verification.example");
        assert_eq!(loaded.config.route.port, 8080);
    }

    #[tokio::test]
    async fn invalid_route_flags_fail_validation() {
        let args = RouteArgs {
            config: None,
            route_host: Some("verification.example:8080".into()),
            route_port: Some(8080),
        };
        let err = resolve_config(&args).await.unwrap_err();
        assert!(matches!(err, HostGuardError::ConfigValidation { .. }));
    }

    #[cfg(feature = "yaml")]
    #[tokio::test]
    async fn missing_explicit_file_is_reported() {
        let args = RouteArgs {
            config: Some(PathBuf::from("does-not-exist.yaml")),
            ..RouteArgs::default()
        };
        let err = resolve_config(&args).await.unwrap_err();
        assert!(matches!(err, HostGuardError::ConfigFileNotFound { .. }));
    }

    #[tokio::test]
    async fn route_host_alone_is_not_a_source() {
        let dir = scratch_dir("host-only");
        let args = RouteArgs {
            route_host: Some("verification.example".into()),
            ..RouteArgs::default()
        };
        let err = resolve_config_in(&args, &dir).await.unwrap_err();
        assert!(matches!(err, HostGuardError::NoConfigSource { .. }));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn nothing_configured_is_reported() {
        let dir = scratch_dir("empty");
        let err = resolve_config_in(&RouteArgs::default(), &dir).await.unwrap_err();
        assert!(matches!(err, HostGuardError::NoConfigSource { .. }));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(feature = "yaml")]
    #[tokio::test]
    async fn config_file_is_auto_detected() {
        let dir = scratch_dir("auto-detect");
        assert_eq!(detect_config_file(&dir).await, None);

        std::fs::write(dir.join("hostguard.yml"), ROUTE_YAML).unwrap();
        assert_eq!(detect_config_file(&dir).await, Some(dir.join("hostguard.yml")));

        // .yaml is listed ahead of .yml
        std::fs::write(dir.join("hostguard.yaml"), ROUTE_YAML).unwrap();
        assert_eq!(detect_config_file(&dir).await, Some(dir.join("hostguard.yaml")));

        let loaded = resolve_config_in(&RouteArgs::default(), &dir).await.unwrap();
        assert_eq!(loaded.config.route.host, "verification.example");
        assert_eq!(loaded.config.route.port, 8080);
        assert_ne!(loaded.source_name, "cli");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(feature = "yaml")]
    #[tokio::test]
    async fn route_flags_override_the_file() {
        let dir = scratch_dir("override");
        let path = dir.join("gate.yaml");
        std::fs::write(&path, ROUTE_YAML).unwrap();

        let from_file = resolve_config_in(
            &RouteArgs {
                config: Some(path.clone()),
                ..RouteArgs::default()
            },
            &dir,
        )
        .await
        .unwrap();

        let args = RouteArgs {
            config: Some(path),
            route_host: None,
            route_port: Some(9443),
        };
        let overridden = resolve_config_in(&args, &dir).await.unwrap();
        assert_eq!(overridden.config.route.host, "verification.example");
        assert_eq!(overridden.config.route.port, 9443);
        assert_eq!(overridden.source_name, from_file.source_name);

        let (_, expected) = sources::from_route_args("verification.example", 9443).unwrap();
        assert_eq!(overridden.version, expected);
        assert_ne!(overridden.version, from_file.version);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(feature = "yaml")]
    #[tokio::test]
    async fn route_flags_alone_ignore_a_stray_file() {
        let dir = scratch_dir("stray");
        std::fs::write(dir.join("hostguard.yaml"), ROUTE_YAML).unwrap();

        let args = RouteArgs {
            config: None,
            route_host: Some("portal.example".into()),
            route_port: Some(443),
        };
        let loaded = resolve_config_in(&args, &dir).await.unwrap();
        assert_eq!(loaded.source_name, "cli");
        assert_eq!(loaded.config.route.host, "portal.example");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(feature = "yaml")]
    #[tokio::test]
    async fn invalid_override_fails_validation() {
        let dir = scratch_dir("bad-override");
        let path = dir.join("gate.yaml");
        std::fs::write(&path, ROUTE_YAML).unwrap();

        let args = RouteArgs {
            config: Some(path),
            route_host: Some("gate.example:8080".into()),
            route_port: None,
        };
        let err = resolve_config_in(&args, &dir).await.unwrap_err();
        assert!(matches!(err, HostGuardError::ConfigValidation { .. }));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
