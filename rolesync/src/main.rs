// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{LevelFilter, error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use rolesync::app_state::AppState;
use rolesync::config::{Config, ValidatedConfig};
use rolesync::discord::DiscordClient;
use rolesync::discord::commands::guild_commands;
use rolesync::dispatch;

const HELP_TEXT: &str = "\
Usage: rolesync [-C <root>]

Runs the role sync webhook and Discord interactions server.

Options:
  -C <root>    Directory holding an optional config.yaml (default: .)
  -h, --help   Show this help
";

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the configuration directory.");
            return 1;
        }
    };

    if parsed_args.help {
        print!("{}", HELP_TEXT);
        return 0;
    }

    let validated_config = match Config::load_and_validate(&parsed_args.config_root) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    if let Err(error) = init_logging(&validated_config.logging.level) {
        eprintln!("❌ Failed to initialize logger: {}", error);
        return 1;
    }
    for warning in &validated_config.warnings {
        warn!("{}", warning);
    }

    match System::new().block_on(run_server(validated_config)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

fn init_logging(level: &str) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_default_env()
        .filter_level(parse_log_level(level))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
}

async fn run_server(validated_config: ValidatedConfig) -> std::io::Result<()> {
    let validated_config = Arc::new(validated_config);
    log_startup_info(&validated_config);

    let client = DiscordClient::new(&validated_config.discord).map_err(|error| {
        error!("Failed to build Discord client: {}", error);
        std::io::Error::other(error.to_string())
    })?;
    let client = Arc::new(client);

    if validated_config.discord.register_commands {
        match client.register_guild_commands(&guild_commands()).await {
            Ok(()) => info!("✅ Slash commands registered"),
            Err(error) => error!("Error registering commands: {}", error),
        }
    }

    let app_state = AppState::new(validated_config.clone(), client.clone(), client)
        .map_err(|error| std::io::Error::other(error.to_string()))?;
    if app_state.verifier.is_none() {
        warn!("DISCORD_PUBLIC_KEY is not set; /interactions will answer 404");
    }
    let app_state = Arc::new(app_state);
    info!("✅ App state initialized");

    let workers = validated_config.server.workers;
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(app_state.clone()))
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
            ))
            .configure(dispatch::configure)
    })
    .workers(workers)
    .bind(validated_config.server.address_tuple())?;

    info!(
        "Server is running on {}:{}",
        validated_config.server.host, validated_config.server.port
    );
    server.run().await
}

fn log_startup_info(config: &ValidatedConfig) {
    info!("Starting rolesync {}", env!("CARGO_PKG_VERSION"));
    info!("Workers: {}", config.server.workers);
    info!("Guild: {}", config.discord.guild_id);
    info!("Frontend URL: {}", config.frontend_url);
    info!("Managed roles: {}", config.managed_roles.len());
    if config.managed_roles.is_empty() {
        warn!("No managed roles configured; revocations are disabled");
    }
    info!(
        "Reconciliation timeout: {}s",
        config.reconcile_timeout.as_secs()
    );

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

struct ParsedArgs {
    config_root: PathBuf,
    help: bool,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config_root = PathBuf::from(".");
    let mut help = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--" => continue,
            "-h" | "--help" | "help" => help = true,
            "-C" => {
                let value = args
                    .next()
                    .ok_or_else(|| "Missing value for -C".to_string())?;
                config_root = PathBuf::from(value);
            }
            other => return Err(format!("Unexpected argument: {}", other)),
        }
    }

    Ok(ParsedArgs { config_root, help })
}

#[cfg(test)]
mod tests {
    use super::{parse_args_from, parse_log_level};
    use log::LevelFilter;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_args_defaults_to_current_directory() {
        let parsed = parse_args_from(Vec::new()).expect("parse args");
        assert!(!parsed.help);
        assert_eq!(parsed.config_root, std::path::PathBuf::from("."));
    }

    #[test]
    fn parse_args_accepts_config_root() {
        let parsed = parse_args_from(args(&["--", "-C", "runtime"])).expect("parse args");
        assert!(parsed.config_root.ends_with("runtime"));
    }

    #[test]
    fn parse_args_detects_help() {
        assert!(parse_args_from(args(&["-h"])).expect("parse").help);
        assert!(parse_args_from(args(&["-C", "x", "--help"])).expect("parse").help);
    }

    #[test]
    fn parse_args_rejects_missing_root_and_unknown_flags() {
        match parse_args_from(args(&["-C"])) {
            Err(error) => assert!(error.contains("-C")),
            Ok(_) => panic!("expected missing value error"),
        }
        assert!(parse_args_from(args(&["-F"])).is_err());
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        assert_eq!(parse_log_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_log_level("loud"), LevelFilter::Info);
    }
}
