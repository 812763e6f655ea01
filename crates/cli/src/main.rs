mod commands;
mod config;
mod logging;
mod serve;
mod workflow;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::ServerConfig;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Container damage report workflow.
#[derive(Parser)]
#[command(name = "dockcheck", version, about = "Container damage report workflow")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the report workflow HTTP API server
    Serve {
        /// Port to listen on (overrides config file and DOCKCHECK_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Log filter used when RUST_LOG is unset (e.g. info, dockcheck=debug)
        #[arg(long)]
        log_level: Option<String>,
        /// Emit logs as JSON lines
        #[arg(long)]
        json_logs: bool,
        /// Path to TLS certificate PEM file (requires --tls-key)
        #[arg(long)]
        tls_cert: Option<PathBuf>,
        /// Path to TLS private key PEM file (requires --tls-cert)
        #[arg(long)]
        tls_key: Option<PathBuf>,
    },

    /// Check a report file's action history against its stored fields
    Verify {
        /// Path to the report JSON file
        report: PathBuf,
    },

    /// Print the certificate data for a report file
    Certificate {
        /// Path to the report JSON file
        report: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            config,
            log_level,
            json_logs,
            tls_cert,
            tls_key,
        } => {
            let overrides = ServeOverrides {
                port,
                log_level,
                json_logs,
            };
            cmd_serve(config, overrides, tls_cert, tls_key, cli.output, cli.quiet);
        }
        Commands::Verify { report } => {
            commands::verify::cmd_verify(&report, cli.output, cli.quiet);
        }
        Commands::Certificate { report } => {
            commands::certificate::cmd_certificate(&report, cli.output, cli.quiet);
        }
    }
}

/// Flag values that win over the config file and environment.
struct ServeOverrides {
    port: Option<u16>,
    log_level: Option<String>,
    json_logs: bool,
}

fn cmd_serve(
    config_path: Option<PathBuf>,
    overrides: ServeOverrides,
    tls_cert: Option<PathBuf>,
    tls_key: Option<PathBuf>,
    output: OutputFormat,
    quiet: bool,
) {
    // Validate TLS flags: both must be provided or neither
    if tls_cert.is_some() != tls_key.is_some() {
        report_error(
            "error: --tls-cert and --tls-key must both be provided",
            output,
            quiet,
        );
        process::exit(1);
    }
    if tls_cert.is_some() && cfg!(not(feature = "tls")) {
        report_error(
            "error: TLS requested but this binary was built without the `tls` feature",
            output,
            quiet,
        );
        process::exit(1);
    }

    let config = ServerConfig::load(config_path.as_deref())
        .map(|mut config| {
            if let Some(port) = overrides.port {
                config.port = port;
            }
            if let Some(level) = overrides.log_level {
                config.log_level = level;
            }
            config.json_logs |= overrides.json_logs;
            config
        })
        .and_then(ServerConfig::validate);
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("configuration error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    logging::init(&config.log_level, config.json_logs);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("failed to create tokio runtime: {}", e), output, quiet);
            process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(serve::start_server(&config, tls_cert, tls_key)) {
        report_error(&format!("Server error: {}", e), output, quiet);
        process::exit(1);
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
