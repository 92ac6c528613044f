use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use xscan::{
    config::Config,
    http::AuthScheme,
    output::{print_probe, print_session, OutputFormat, ProbeReport},
    runner::run_in_session,
    session::ScanSessionClient,
};

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "xscan")]
#[command(
    author,
    version,
    about = "Report source-code scan sessions to a JFrog XSC service"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Platform URL (overrides server.url)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Username for basic auth
    #[arg(long, global = true)]
    user: Option<String>,

    /// Password for basic auth
    #[arg(long, global = true)]
    password: Option<String>,

    /// Access token (takes precedence over username/password)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the server's XSC version and whether scan events are supported
    Probe {
        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Run a command inside a scan session
    Run {
        /// Number of findings to report
        #[arg(long, default_value_t = 0)]
        findings: u32,

        /// Number of ignored findings to report
        #[arg(long, default_value_t = 0)]
        ignored: u32,

        /// Mark the scan as a CI run
        #[arg(long)]
        ci: bool,

        /// Output format for the session summary (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Command to run, after `--`
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "xscan=debug" } else { "xscan=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    match cli.command {
        Commands::Config { init, path } => {
            handle_config(&config_path, init, path)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Probe { ref format } => {
            let format = parse_format(format.as_deref())?;
            let config = load_config(&cli, &config_path)?;
            run_probe(config, format).await
        }
        Commands::Run {
            findings,
            ignored,
            ci,
            ref format,
            ref command,
        } => {
            let format = parse_format(format.as_deref())?;
            let mut config = load_config(&cli, &config_path)?;
            config.is_ci_run |= ci;
            run_session(config, command, findings, ignored, format).await
        }
    }
}

fn parse_format(format: Option<&str>) -> Result<OutputFormat> {
    OutputFormat::from_str(format.unwrap_or("table")).map_err(|e| anyhow::anyhow!(e))
}

/// Loads the config file and applies command-line overrides.
fn load_config(cli: &Cli, path: &std::path::Path) -> Result<Config> {
    let mut config = Config::load_from(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    if let Some(url) = &cli.url {
        config.server.url = url.clone();
    }
    if let Some(user) = &cli.user {
        config.server.username = Some(user.clone());
    }
    if let Some(password) = &cli.password {
        config.server.password = Some(password.clone());
    }
    if let Some(token) = &cli.token {
        config.server.access_token = Some(token.clone());
    }

    if config.server.url.trim().is_empty() {
        bail!(
            "No server URL configured. Use --url or set server.url in {}",
            path.display()
        );
    }

    Ok(config)
}

async fn run_probe(config: Config, format: OutputFormat) -> Result<u8> {
    let is_interactive = format == OutputFormat::Table;
    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Contacting {}...", config.server.url));
        Some(pb)
    } else {
        None
    };

    let server_url = config.server.url.clone();
    let auth = AuthScheme::of(&config.server);
    let client = ScanSessionClient::connect(config).await?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = ProbeReport::new(&server_url, auth, &client);
    print_probe(&report, format)?;
    Ok(exit_codes::SUCCESS)
}

async fn run_session(
    config: Config,
    command: &[String],
    findings: u32,
    ignored: u32,
    format: OutputFormat,
) -> Result<u8> {
    let (program, args) = match command.split_first() {
        Some(split) => split,
        None => bail!("No command given. Usage: xscan run -- <command> [args...]"),
    };

    let mut client = ScanSessionClient::connect(config).await?;
    let report = run_in_session(&mut client, program, args, findings, ignored).await;
    print_session(&report, format)?;

    if let Some(error) = &report.spawn_error {
        bail!("Failed to run {}: {}", program, error);
    }
    Ok(u8::try_from(report.exit_code).unwrap_or(exit_codes::ERROR))
}

fn handle_config(config_path: &std::path::Path, init: bool, show_path: bool) -> Result<()> {
    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save_to(config_path)?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'xscan config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
