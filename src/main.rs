//! River Flood Prediction CLI
//!
//! Serves a frozen neural network classifier over HTTP and from the command
//! line.

use clap::{Parser, Subcommand};
use flood::{Config, Result};

#[derive(Parser)]
#[command(name = "flood")]
#[command(about = "River flood prediction using a frozen neural network", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "flood.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP prediction server
    Serve {
        /// Override bind address
        #[arg(long)]
        host: Option<String>,
        /// Override port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Predict flood risk for a request file (JSON)
    Predict {
        /// Request file
        input: String,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Copy trained artifacts into the serving locations
    Setup {
        /// Training workspace containing the artifacts
        #[arg(long, default_value = "..")]
        root: String,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show where the model is searched for and what was found
    Info,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Serve { host, port } => commands::serve(config, host, port),
        Commands::Predict { input, format } => commands::predict(&config, &input, format),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
        Commands::Setup { root } => commands::setup(&config, &root),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use flood::api::{self, AppState};
    use flood::data::package_artifacts;
    use flood::model::{AttemptOutcome, BurnLoader, FloodNetConfig};
    use flood::predict::{bootstrap, format_prediction, NormalizationStatus};
    use flood::{FloodError, PredictionRequest};
    use std::net::SocketAddr;
    use std::path::Path;

    fn loader(config: &Config) -> BurnLoader {
        BurnLoader::new(FloodNetConfig::from_model_config(&config.model))
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("models")?;
        println!("Created models/ directory");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'flood setup --root <training dir>' to copy the model");
        println!("  3. Run 'flood serve' to start the API");

        Ok(())
    }

    pub fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| FloodError::Config(format!("Invalid bind address: {}", e)))?;

        log::info!("Starting River Flood Prediction API...");
        let startup = bootstrap(&config, &loader(&config));
        let state = AppState::new(startup.service);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(api::serve(state, addr))
    }

    pub fn predict(config: &Config, input: &str, format: OutputFormat) -> Result<()> {
        let content = std::fs::read_to_string(input)?;
        let request: PredictionRequest = serde_json::from_str(&content)?;

        let startup = bootstrap(config, &loader(config));
        let served = startup.service.predict_timed(&request)?;

        match format {
            OutputFormat::Table => print!("{}", format_prediction(&served)),
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "prediction": served.outcome.decision,
                    "probability": served.outcome.probability,
                    "confidence": served.outcome.confidence,
                    "model_used": served.model_used,
                    "processing_time": served.processing_time.as_secs_f64(),
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }

        Ok(())
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let startup = bootstrap(config, &loader(config));

        println!("Model Information");
        println!("───────────────────────────────");
        println!("  Name:           {}", startup.service.model_name());
        println!("  Hidden layers:  {:?}", config.model.hidden_dims);
        match &startup.normalization {
            NormalizationStatus::Loaded(n) => {
                println!("  Normalization:  {} features", n)
            }
            NormalizationStatus::Missing => println!("  Normalization:  none (raw features)"),
            NormalizationStatus::Invalid(e) => println!("  Normalization:  invalid ({})", e),
        }

        println!("\nCandidates");
        println!("───────────────────────────────");
        for path in config.candidate_paths() {
            let status = startup
                .report
                .attempts
                .iter()
                .find(|a| a.path == path)
                .map(|a| a.outcome.to_string())
                .unwrap_or_else(|| "not tried".to_string());
            let marker = match startup.service.gateway().source() {
                Some(loaded) if loaded == path.as_path() => "*",
                _ => " ",
            };
            println!(" {} {}  [{}]", marker, path.display(), status);
        }

        if !startup.report.is_success() {
            let failures = startup
                .report
                .attempts
                .iter()
                .filter(|a| matches!(a.outcome, AttemptOutcome::Failed(_)))
                .count();
            println!("\nNo model loaded ({} candidates failed to parse)", failures);
        }

        Ok(())
    }

    pub fn setup(config: &Config, root: &str) -> Result<()> {
        let model_dest = config.candidate_paths().into_iter().next().ok_or_else(|| {
            FloodError::Config("model.candidates is empty".to_string())
        })?;

        println!("Setting up model files...");
        let report = package_artifacts(
            Path::new(root),
            &model_dest,
            Path::new(&config.data.normalization_path),
        )?;

        match &report.model {
            Some(copied) => println!(
                "Copied model: {} -> {}",
                copied.source.display(),
                copied.destination.display()
            ),
            None => println!("Warning: Neural network model not found"),
        }
        match &report.normalization {
            Some(copied) => println!(
                "Copied normalization parameters: {} -> {}",
                copied.source.display(),
                copied.destination.display()
            ),
            None => println!("Warning: Normalization parameters not found"),
        }

        println!("\nModel setup completed!");
        Ok(())
    }
}
