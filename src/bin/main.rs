//! ESIA client CLI
//!
//! Builds signed client secrets, inspects them, verifies provider tokens and
//! manages the client configuration file.

use clap::{Parser, Subcommand, ValueEnum};
use esia_auth::{
    infra::pem, services::codec, ConfigManager, EsiaConfiguration, EsiaOAuthFlow, ExportFormat,
    SignatureSuite, SignedMessageInspector, TokenVerifier,
};
use miette::{Context, IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "esia-auth")]
#[command(about = "Signed client secrets and token verification for the ESIA identity provider")]
#[command(long_about = "
ESIA client - OAuth2 client-secret signing (RSA or GOST R 34.10-2012)

EXAMPLES:
    # Create a configuration file, then point it at your key material
    esia-auth config init
    esia-auth config set client_id ABC123
    esia-auth config set certificate_path ./client.pem
    esia-auth config set private_key_path ./client.key

    # Print authorization parameters for a request
    esia-auth secret --state 3f1c9a2e-0d5b-4f8e-9a77-6b0c1d2e3f40

    # Decode a client secret and check its signature
    esia-auth inspect <SECRET> --verify rsa

    # Verify a token from a file against the provider key
    esia-auth verify-token @token.txt --public-key provider.pem

ENVIRONMENT VARIABLES:
    RUST_LOG        Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the per-user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print signed authorization parameters for the configured client
    Secret {
        /// OAuth2 state (a random UUID when omitted)
        #[arg(short, long)]
        state: Option<String>,

        /// Access type override (online or offline)
        #[arg(long)]
        access_type: Option<String>,

        /// Print token endpoint parameters instead
        #[arg(long)]
        token: bool,

        /// Print the full authorization URL instead
        #[arg(long, conflicts_with = "token")]
        url: bool,
    },

    /// Decode a compact token and verify its signature
    VerifyToken {
        /// Token text, or @FILE to read it from a file
        #[arg(value_name = "TOKEN")]
        token: String,

        /// Provider public key PEM (overrides config)
        #[arg(short, long, value_name = "PEM")]
        public_key: Option<PathBuf>,
    },

    /// Decode a client secret and print its structure
    Inspect {
        /// Client secret text, or @FILE to read it from a file
        #[arg(value_name = "SECRET")]
        secret: String,

        /// Also verify the signature under this suite
        #[arg(long, value_enum)]
        verify: Option<SuiteArg>,
    },

    /// Print the current timestamp in the provider's format
    Timestamp,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Create default configuration file
    Init,

    /// Print the configuration file path
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Export configuration
    Export {
        /// Export format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import configuration
    Import {
        /// Configuration file to import
        file: PathBuf,
        /// Import format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum SuiteArg {
    Rsa,
    Gost,
}

impl From<SuiteArg> for SignatureSuite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Rsa => SignatureSuite::RsaSha256,
            SuiteArg::Gost => SignatureSuite::Gost34_10_2012_256,
        }
    }
}

#[derive(ValueEnum, Clone)]
enum ExportFormatArg {
    Toml,
    Json,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Toml => ExportFormat::Toml,
            ExportFormatArg::Json => ExportFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new().into_diagnostic()?,
    };

    match cli.command {
        Commands::Secret {
            state,
            access_type,
            token,
            url,
        } => {
            handle_secret_command(&config_manager, state, access_type, token, url).await?;
        }

        Commands::VerifyToken { token, public_key } => {
            handle_verify_token_command(&config_manager, &token, public_key)?;
        }

        Commands::Inspect { secret, verify } => {
            handle_inspect_command(&secret, verify)?;
        }

        Commands::Timestamp => {
            println!("{}", codec::timestamp_now());
        }

        Commands::Config(config_cmd) => {
            handle_config_command(&config_manager, config_cmd)?;
        }
    }

    Ok(())
}

/// `@path` reads the argument from a file; anything else is taken literally.
fn read_argument(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("Failed to read {path}"))
            .map(|text| text.trim().to_string()),
        None => Ok(value.trim().to_string()),
    }
}

fn load_config(config_manager: &ConfigManager) -> Result<EsiaConfiguration> {
    config_manager
        .load()
        .into_diagnostic()
        .with_context(|| {
            format!(
                "No usable configuration at {}. Use 'config init' to create one.",
                config_manager.config_path().display()
            )
        })
}

async fn handle_secret_command(
    config_manager: &ConfigManager,
    state: Option<String>,
    access_type: Option<String>,
    token: bool,
    url: bool,
) -> Result<()> {
    let config = load_config(config_manager)?;
    let flow = EsiaOAuthFlow::from_config(&config)
        .into_diagnostic()
        .context("Failed to set up the OAuth2 client")?;
    let state = state.unwrap_or_else(EsiaOAuthFlow::new_state);

    if token {
        let params = flow.token_params_async(state).await.into_diagnostic()?;
        println!("{}", serde_json::to_string_pretty(&params).into_diagnostic()?);
    } else if url {
        let url = flow
            .authorization_url(&state, access_type.as_deref())
            .into_diagnostic()?;
        println!("{url}");
    } else {
        let params = flow
            .authorization_params_async(state.clone(), access_type)
            .await
            .into_diagnostic()?;
        println!("state: {state}");
        println!("{}", serde_json::to_string_pretty(&params).into_diagnostic()?);
    }
    Ok(())
}

fn handle_verify_token_command(
    config_manager: &ConfigManager,
    token: &str,
    public_key: Option<PathBuf>,
) -> Result<()> {
    let token = read_argument(token)?;
    let key_path = match public_key {
        Some(path) => Some(path),
        None => config_manager
            .load()
            .ok()
            .and_then(|config| config.provider_public_key_path),
    };
    let key = key_path
        .as_deref()
        .map(pem::load_public_key)
        .transpose()
        .into_diagnostic()
        .context("Failed to load provider public key")?;

    let verified = TokenVerifier::new()
        .verify(&token, key.as_deref())
        .into_diagnostic()?;

    println!("Outcome: {}", verified.outcome);
    if let Some(suite) = verified.suite {
        println!("Suite: {suite}");
    }
    println!("Header alg: {}", verified.header.alg().unwrap_or("(none)"));
    println!(
        "{}",
        serde_json::to_string_pretty(&verified.claims).into_diagnostic()?
    );

    if !verified.is_trusted() {
        return Err(miette::miette!("Token signature does not match the provider key"));
    }
    Ok(())
}

fn handle_inspect_command(secret: &str, verify: Option<SuiteArg>) -> Result<()> {
    let secret = read_argument(secret)?;
    let inspector = SignedMessageInspector::new();
    let summary = inspector.inspect(&secret).into_diagnostic()?;

    println!("Content type: {}", summary.content_type);
    println!("SignedData version: {}", summary.version);
    println!("Digest algorithms: {}", summary.digest_algorithms.join(", "));
    println!("Encapsulated content: {}", summary.encapsulated_content_type);
    println!(
        "Plaintext: {}",
        String::from_utf8_lossy(&summary.plaintext)
    );
    println!("Certificates: {}", summary.certificates.len());
    println!("Signers: {}", summary.signer_count);
    println!("Signer version: {}", summary.signer_version);
    println!("Digest algorithm: {}", summary.digest_algorithm);
    println!("Signature algorithm: {}", summary.signature_algorithm);
    println!("Signature length: {} bytes", summary.signature.len());
    println!(
        "Indefinite-length nodes: {:?}",
        summary.indefinite_length_paths
    );

    if let Some(suite) = verify {
        let suite = SignatureSuite::from(suite);
        let valid = inspector
            .verify_signed_message(&secret, suite)
            .into_diagnostic()?;
        if valid {
            println!("Signature: valid ({suite})");
        } else {
            return Err(miette::miette!("Signature does not verify under {suite}"));
        }
    }
    Ok(())
}

fn handle_config_command(config_manager: &ConfigManager, config_cmd: ConfigCommands) -> Result<()> {
    match config_cmd {
        ConfigCommands::Show => match config_manager.load() {
            Ok(config) => {
                println!("Current configuration:");
                println!("  Client id: {}", config.client_id);
                println!("  Suite: {}", config.suite);
                println!("  Scope: {}", config.scope);
                println!("  Certificate: {}", config.certificate_path.display());
                println!("  Private key: {}", config.private_key_path.display());
                match &config.provider_public_key_path {
                    Some(path) => println!("  Provider public key: {}", path.display()),
                    None => println!("  Provider public key: (not set, tokens are not verified)"),
                }
                println!("  Authorization URL: {}", config.authorization_url);
                println!("  Token URL: {}", config.token_url);
                println!("  Callback URL: {}", config.callback_url);
                println!("  Access type: {}", config.access_type);
                println!(
                    "  Configuration file: {}",
                    config_manager.config_path().display()
                );
            }
            Err(_) => {
                println!("No configuration file found. Use 'config init' to create one.");
            }
        },

        ConfigCommands::Init => {
            let _config = config_manager.load_or_create_default().into_diagnostic()?;
            println!(
                "Configuration initialized: {}",
                config_manager.config_path().display()
            );
            println!("   Edit the file to customize settings, or use 'config set' commands.");
        }

        ConfigCommands::Path => {
            println!("{}", config_manager.config_path().display());
        }

        ConfigCommands::Set { key, value } => {
            config_manager
                .update_value(&key, &value)
                .into_diagnostic()?;
            println!("Configuration updated: {key} = {value}");
        }

        ConfigCommands::Export { format, output } => {
            let content = config_manager
                .export_config(format.into())
                .into_diagnostic()?;

            if let Some(output_path) = output {
                std::fs::write(&output_path, content).into_diagnostic()?;
                println!("Configuration exported to: {}", output_path.display());
            } else {
                println!("{content}");
            }
        }

        ConfigCommands::Import { file, format } => {
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            config_manager
                .import_config(&content, format.into())
                .into_diagnostic()?;
            println!("Configuration imported from: {}", file.display());
        }
    }

    Ok(())
}
