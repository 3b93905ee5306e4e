use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use didcore_crypto::{multibase_decode, multibase_encode, EccCurve, KeyPair, MultibaseType};
use didcore_identity::{DidManager, VcManager, VpManager};
use didcore_types::{
    CoreConfig, CoreError, DidDocument, Filter, UtcTimestamp, VerifiableCredential,
    VerifiablePresentation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Key pair file written by `keypair generate`.
#[derive(Serialize, Deserialize)]
struct KeypairFileFormat {
    curve: EccCurve,
    public_key: String,
    secret_key: String,
    generated_at: UtcTimestamp,
}

/// Load a JSON document from `path`; `what` names it in errors.
fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {} from '{}'", what, path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("'{}' does not hold a valid {}", path.display(), what))
}

/// Store `value` at `path` as pretty-printed JSON.
fn save_json<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("Cannot write {} to '{}'", what, path.display()))
}

/// Turns a core error into a CLI error that leads with the taxonomy code.
fn format_core_error(err: CoreError, base_context_msg: &str) -> anyhow::Error {
    let mut message = format!("{}: {}", base_context_msg, err);
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(&format!("\n  caused by: {}", cause));
        source = std::error::Error::source(cause);
    }
    anyhow!(message)
}

/// Command-line interface for the DID core
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Path to a TOML core configuration file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Keypair management commands
    #[clap(subcommand)]
    Keypair(KeypairCommands),

    /// DID document commands
    #[clap(subcommand)]
    Document(DocumentCommands),

    /// Verifiable credential commands
    #[clap(subcommand)]
    Credential(CredentialCommands),

    /// Verifiable presentation commands
    #[clap(subcommand)]
    Presentation(PresentationCommands),
}

#[derive(Clone, Copy, ValueEnum)]
enum CurveArg {
    /// secp256k1
    K1,
    /// secp256r1 (P-256)
    R1,
}

impl From<CurveArg> for EccCurve {
    fn from(curve: CurveArg) -> Self {
        match curve {
            CurveArg::K1 => EccCurve::Secp256k1,
            CurveArg::R1 => EccCurve::Secp256r1,
        }
    }
}

/// Keypair management commands
#[derive(Subcommand)]
enum KeypairCommands {
    /// Generate a new keypair
    Generate {
        /// Curve of the new key
        #[clap(long, value_enum, default_value = "k1")]
        curve: CurveArg,

        /// Output file for the keypair
        #[clap(long, short)]
        output: PathBuf,
    },

    /// Show information about a keypair
    Info {
        /// Path to the keypair file
        #[clap(long, short)]
        input: PathBuf,
    },
}

/// DID document commands
#[derive(Subcommand)]
enum DocumentCommands {
    /// Verify every proof of a DID document
    Verify {
        /// Path to the DID document
        document: PathBuf,
    },
}

/// Verifiable credential commands
#[derive(Subcommand)]
enum CredentialCommands {
    /// Verify the issuer signatures of a credential
    Verify {
        /// Path to the credential
        #[clap(long)]
        vc: PathBuf,

        /// Path to the issuer's DID document
        #[clap(long)]
        issuer: PathBuf,

        /// Skip the validUntil check
        #[clap(long)]
        no_expiry: bool,
    },
}

/// Verifiable presentation commands
#[derive(Subcommand)]
enum PresentationCommands {
    /// Verify a presentation and print its claims
    Verify {
        /// Path to the presentation
        #[clap(long)]
        vp: PathBuf,

        /// Path to the holder's DID document
        #[clap(long)]
        holder: PathBuf,

        /// Path to the issuer's DID document
        #[clap(long)]
        issuer: PathBuf,

        /// Path to a submission filter
        #[clap(long)]
        filter: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<CoreConfig> {
    match path {
        Some(path) => CoreConfig::from_file(path),
        None => Ok(CoreConfig::default()),
    }
}

fn init_tracing(config: &CoreConfig) {
    let log_level_str = config.log_level.as_deref().unwrap_or("warn");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level_str))
        .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()));

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Generate a new keypair
fn generate_keypair(curve: EccCurve, output: &Path) -> Result<()> {
    println!("Generating new {} keypair...", curve);
    let keypair = KeyPair::generate(curve);

    let file = KeypairFileFormat {
        curve,
        public_key: keypair.public_key_multibase(),
        secret_key: multibase_encode(&keypair.secret_bytes(), MultibaseType::Base58Btc),
        generated_at: UtcTimestamp::now(),
    };
    save_json(&file, output, "keypair")?;

    println!("Keypair saved to: {}", output.display());
    println!("Public Key: {}", file.public_key);
    Ok(())
}

/// Rebuild the key pair stored in a keypair file.
fn read_keypair(input: &Path) -> Result<(KeypairFileFormat, KeyPair)> {
    let file: KeypairFileFormat = load_json(input, "keypair")?;
    let secret = multibase_decode(&file.secret_key)
        .with_context(|| format!("Invalid secret key encoding in '{}'", input.display()))?;
    let keypair = KeyPair::from_secret_bytes(file.curve, &secret)
        .with_context(|| format!("Invalid {} secret key in '{}'", file.curve, input.display()))?;
    Ok((file, keypair))
}

/// Show information about a keypair
fn keypair_info(input: &Path) -> Result<()> {
    println!("Reading keypair from: {}", input.display());
    let (file, keypair) = read_keypair(input)?;

    println!("Curve: {}", file.curve);
    if keypair.public_key_multibase() == file.public_key {
        println!("Public Key: {}", file.public_key);
    } else {
        println!(
            "Public Key: {} ({})",
            file.public_key.red(),
            "does not match the secret key".yellow()
        );
    }
    println!("Generated: {}", file.generated_at);
    Ok(())
}

/// Verify every proof of a DID document
fn verify_document(path: &Path, config: CoreConfig) -> Result<()> {
    println!("Verifying DID document: {}", path.display());
    let mut manager = DidManager::with_config(config);
    let document = manager
        .load(path)
        .map_err(|e| format_core_error(e, "Failed to load DID document"))?;
    let did = document.id.clone();
    let proofs = document.all_proofs().len();

    manager
        .verify_document_signature()
        .map_err(|e| format_core_error(e, "DID document verification failed"))?;
    println!("{} {} ({} proof(s))", "Verified".green().bold(), did, proofs);
    Ok(())
}

/// Verify the issuer signatures of a credential
fn verify_credential(vc_path: &Path, issuer_path: &Path, no_expiry: bool, config: CoreConfig) -> Result<()> {
    println!("Verifying credential: {}", vc_path.display());
    let check_expiration = config.check_vc_expiration && !no_expiry;
    let vc: VerifiableCredential = load_json(vc_path, "credential")?;
    let issuer: DidDocument = load_json(issuer_path, "issuer DID document")?;

    VcManager::with_config(config)
        .verify_credential(&vc, &issuer, check_expiration)
        .map_err(|e| format_core_error(e, "Credential verification failed"))?;
    println!(
        "{} {} issued by {} ({} claim(s))",
        "Verified".green().bold(),
        vc.id,
        vc.issuer.id,
        vc.claims().len()
    );
    Ok(())
}

/// Verify a presentation and print its claims
fn verify_presentation(
    vp_path: &Path,
    holder_path: &Path,
    issuer_path: &Path,
    filter_path: Option<&Path>,
    config: CoreConfig,
) -> Result<()> {
    println!("Verifying presentation: {}", vp_path.display());
    let vp: VerifiablePresentation = load_json(vp_path, "presentation")?;
    let holder: DidDocument = load_json(holder_path, "holder DID document")?;
    let issuer: DidDocument = load_json(issuer_path, "issuer DID document")?;

    let mut manager = VpManager::with_config(config);
    let mut params = manager.verify_params(holder, issuer);
    if let Some(path) = filter_path {
        let filter: Filter = load_json(path, "submission filter")?;
        params = params.with_filter(filter);
    }

    let outcome = manager.verify_presentation(&vp, &params);
    info!(state = %manager.state(), "Presentation verification finished");
    outcome.map_err(|e| format_core_error(e, "Presentation verification failed"))?;

    println!("{} {} held by {}", "Verified".green().bold(), vp.id, vp.holder);
    for claim in manager.get_claim_list() {
        let value = if claim.hide_value {
            "(hidden)".dimmed().to_string()
        } else {
            claim.value.unwrap_or_default()
        };
        println!("  {} [{}]: {}", claim.code.blue(), claim.caption, value);
    }
    Ok(())
}

/// Entrypoint
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    match &cli.command {
        Commands::Keypair(cmd) => match cmd {
            KeypairCommands::Generate { curve, output } => {
                generate_keypair((*curve).into(), output)?;
            }
            KeypairCommands::Info { input } => {
                keypair_info(input)?;
            }
        },
        Commands::Document(cmd) => match cmd {
            DocumentCommands::Verify { document } => {
                verify_document(document, config)?;
            }
        },
        Commands::Credential(cmd) => match cmd {
            CredentialCommands::Verify { vc, issuer, no_expiry } => {
                verify_credential(vc, issuer, *no_expiry, config)?;
            }
        },
        Commands::Presentation(cmd) => match cmd {
            PresentationCommands::Verify {
                vp,
                holder,
                issuer,
                filter,
            } => {
                verify_presentation(vp, holder, issuer, filter.as_deref(), config)?;
            }
        },
    }

    Ok(())
}
