use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hashchain_core::{validate, Chain, ChainBuilder, Payload, ProofParams, ProofVariant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "hashchain-cli")]
#[command(about = "Build and validate local proof-of-work hash chains")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a chain from the given payloads and print it as JSON
    Build {
        /// Block payload, parsed as JSON; a bare word becomes a JSON string. Repeatable.
        #[arg(long = "payload", required = true)]
        payloads: Vec<String>,
        /// Proof-of-work variant: divisibility or hash-prefix
        #[arg(long, default_value = "divisibility")]
        variant: ProofVariant,
        /// Divisor for the divisibility search
        #[arg(long, default_value_t = 99)]
        modulus: u64,
        /// Leading zero hex characters for the hash-prefix search
        #[arg(long, default_value_t = 1)]
        difficulty: usize,
        /// Abort a search after this many candidates
        #[arg(long)]
        max_iterations: Option<u64>,
        /// Write the chain here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a chain JSON read from a file or stdin
    Validate {
        /// Chain JSON file; stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// JSON payloads pass through as-is; anything that does not parse is
/// treated as a plain string, so `--payload alice` works.
fn parse_payload(raw: &str) -> Payload {
    serde_json::from_str(raw).unwrap_or_else(|_| Payload::String(raw.to_string()))
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Build {
            payloads,
            variant,
            modulus,
            difficulty,
            max_iterations,
            out,
            pretty,
        } => {
            let payloads: Vec<Payload> = payloads.iter().map(|p| parse_payload(p)).collect();
            let params = ProofParams {
                modulus,
                difficulty,
                max_iterations,
            };
            let chain = ChainBuilder::new().build_chain(payloads, variant, &params)?;
            info!("built chain of {} blocks with {variant} proofs", chain.len());

            let report = validate(&chain)?;
            if !report.is_valid() {
                bail!("freshly built chain failed validation: {:?}", report.faults());
            }

            let json = if pretty {
                serde_json::to_string_pretty(&chain)?
            } else {
                serde_json::to_string(&chain)?
            };
            match out {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Validate { file } => {
            let raw = match file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let chain: Chain = serde_json::from_str(&raw).context("parsing chain JSON")?;
            let report = validate(&chain)?;
            if report.is_valid() {
                println!("chain of {} blocks is valid", chain.len());
            } else {
                for fault in report.faults() {
                    eprintln!("fault: {fault}");
                }
                bail!("chain is invalid ({} faults)", report.faults().len());
            }
        }
    }
    Ok(())
}
