//! nsgflow: CLI tool for converting flow-log blobs into IPFIX relay payloads.

use clap::{Parser, Subcommand};
use nsgflow::config::{self, Settings, TENANT_ID_VAR};
use nsgflow::{read_flow_log, ExportOptions, FlowLogConverter};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nsgflow")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Convert network security group flow logs to IPFIX relay payloads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a flow-log blob to relay payloads, one JSON object per line
    Convert {
        /// Input flow-log file (plain or gzip compressed JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Tenant id, overrides the armorAccountId environment variable
        #[arg(short, long)]
        tenant_id: Option<u32>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the base64 IPFIX packet of every document in a flow-log blob
    Encode {
        /// Input flow-log file (plain or gzip compressed JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Template id of the exported records
        #[arg(long, default_value_t = config::DEFAULT_TEMPLATE_ID)]
        template_id: u16,

        /// Observation domain id written into message headers
        #[arg(long, default_value_t = config::DEFAULT_OBSERVATION_DOMAIN_ID)]
        observation_domain_id: u32,
    },
}

fn main() {
    let debug_log = config::debug_log_from_lookup(|key| std::env::var(key).ok());
    let default_filter = if debug_log { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            tenant_id,
            verbose,
        } => {
            if let Err(e) = convert_file(&input, output.as_ref(), tenant_id, verbose) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Encode {
            input,
            template_id,
            observation_domain_id,
        } => {
            let options = ExportOptions {
                template_id,
                observation_domain_id,
            };
            if let Err(e) = encode_file(&input, &options) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn convert_file(
    input: &PathBuf,
    output: Option<&PathBuf>,
    tenant_id: Option<u32>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_lookup(|key| match (key, tenant_id) {
        (TENANT_ID_VAR, Some(id)) => Some(id.to_string()),
        _ => std::env::var(key).ok(),
    })?;
    log::debug!(
        "Relay destination: {} as user {}",
        settings.relay_endpoint(),
        settings.relay_user()
    );

    if verbose {
        eprintln!("Reading input file: {:?}", input);
    }

    let content = read_flow_log(input)?;
    let mut converter = FlowLogConverter::new(&settings.export)?;
    let payloads = converter.relay_payloads(&content, settings.tenant_id)?;

    let mut lines = Vec::new();
    for payload in &payloads {
        writeln!(lines, "{}", payload.to_json()?)?;
    }

    match output {
        Some(path) => {
            fs::write(path, &lines)?;
            if verbose {
                eprintln!("Wrote {} payloads to {:?}", payloads.len(), path);
            }
        }
        None => io::stdout().write_all(&lines)?,
    }

    if verbose {
        eprintln!(
            "Converted {} documents, {} flow records exported",
            payloads.len(),
            converter.sequence_number()
        );
    }
    Ok(())
}

fn encode_file(input: &PathBuf, options: &ExportOptions) -> Result<(), Box<dyn std::error::Error>> {
    let content = read_flow_log(input)?;
    let mut converter = FlowLogConverter::new(options)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for document in converter.convert(&content)? {
        writeln!(out, "{}", document.encoded.text())?;
    }
    Ok(())
}
