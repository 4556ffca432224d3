//! Chipmunk CLI Client
//!
//! Command-line interface for interacting with a Chipmunk store.

use clap::{Parser, Subcommand};
use chipmunk::{Client, Config, EndOfResponse, Metadata, MetadataEntry, SearchTerm};
use tracing_subscriber::{fmt, EnvFilter};

/// Chipmunk CLI
#[derive(Parser, Debug)]
#[command(name = "chipmunk-cli")]
#[command(about = "CLI for the Chipmunk key-value store")]
#[command(version)]
struct Args {
    /// Store host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Store port
    #[arg(short, long, default_value = "8909")]
    port: u16,

    /// Maximum size of each socket write in bytes
    #[arg(long, default_value = "1024")]
    chunk_size: usize,

    /// Connect/read timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Treat a pause in the reply as its end instead of waiting for close
    #[arg(long)]
    idle_end: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the payload stored under an identifier
    Get {
        /// The identifier to fetch
        id: String,
    },

    /// Remove an entry and print its record
    Remove {
        /// The identifier to remove
        id: String,
    },

    /// List identifiers matching any term (`key=value` or `key!value`)
    FindOr {
        /// Search terms
        #[arg(required = true)]
        terms: Vec<String>,

        /// Only search these identifiers
        #[arg(short, long, num_args = 1..)]
        within: Option<Vec<String>>,
    },

    /// List identifiers matching every term (`key=value` or `key!value`)
    FindAnd {
        /// Search terms
        #[arg(required = true)]
        terms: Vec<String>,

        /// Only search these identifiers
        #[arg(short, long, num_args = 1..)]
        within: Option<Vec<String>>,
    },

    /// Store a value with metadata
    Set {
        /// The identifier to store under
        id: String,

        /// The value, stored as raw bytes
        value: String,

        /// Metadata attribute `key=value` (repeatable)
        #[arg(short, long = "meta")]
        meta: Vec<String>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,chipmunk=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> chipmunk::Result<()> {
    let end_of_response = if args.idle_end {
        EndOfResponse::Idle
    } else {
        EndOfResponse::PeerClose
    };

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .chunk_size(args.chunk_size)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .end_of_response(end_of_response)
        .build()?;

    tracing::debug!("Chipmunk CLI v{} -> {}", chipmunk::VERSION, config.addr());
    let client = Client::with_config(config);

    match args.command {
        Commands::Get { id } => match client.get_raw(&id)? {
            Some(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
            None => println!("(no data)"),
        },
        Commands::Remove { id } => match client.remove(&id)? {
            Some(record) => println!("{}", serde_json::Value::Object(record)),
            None => println!("(no data)"),
        },
        Commands::FindOr { terms, within } => {
            let query = parse_terms(&terms)?;
            print_ids(client.find_or_subset(&query, within)?);
        }
        Commands::FindAnd { terms, within } => {
            let query = parse_terms(&terms)?;
            print_ids(client.find_and_subset(&query, within)?);
        }
        Commands::Set { id, value, meta } => {
            let metadata = parse_literals(&meta)?;
            if client.set_raw(&id, &metadata, value.as_bytes())? {
                println!("saved");
            } else {
                println!("not saved");
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

/// `key=value` → equals, `key!value` → not equals
fn parse_terms(terms: &[String]) -> chipmunk::Result<Metadata> {
    terms
        .iter()
        .map(|raw| {
            let term = match raw.find(&['=', '!'][..]) {
                Some(i) if raw.as_bytes()[i] == b'=' => {
                    SearchTerm::equals(&raw[..i], &raw[i + 1..])?
                }
                Some(i) => SearchTerm::not_equals(&raw[..i], &raw[i + 1..])?,
                None => return Err(bad_argument("search term", raw)),
            };
            Ok(MetadataEntry::Term(term))
        })
        .collect()
}

fn parse_literals(pairs: &[String]) -> chipmunk::Result<Metadata> {
    pairs
        .iter()
        .map(|raw| match raw.split_once('=') {
            Some((key, value)) => MetadataEntry::literal(key, value),
            None => Err(bad_argument("metadata attribute", raw)),
        })
        .collect()
}

fn bad_argument(what: &str, raw: &str) -> chipmunk::ChipmunkError {
    chipmunk::ChipmunkError::Validation(format!(
        "{} {:?} must look like key=value",
        what, raw
    ))
}

fn print_ids(ids: Option<Vec<String>>) {
    match ids {
        Some(ids) => {
            for id in ids {
                println!("{}", id);
            }
        }
        None => println!("(no data)"),
    }
}
