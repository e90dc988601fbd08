use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use subgraph_rpc_tools::config::ProbeConfig;
use subgraph_rpc_tools::maintenance::{lowercase, whitelist};
use subgraph_rpc_tools::prober::{ArchiveProber, ProbeRequest};
use subgraph_rpc_tools::subgraph::{SubgraphClient, META_QUERY};

#[derive(Parser)]
#[command(name = "subgraph-rpc-tools")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that an RPC endpoint serves contract state at a historical block
    Probe {
        /// RPC endpoint URL
        #[arg(long, env = "PROBE_RPC_URL")]
        rpc: String,

        /// Block height to query
        #[arg(long)]
        block: u64,

        /// Contract address to call
        #[arg(long, env = "PROBE_CONTRACT_ADDRESS")]
        address: String,

        /// Maximum attempts [env: PROBE_MAX_RETRIES, default 3]
        #[arg(long)]
        retries: Option<u32>,

        /// Seconds to wait between attempts [env: PROBE_RETRY_DELAY_SECS, default 2]
        #[arg(long)]
        delay_secs: Option<u64>,

        /// Per-attempt HTTP timeout in seconds [env: PROBE_TIMEOUT_SECS, default 30]
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Lowercase contract addresses in every file of a directory
    Lowercase {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Add tokens from a token-list JSON to the WHITELIST in pricing.ts
    Whitelist {
        /// Directory holding the token list and pricing.ts
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Token list; defaults to the first .json file in --dir
        #[arg(long)]
        tokens: Option<PathBuf>,

        /// Pricing source; defaults to pricing.ts in --dir
        #[arg(long)]
        pricing: Option<PathBuf>,
    },

    /// Run a GraphQL query against a subgraph endpoint
    Query {
        /// Subgraph query URL
        #[arg(long, env = "SUBGRAPH_URL")]
        url: String,

        /// Query text; defaults to the `_meta` block query
        #[arg(long, conflicts_with = "query_file")]
        query: Option<String>,

        /// Read the query from a file
        #[arg(long)]
        query_file: Option<PathBuf>,

        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Probe {
            rpc,
            block,
            address,
            retries,
            delay_secs,
            timeout_secs,
        } => {
            let mut config = ProbeConfig::from_env();
            if let Some(retries) = retries {
                config.max_retries = retries;
            }
            if let Some(secs) = delay_secs {
                config.retry_delay = Duration::from_secs(secs);
            }
            if let Some(secs) = timeout_secs {
                config.timeout = Duration::from_secs(secs);
            }
            config.validate()?;

            let request = ProbeRequest::new(&rpc, block, &address)
                .with_retries(config.max_retries)
                .with_delay(config.retry_delay);
            let outcome = ArchiveProber::new(&config)?.probe(&request).await?;

            if outcome.success {
                println!(
                    "OK: {} serves block {} ({} attempt(s)), result {}",
                    rpc,
                    block,
                    outcome.attempts,
                    outcome.result_data.as_deref().unwrap_or("<none>")
                );
            } else {
                let reason = outcome
                    .failure
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "unknown error".to_string());
                println!(
                    "FAIL: {} cannot serve block {} after {} attempt(s), last {}",
                    rpc, block, outcome.attempts, reason
                );
            }
            Ok(outcome.success)
        }

        Commands::Lowercase { dir } => {
            let changed = lowercase::lowercase_dir(&dir)
                .with_context(|| format!("failed to process {}", dir.display()))?;
            println!("{} file(s) updated", changed.len());
            Ok(true)
        }

        Commands::Whitelist { dir, tokens, pricing } => {
            let tokens = match tokens {
                Some(path) => path,
                None => match whitelist::find_token_list(&dir)? {
                    Some(path) => path,
                    None => bail!("No .json file found in {}", dir.display()),
                },
            };
            let pricing = pricing.unwrap_or_else(|| dir.join("pricing.ts"));

            let inserted = whitelist::update_pricing_file(&tokens, &pricing)
                .with_context(|| format!("failed to update {}", pricing.display()))?;
            println!("Inserted {} whitelist entries into {}", inserted, pricing.display());
            Ok(true)
        }

        Commands::Query {
            url,
            query,
            query_file,
            timeout_secs,
        } => {
            let query = match (query, query_file) {
                (Some(q), _) => q,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => META_QUERY.to_string(),
            };

            let client = SubgraphClient::new(Duration::from_secs(timeout_secs))?;
            let result = client.query(&url, &query).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(true)
        }
    }
}
