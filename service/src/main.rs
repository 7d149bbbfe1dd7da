use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chroma_service::config::{
    ServerConfig, DEFAULT_MAX_COLORS, DEFAULT_MAX_NODES, DEFAULT_MAX_STATE_ENTRIES,
    DEFAULT_MAX_TRACE_EVENTS,
};
use chroma_service::contract::SolveRequestV1;
use chroma_service::fixtures;
use chroma_service::runner::{run_solve, run_solve_with_tape, verify_tape};
use chroma_service::server::start_server;

#[derive(Parser)]
#[command(name = "chroma", version)]
#[command(about = "Backtracking graph coloring with an auditable search trace", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP solve service
    Serve(ServeArgs),
    /// Solve one problem and print the response JSON
    Solve(SolveArgs),
    /// Verify a trace tape and print a summary
    VerifyTape {
        /// Tape file written by `solve --tape`
        path: PathBuf,
    },
}

#[derive(Args)]
struct LimitArgs {
    #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
    max_nodes: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_COLORS)]
    max_colors: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_TRACE_EVENTS)]
    max_trace_events: usize,

    /// Cap on summed `current_state` entries when state is included
    #[arg(long, default_value_t = DEFAULT_MAX_STATE_ENTRIES)]
    max_state_entries: usize,

    /// Accept neighbor ids that are not node keys
    #[arg(long)]
    allow_dangling_neighbors: bool,
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Comma-separated allowed CORS origins; "*" allows any, "" disables CORS
    #[arg(long, default_value = "http://localhost:3000")]
    cors_origins: String,

    /// Per-request solve timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(flatten)]
    limits: LimitArgs,
}

#[derive(Args)]
struct SolveArgs {
    /// Request JSON file; reads stdin when omitted
    input: Option<PathBuf>,

    /// Solve a named example instead of a request file
    #[arg(long, conflicts_with = "input")]
    example: Option<String>,

    /// Palette size for --example
    #[arg(long, default_value_t = 3)]
    colors: usize,

    /// Attach the assignment after each step
    #[arg(long)]
    include_state: bool,

    /// Also write a binary trace tape to this path
    #[arg(long)]
    tape: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,

    #[command(flatten)]
    limits: LimitArgs,
}

impl LimitArgs {
    fn apply(&self, config: ServerConfig) -> ServerConfig {
        ServerConfig {
            max_nodes: self.max_nodes,
            max_colors: self.max_colors,
            max_trace_events: self.max_trace_events,
            max_state_entries: self.max_state_entries,
            allow_dangling_neighbors: self.allow_dangling_neighbors,
            ..config
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("chroma=info,chroma_service=info,tower_http=info")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let allowed_origins = args
                .cors_origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            let config = args.limits.apply(ServerConfig {
                allowed_origins,
                solve_timeout: Duration::from_secs(args.timeout_secs),
                ..ServerConfig::default()
            });
            start_server(args.port, config).await?;
        }
        Commands::Solve(args) => solve(&args)?,
        Commands::VerifyTape { path } => {
            let bytes =
                std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let report = verify_tape(&bytes)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn solve(args: &SolveArgs) -> Result<()> {
    let config = args.limits.apply(ServerConfig::default());
    let request = load_request(args, config.max_nodes)?;

    let response = match &args.tape {
        Some(path) => {
            let (response, tape) = run_solve_with_tape(&request, &config)?;
            std::fs::write(path, &tape.bytes)
                .with_context(|| format!("writing tape to {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                records = tape.record_count,
                chain = %tape.chain_hash_hex(),
                "tape written"
            );
            response
        }
        None => run_solve(&request, &config)?,
    };

    let out = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{out}");
    Ok(())
}

fn load_request(args: &SolveArgs, max_nodes: usize) -> Result<SolveRequestV1> {
    if let Some(name) = &args.example {
        let adjacency = fixtures::by_name(name, max_nodes)?;
        return Ok(SolveRequestV1 {
            adjacency,
            colors: fixtures::default_palette(args.colors),
            include_state: args.include_state,
        });
    }

    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("reading stdin")?,
    };
    let mut request: SolveRequestV1 =
        serde_json::from_str(&text).context("parsing solve request")?;
    request.include_state |= args.include_state;
    Ok(request)
}
