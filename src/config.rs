//! CLI configuration.

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "dominoes-engine")]
pub struct Config {
    /// Port the HTTP/REST API listens on.
    #[arg(long, default_value_t = 8080)]
    pub http_port: u16,

    /// Port the WebSocket endpoint listens on.
    #[arg(long, default_value_t = 8081)]
    pub ws_port: u16,

    /// Host/interface to bind both listeners to.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Default per-game picking-phase timeout, in seconds.
    #[arg(long, default_value_t = 45)]
    pub picking_timeout: u64,

    /// Default per-turn timeout, in seconds.
    #[arg(long, default_value_t = 30)]
    pub turn_timeout: u64,

    /// How often the cleanup sweep runs, in seconds.
    #[arg(long, default_value_t = 60)]
    pub cleanup_interval: u64,

    /// Log to this directory instead of stdout.
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Seed the RNG for reproducible runs (tests and demos); omit for entropy.
    #[arg(long)]
    pub rng_seed: Option<u64>,
}
