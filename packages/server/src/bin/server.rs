//! Signaling broker server for robots and viewers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kakehashi-server
//! cargo run --bin kakehashi-server -- --host 0.0.0.0 --port 8989 --max-viewers 1
//! ```

use clap::{Parser, ValueEnum};
use kakehashi_server::{
    app::{BrokerConfig, build_app_state},
    domain::{SessionPolicy, TokenPolicy},
    ui::Server,
};
use kakehashi_shared::logger::setup_logger;

/// Access token lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TokenPolicyArg {
    /// Valid for as long as the issuing robot stays connected
    MultiUse,
    /// Consumed by the first successful join
    SingleUse,
}

impl From<TokenPolicyArg> for TokenPolicy {
    fn from(arg: TokenPolicyArg) -> Self {
        match arg {
            TokenPolicyArg::MultiUse => TokenPolicy::MultiUse,
            TokenPolicyArg::SingleUse => TokenPolicy::SingleUse,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "kakehashi-server")]
#[command(about = "Signaling broker pairing robots with viewers over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8989")]
    port: u16,

    /// Length of generated access tokens
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u16).range(1..))]
    token_length: u16,

    /// Access token lifetime
    #[arg(long, value_enum, default_value_t = TokenPolicyArg::MultiUse)]
    token_policy: TokenPolicyArg,

    /// Maximum number of viewers per robot (unlimited when omitted)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    max_viewers: Option<u16>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(
        &[env!("CARGO_BIN_NAME"), "kakehashi-shared", "tower_http"],
        &args.log_level,
    );

    let config = BrokerConfig {
        policy: SessionPolicy {
            token_policy: args.token_policy.into(),
            max_viewers_per_robot: args.max_viewers.map(usize::from),
        },
        token_length: usize::from(args.token_length),
    };
    tracing::info!(
        "Token policy: {:?}, max viewers per robot: {}, token length: {}",
        config.policy.token_policy,
        config
            .policy
            .max_viewers_per_robot
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string()),
        config.token_length
    );

    let server = Server::new(build_app_state(config));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
