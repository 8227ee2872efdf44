use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `chainpilot` - goal-driven agent that reasons with an LLM and acts on EVM chains.
#[derive(Parser, Debug)]
#[command(name = "chainpilot")]
#[command(version = "0.1.0")]
#[command(about = "Reason about a goal, optionally act on-chain, and keep an auditable task ledger.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.chainpilot/config.toml, created on first run)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Host to bind to (default: [gateway] host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: [gateway] port; 0 picks a free port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one orchestration cycle and print the resulting task as JSON
    Run {
        /// Natural-language goal
        #[arg(short, long)]
        goal: String,

        /// Chain action (balance, nonce, code, block_number, chain_id)
        #[arg(short, long)]
        action: Option<String>,

        /// Address the chain action targets
        #[arg(long)]
        address: Option<String>,
    },

    /// Print one task by id
    Task {
        id: i64,
    },

    /// List recent tasks, newest first
    History {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Talk to a configured chain network directly
    Chain {
        /// Network name (default: [chain] default_network)
        #[arg(short, long)]
        network: Option<String>,

        #[command(subcommand)]
        command: ChainCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChainCommands {
    /// List configured networks
    Networks,

    /// Print chain id and latest block number
    Snapshot,

    /// Print event logs matching a filter
    Logs {
        /// Emitting contract
        #[arg(long)]
        address: Option<String>,

        /// Topic filter, repeatable in position order
        #[arg(long = "topic")]
        topics: Vec<String>,

        #[arg(long)]
        from_block: Option<u64>,

        #[arg(long)]
        to_block: Option<u64>,
    },

    /// Broadcast a signed contract-creation transaction
    Deploy {
        /// Raw signed transaction (0x-prefixed hex)
        raw_tx: String,
    },

    /// Broadcast signed transactions in one batch
    Send {
        /// Raw signed transactions (0x-prefixed hex)
        #[arg(required = true)]
        raw_txs: Vec<String>,
    },
}
