//! Sign an agent approval and print the `/exchange` request body.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example approve_agent -- --private-key YOUR_PRIVATE_KEY --name bot
//! ```

use std::str::FromStr;

use clap::Parser;
use hypersign::{
    Address,
    hypercore::{self, Chain, SignerAdapter, sign_action, types::ApproveAgent},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Private key of the account approving the agent.
    #[arg(short, long)]
    private_key: String,
    /// Agent address to approve. A random one is generated when omitted.
    #[arg(short, long)]
    agent: Option<Address>,
    /// Agent name (optional, leave empty for unnamed agent).
    #[arg(short, long, default_value = "")]
    name: String,
    #[arg(long, default_value_t = Chain::Testnet)]
    chain: Chain,
}

fn main() -> anyhow::Result<()> {
    let _ = simple_logger::init_with_level(log::Level::Debug);

    let args = Cli::parse();

    let signer = hypercore::PrivateKeySigner::from_str(&args.private_key)?;
    let agent = match args.agent {
        Some(agent) => agent,
        None => hypercore::PrivateKeySigner::random().address(),
    };

    println!("Approving agent {} for account {}", agent, signer.address());
    if args.name.is_empty() {
        println!("Agent will be unnamed");
    } else {
        println!("Agent name: {}", args.name);
    }

    let nonce = hypercore::timestamp_nonce();
    let action = ApproveAgent {
        agent_address: agent,
        agent_name: (!args.name.is_empty()).then_some(args.name),
        nonce,
    }
    .into_action(args.chain)?;

    let request = sign_action(
        SignerAdapter::Direct(&signer),
        action,
        nonce,
        None,
        args.chain,
    )?;
    println!("{}", serde_json::to_string_pretty(&request)?);

    Ok(())
}
