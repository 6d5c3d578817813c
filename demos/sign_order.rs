//! Sign a limit order and print the `/exchange` request body.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example sign_order -- --private-key YOUR_PRIVATE_KEY --coin ETH --asset 4
//! ```
//!
//! The asset index normally comes from the exchange metadata; here it is passed
//! on the command line. Nothing is sent.

use std::{collections::HashMap, str::FromStr};

use clap::Parser;
use hypersign::{
    Address, Decimal,
    hypercore::{
        self, ActionBuilder, Chain, SignerAdapter, sign_action,
        types::{BuilderInfo, Order, OrderGrouping, OrderType, TimeInForce},
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    private_key: String,
    /// Coin symbol.
    #[arg(long, default_value = "ETH")]
    coin: String,
    /// Asset index of the coin.
    #[arg(long)]
    asset: u32,
    /// Limit price.
    #[arg(long)]
    price: Decimal,
    /// Order size.
    #[arg(long)]
    size: Decimal,
    #[arg(long)]
    sell: bool,
    /// Trade on behalf of this vault.
    #[arg(long)]
    vault: Option<Address>,
    /// Builder address, charged `--builder-fee` tenths of a basis point.
    #[arg(long)]
    builder: Option<Address>,
    #[arg(long, default_value_t = 0)]
    builder_fee: u64,
    #[arg(long, default_value_t = Chain::Testnet)]
    chain: Chain,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = simple_logger::init_with_level(log::Level::Debug);

    let args = Cli::parse();
    let signer = hypercore::PrivateKeySigner::from_str(&args.private_key)?;

    let assets = HashMap::from([(args.coin.clone(), args.asset)]);
    let builder = ActionBuilder::new(&assets);

    let order = Order {
        coin: args.coin,
        is_buy: !args.sell,
        sz: args.size,
        limit_px: args.price,
        order_type: OrderType::limit(TimeInForce::Gtc),
        reduce_only: false,
        cloid: None,
    };
    let builder_info = args.builder.map(|address| BuilderInfo {
        address,
        fee: args.builder_fee,
    });

    let action = builder
        .order_action(&[order], OrderGrouping::Na, builder_info)
        .await?;

    let nonce = hypercore::timestamp_nonce();
    let request = sign_action(
        SignerAdapter::ClientStyle(&signer),
        action,
        nonce,
        args.vault,
        args.chain,
    )?;

    println!("signed by {}", signer.address());
    println!("{}", serde_json::to_string_pretty(&request)?);

    Ok(())
}
