// Smoke check against the live explorer: fetch an address and summarize
// its first page of transactions.
//
//     cargo run --bin check_address -- <bitcoin address> [page]

use wallet_tracker::{
    blockchain::{aggregator, BlockchairClient, ChainSource},
    cache,
    config::Config,
    pagination::paginate,
    validation::validate_bitcoin_address,
};
use std::collections::HashSet;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(address) = args.next() else {
        error!("usage: check_address <bitcoin address> [page]");
        std::process::exit(2);
    };
    let page_param = args.next();

    validate_bitcoin_address(&address)?;
    info!("✅ {} is well-formed", address);

    let config = Config::from_env();
    let client = BlockchairClient::new(&config, cache::init_cache(&config))?;

    let data = client.fetch_address(&address).await?;
    info!(
        "✅ Type: {}, balance: {} USD, {} transactions",
        data.kind.as_deref().unwrap_or("unknown"),
        data.balance_usd,
        data.transactions.len()
    );

    let page = paginate(data.transactions.len(), page_param.as_deref(), config.page_size);
    let page_ids = &data.transactions[page.range(data.transactions.len())];
    let tx_data = client.fetch_transactions(page_ids).await?;
    let summaries = aggregator::aggregate(page_ids, &tx_data, &HashSet::new())?;

    info!("Page {}/{}", page.page, page.page_count);
    for summary in summaries {
        info!(
            "   {} {} amount {} USD, fee {} USD, biggest recipient {} ({} USD)",
            summary.timestamp,
            summary.id,
            summary.amount_usd,
            summary.fee_usd,
            summary.biggest_recipient_address,
            summary.biggest_recipient_amount_usd
        );
    }

    Ok(())
}
