use anyhow::{bail, Context};
use chainlot_core::accounts::DEV_ACCOUNT_COUNT;
use chainlot_core::{AccountKeeper, ContractResolver, Ledger};
use chainlot_engine::deploy_lottery;
use comfy_table::{presets::UTF8_FULL, Table};
use std::sync::Arc;

pub async fn show_accounts(keeper: &AccountKeeper, ledger: &Ledger) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Index", "Address", "Balance (units)"]);

    for (index, address) in keeper.dev_accounts().iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            address.to_string(),
            format!("{:.4}", ledger.balance_of(address).to_ether()),
        ]);
    }

    println!("{}", table);
    Ok(())
}

pub async fn deploy_mocks(
    resolver: &ContractResolver,
    decimals: Option<u8>,
    initial_answer: Option<u128>,
) -> anyhow::Result<()> {
    let config = resolver.config();
    let decimals = decimals.unwrap_or(config.feed_decimals);
    let initial_answer = initial_answer.unwrap_or(config.initial_answer);

    resolver.deploy_mocks(decimals, initial_answer).await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Contract", "Address"]);
    table.add_row(vec![
        "usd_price_feed".to_string(),
        resolver.mock_price_feed()?.address().to_string(),
    ]);
    table.add_row(vec![
        "fee_token".to_string(),
        resolver.mock_fee_token()?.address().to_string(),
    ]);
    table.add_row(vec![
        "vrf_coordinator".to_string(),
        resolver.mock_vrf_coordinator()?.address().to_string(),
    ]);

    println!("Mocks deployed on '{}'", config.environment);
    println!("{}", table);
    Ok(())
}

pub async fn show_fee(resolver: &ContractResolver) -> anyhow::Result<()> {
    let config = resolver.config();
    let feed = resolver.price_feed().await?;
    let round = feed.latest_round().await?;
    let fee = chainlot_engine::fee::entrance_fee(config.usd_entry_fee, &round)?;

    println!("Network:       {}", config.environment);
    println!("USD target:    {} USD", config.usd_entry_fee);
    println!(
        "Feed rate:     {} (decimals {})",
        round.answer, round.decimals
    );
    println!("Entrance fee:  {:.6} units ({})", fee.to_ether(), fee);
    Ok(())
}

pub async fn run_round(
    resolver: &ContractResolver,
    keeper: &AccountKeeper,
    ledger: Arc<Ledger>,
    players: usize,
    randomness: Option<u128>,
) -> anyhow::Result<()> {
    let config = resolver.config();
    if !config.environment.allows_mocks() {
        bail!(
            "the demo round runs against local networks only, got '{}'",
            config.environment
        );
    }
    if players == 0 || players > DEV_ACCOUNT_COUNT {
        bail!("players must be between 1 and {}", DEV_ACCOUNT_COUNT);
    }

    tracing::debug!("Starting demo round with {} players", players);
    let mut engine = deploy_lottery(resolver, ledger.clone()).await?;
    println!("Lottery deployed at {}", engine.address());

    engine.start_lottery()?;
    let fee = engine.entrance_fee().await?;
    println!("Entrance fee: {:.6} units", fee.to_ether());

    for index in 0..players {
        let account = keeper.dev_account(index)?;
        engine.enter(account, fee).await?;
        println!("  entered: {}", account);
    }

    let operator = keeper.default_account()?;
    let funded = resolver
        .fund_with_token(engine.address(), config.vrf_fee, operator)
        .await?;
    if !funded {
        bail!("funding the lottery with fee tokens was declined");
    }

    let request_id = engine.end_lottery().await?;
    println!("Randomness requested: {}", request_id);

    let value = randomness.unwrap_or_else(rand::random::<u128>);
    let coordinator = resolver.mock_vrf_coordinator()?;
    coordinator
        .fulfill(request_id, value, &mut engine)
        .await
        .context("randomness delivery failed")?;

    let info = engine.get_info();
    let winner = info
        .recent_winner
        .context("round finished without a winner")?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Winner", "Payout (units)", "Randomness"]);
    table.add_row(vec![
        winner.to_string(),
        format!("{:.6}", (fee.to_ether() * players as f64)),
        value.to_string(),
    ]);
    println!("{}", table);
    println!(
        "Winner balance: {:.4} units",
        ledger.balance_of(&winner).to_ether()
    );

    Ok(())
}

pub async fn list_deployments(resolver: &ContractResolver, json: bool) -> anyhow::Result<()> {
    let records = resolver.deployments().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!(
            "No deployments recorded for network '{}'",
            resolver.config().environment
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Contract", "Address", "Deployed at"]);
    for record in records {
        table.add_row(vec![
            record.contract,
            record.address.to_string(),
            record.deployed_at.to_rfc3339(),
        ]);
    }

    println!("{}", table);
    Ok(())
}
