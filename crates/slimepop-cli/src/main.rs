// slimepop: economy inspection and maintenance tool
//
// Usage:
//   slimepop status                       # Coins, ownership, quests, streak
//   slimepop catalog                      # Every product with its price route
//   slimepop shop --tab skins             # Ranked shop page for the assigned variant
//   slimepop buy skin_004                 # Spend coins
//   slimepop equip skin_004               # Equip an owned skin or sound
//   slimepop pop --count 50               # Simulate pops
//   slimepop claim-quests                 # Collect finished quests
//   slimepop claim-daily                  # Collect the daily reward
//   slimepop reconcile --records p.json   # Apply platform purchase records
//   slimepop telemetry                    # Dump revenue counters
//   slimepop export                       # JSON cloud snapshot + status

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use slimepop_core::billing::PurchaseRecord;
use slimepop_core::catalog::ProductCategory;
use slimepop_core::progression::DailyClaim;
use slimepop_core::shop::{ShopTab, Variant};
use slimepop_core::{EconomyConfig, EconomySession, RedbStore, SystemClock};

#[derive(Parser)]
#[command(name = "slimepop", version, about = "Slime Pop economy inspection tool")]
struct Cli {
    /// Path to the database file (default: ~/.slimepop/economy.redb)
    #[arg(long, global = true)]
    db_path: Option<String>,

    /// Path to a JSON economy config
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show wallet, ownership and progression
    Status,
    /// List every product and how it is paid for
    Catalog,
    /// Show a ranked shop tab
    Shop {
        /// skins, sounds or special
        #[arg(long, default_value = "skins")]
        tab: String,
        /// Case-insensitive title filter
        #[arg(long, default_value = "")]
        search: String,
        /// Force an experiment arm (PREMIUM_FIRST, VALUE_STACK, CONTROL)
        #[arg(long)]
        variant: Option<String>,
        /// Drop the stored arm before ranking
        #[arg(long)]
        reset_variant: bool,
    },
    /// Buy a coin-priced item
    Buy { product_id: String },
    /// Equip an owned skin or sound
    Equip { product_id: String },
    /// Record pops for quests and coins
    Pop {
        #[arg(long, default_value = "1")]
        count: u32,
        /// Hold duration per pop
        #[arg(long, default_value = "0")]
        hold_ms: u64,
        /// Coins per pop before boost
        #[arg(long, default_value = "1")]
        coins: u64,
    },
    /// Claim every finished quest
    ClaimQuests,
    /// Claim today's daily reward
    ClaimDaily,
    /// Apply a JSON array of platform purchase records
    Reconcile {
        #[arg(long)]
        records: String,
        /// Treat as a restore (no purchase telemetry)
        #[arg(long)]
        restore: bool,
    },
    /// Dump revenue telemetry counters
    Telemetry,
    /// Export the cloud snapshot and status as JSON
    Export,
}

fn parse_tab(s: &str) -> Result<ShopTab> {
    ShopTab::parse(s).ok_or_else(|| {
        anyhow::anyhow!("Invalid tab '{}'. Valid: skins, sounds, special", s)
    })
}

fn parse_variant(s: &str) -> Result<Variant> {
    Variant::parse(s).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid variant '{}'. Valid: PREMIUM_FIRST, VALUE_STACK, CONTROL",
            s
        )
    })
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = EconomyConfig::load(cli.config.as_deref())?;
    let store = RedbStore::open(cli.db_path.as_deref())?;
    info!("Using database {}", store.path().display());
    let session = EconomySession::open(Arc::new(store), Arc::new(SystemClock), config);

    match cli.command {
        Commands::Status => cmd_status(&session),
        Commands::Catalog => cmd_catalog(&session),
        Commands::Shop {
            tab,
            search,
            variant,
            reset_variant,
        } => cmd_shop(&session, &tab, &search, variant, reset_variant),
        Commands::Buy { product_id } => cmd_buy(&session, &product_id),
        Commands::Equip { product_id } => cmd_equip(&session, &product_id),
        Commands::Pop {
            count,
            hold_ms,
            coins,
        } => cmd_pop(&session, count, hold_ms, coins),
        Commands::ClaimQuests => cmd_claim_quests(&session),
        Commands::ClaimDaily => cmd_claim_daily(&session),
        Commands::Reconcile { records, restore } => cmd_reconcile(&session, &records, restore),
        Commands::Telemetry => cmd_telemetry(&session),
        Commands::Export => cmd_export(&session),
    }
}

fn cmd_status(session: &EconomySession) -> Result<()> {
    let status = session.status();

    println!("=== Slime Pop Economy ===");
    println!("Coins:      {}", status.coins);
    println!("Skin:       {}", status.equipped_skin);
    println!("Sound:      {}", status.equipped_sound);
    println!("Ads:        {}", if status.ads_removed { "removed" } else { "on" });
    println!("Content:    {} owned", status.owned_content);
    println!(
        "Daily:      streak {} ({})",
        status.daily_streak,
        if status.daily_ready { "ready" } else { "claimed" }
    );
    println!("Pops:       {} ({} ms held)", status.total_pops, status.total_hold_ms);
    if let Some(variant) = status.shop_variant {
        println!("Variant:    {}", variant);
    }
    println!();
    println!("Quests:");
    for q in &status.quests {
        let mark = if q.claimed {
            "claimed"
        } else if q.ready {
            "ready"
        } else {
            ""
        };
        println!(
            "  {:<24} {:>6}/{:<6} +{:<4} {}",
            q.quest.title, q.progress, q.quest.target, q.quest.reward, mark
        );
    }

    Ok(())
}

fn cmd_catalog(session: &EconomySession) -> Result<()> {
    let catalog = session.catalog();
    let policy = session.policy();
    let ent = session.entitlements();

    println!("{:<12}  {:<8}  {:<28}  {:<10}  {}", "PRODUCT", "KIND", "TITLE", "PRICE", "OWNED");
    println!("{}", "-".repeat(72));

    for id in catalog.all_product_ids() {
        let kind = ProductCategory::of(&id).map(|c| c.as_str()).unwrap_or("other");
        let price = policy.price_label(&id).unwrap_or_else(|| "store".into());
        println!(
            "{:<12}  {:<8}  {:<28}  {:<10}  {}",
            id,
            kind,
            catalog.title_for(&id),
            price,
            if ent.owns(&id) { "yes" } else { "" }
        );
    }

    println!("\nBundles:");
    for bundle in catalog.bundles() {
        println!("  {}: {}", bundle.bundle_id, bundle.granted_product_ids.join(", "));
    }

    Ok(())
}

fn cmd_shop(
    session: &EconomySession,
    tab: &str,
    search: &str,
    variant: Option<String>,
    reset_variant: bool,
) -> Result<()> {
    let tab = parse_tab(tab)?;
    if reset_variant {
        session.reset_shop_variant()?;
    }
    if let Some(v) = variant.as_deref() {
        session.force_shop_variant(parse_variant(v)?)?;
    }

    let view = session.shop(tab, search)?;
    if view.items.is_empty() {
        println!("No items found.");
        return Ok(());
    }

    println!("Variant: {}\n", view.variant);
    println!("{:>3}  {:<12}  {:<28}  {:<12}  {}", "#", "PRODUCT", "TITLE", "BADGE", "PRICE");
    println!("{}", "-".repeat(72));
    for (rank, item) in view.items.iter().enumerate() {
        let badge = item.badge.map(|b| b.label()).unwrap_or("");
        let price = session
            .policy()
            .price_label(&item.product_id)
            .unwrap_or_else(|| "store".into());
        println!(
            "{:>3}  {:<12}  {:<28}  {:<12}  {}",
            rank + 1,
            item.product_id,
            item.title,
            badge,
            price
        );
    }

    Ok(())
}

fn cmd_buy(session: &EconomySession, product_id: &str) -> Result<()> {
    session.track_buy_click(product_id)?;
    match session.buy_with_coins(product_id, None) {
        Ok(_) => {
            println!("Bought {}. Coins left: {}", product_id, session.coins());
            Ok(())
        }
        Err(e) => anyhow::bail!("{}", e.user_message()),
    }
}

fn cmd_equip(session: &EconomySession, product_id: &str) -> Result<()> {
    let result = match ProductCategory::of(product_id) {
        Some(ProductCategory::Skin) => session.equip_skin(product_id),
        Some(ProductCategory::Sound) => session.equip_sound(product_id),
        _ => anyhow::bail!("'{}' is not a skin or sound", product_id),
    };
    if let Err(e) = result {
        anyhow::bail!("{}", e.user_message());
    }
    println!("Equipped {}", product_id);
    Ok(())
}

fn cmd_pop(session: &EconomySession, count: u32, hold_ms: u64, coins: u64) -> Result<()> {
    let mut earned = 0;
    let mut quests_ready = 0;
    for _ in 0..count {
        let outcome = session.record_pop(coins, hold_ms)?;
        earned += outcome.earned;
        quests_ready = outcome.quests_ready;
    }

    println!("Popped {} times, earned {} coins", count, earned);
    println!("Coins: {}", session.coins());
    if quests_ready > 0 {
        println!("{} quest(s) ready to claim", quests_ready);
    }
    Ok(())
}

fn cmd_claim_quests(session: &EconomySession) -> Result<()> {
    let summary = session.claim_ready_quests()?;
    if summary.claimed.is_empty() {
        println!("No quests ready.");
        return Ok(());
    }
    for q in &summary.claimed {
        println!("  {} +{}", q.title, q.reward);
    }
    println!("Awarded {} coins", summary.coins_awarded);
    Ok(())
}

fn cmd_claim_daily(session: &EconomySession) -> Result<()> {
    match session.claim_daily()? {
        DailyClaim::Claimed { streak, reward } => {
            println!("Day {} streak: +{} coins", streak, reward);
        }
        DailyClaim::AlreadyClaimed { streak } => {
            println!("Already claimed today (streak {})", streak);
        }
    }
    Ok(())
}

fn cmd_reconcile(session: &EconomySession, path: &str, restore: bool) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read purchase records from {}", path))?;
    let records: Vec<PurchaseRecord> =
        serde_json::from_str(&raw).context("Failed to parse purchase records")?;

    let delta = session.reconciler().reconcile(&records, restore)?;
    session.refresh_entitlements()?;

    println!("Owned via store: {}", delta.now_owned.len());
    for id in &delta.newly_owned {
        println!("  + {}", id);
    }
    if !delta.to_acknowledge.is_empty() {
        println!("{} purchase(s) still need acknowledgement", delta.to_acknowledge.len());
    }
    Ok(())
}

fn cmd_telemetry(session: &EconomySession) -> Result<()> {
    let counters = session.telemetry().counters()?;
    if counters.is_empty() {
        println!("No events recorded.");
        return Ok(());
    }

    println!(
        "{:<20}  {:<14}  {:<10}  {:<12}  {}",
        "EVENT", "VARIANT", "CATEGORY", "PRODUCT", "COUNT"
    );
    println!("{}", "-".repeat(72));
    for c in &counters {
        println!(
            "{:<20}  {:<14}  {:<10}  {:<12}  {}",
            c.event, c.variant, c.category, c.product_id, c.count
        );
    }
    Ok(())
}

fn cmd_export(session: &EconomySession) -> Result<()> {
    let export = serde_json::json!({
        "exported_at": Utc::now().to_rfc3339(),
        "snapshot": session.cloud_snapshot(),
        "status": session.status(),
    });

    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}
