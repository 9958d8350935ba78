//! Basic example: named caches, TTL patterns, stats and export

use haul_cache::prelude::*;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
struct Quote {
    id: u64,
    from: String,
    to: String,
    price_pence: u32,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== haul-cache Basic Example ===\n");

    let caches = Caches::default();
    let cleanup = caches.spawn_cleanup(haul_cache::DEFAULT_CLEANUP_INTERVAL);

    let quote = Quote {
        id: 123,
        from: "LS1 4AP".to_string(),
        to: "YO1 7HH".to_string(),
        price_pence: 45_000,
    };

    println!("Storing quote in the api cache...");
    caches.api.set("quote:123", quote, Some(Duration::from_secs(60)));

    match caches.api.get::<Quote>("quote:123") {
        Some(quote) => println!("✅ Cache HIT: {} -> {} for {}p", quote.from, quote.to, quote.price_pence),
        None => println!("❌ Cache MISS"),
    }

    // Wrong type is a miss, try_get says why
    if let Err(e) = caches.api.try_get::<String>("quote:123") {
        println!("⚠️ {e}");
    }

    println!("\nUsing TTL patterns...");
    caches
        .user
        .set_with_pattern("session:abc", "visitor".to_string(), Some(TtlPattern::User));
    caches
        .static_assets
        .set_with_pattern("areas", vec!["north", "south"], Some(TtlPattern::Static));

    println!("\nFetching through get_or_set...");
    let price = caches
        .default
        .get_or_set(
            "price:van",
            || async {
                println!("  -> computing price");
                Ok::<_, std::io::Error>(9_900u32)
            },
            None,
        )
        .await?;
    println!("   Van price: {price}p");

    let price = caches
        .default
        .get_or_set("price:van", || async { Ok::<_, std::io::Error>(0u32) }, None)
        .await?;
    println!("   Van price again (cached): {price}p");

    println!("\nStats:");
    for (name, stats) in caches.stats() {
        println!(
            "   {name:<8} entries={} size={} health={} hits={} misses={}",
            stats.total_entries, stats.total_size, stats.health_ratio, stats.hits, stats.misses
        );
    }

    println!("\nExport of the api cache:");
    println!("{}", serde_json::to_string_pretty(&caches.api.export_json())?);

    cleanup.into_iter().for_each(|task| task.abort());
    println!("\n✅ Done");
    Ok(())
}
