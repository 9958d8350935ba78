use haul_cache::TracingMetrics;
use haul_cache::prelude::*;
use std::time::Duration;
use tick::ClockControl;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Enable TRACE to see latency and lazy expiry events
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let control = ClockControl::new();
    let cache = CacheService::with_metrics(
        CacheConfig::default().with_max_size(2),
        control.to_clock(),
        TracingMetrics::new().with_cache_name("quotes"),
    );

    println!("\n⚡ Setting values...");
    cache.set("quote:1", 1_200u32, Some(Duration::from_secs(5)));
    cache.set("quote:2", 1_500u32, None);

    println!("\n⚡ Getting value (Hit)...");
    let _ = cache.get::<u32>("quote:1");

    println!("\n⚡ Over capacity (Eviction)...");
    cache.set("quote:3", 900u32, None);

    println!("\n⚡ After the TTL (Expired)...");
    control.advance(Duration::from_secs(6));
    cache.set("quote:4", 700u32, Some(Duration::from_secs(5)));
    control.advance(Duration::from_secs(6));
    let _ = cache.get::<u32>("quote:4");

    println!("\n⚡ Rate limiting...");
    let limiter = RateLimitService::with_clock(control.to_clock());
    for attempt in 1..=4 {
        let status = limiter.check_lead_submission();
        println!(
            "   attempt {attempt}: allowed={} remaining={} reset_in={}s",
            status.allowed, status.remaining, status.reset_in
        );
    }

    let stats = cache.stats();
    println!("\n📊 hits={} misses={} evictions={}", stats.hits, stats.misses, stats.evictions);
    Ok(())
}
