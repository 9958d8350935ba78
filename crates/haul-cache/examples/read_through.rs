use async_trait::async_trait;
use haul_cache::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, PartialEq)]
struct ServiceArea {
    postcode_prefix: String,
    depot: String,
}

#[derive(Debug)]
struct UnknownArea(String);

impl std::fmt::Display for UnknownArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no service area for {}", self.0)
    }
}

impl std::error::Error for UnknownArea {}

struct AreaLoader {
    // Simulate database
    db: HashMap<String, ServiceArea>,
}

impl AreaLoader {
    fn new() -> Self {
        let mut db = HashMap::new();
        for (prefix, depot) in [("LS", "Leeds"), ("YO", "York")] {
            db.insert(
                prefix.to_string(),
                ServiceArea {
                    postcode_prefix: prefix.to_string(),
                    depot: depot.to_string(),
                },
            );
        }
        Self { db }
    }
}

#[async_trait]
impl Loader<ServiceArea> for AreaLoader {
    type Error = UnknownArea;

    async fn load(&self, key: &str) -> std::result::Result<ServiceArea, UnknownArea> {
        println!("  -> Loading area {key} from DB...");
        // Simulate latency
        tokio::time::sleep(Duration::from_millis(100)).await;

        self.db
            .get(key)
            .cloned()
            .ok_or_else(|| UnknownArea(key.to_string()))
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let caches = Caches::default();

    let areas: ReadThroughCache<ServiceArea, _> = caches
        .static_assets
        .clone()
        .read_through(AreaLoader::new())
        .coalesced();

    println!("First fetch (miss, loads):");
    let area = areas.get("LS").await?;
    println!("  {} is served from {}", area.postcode_prefix, area.depot);

    println!("Second fetch (hit):");
    let area = areas.get("LS").await?;
    println!("  {} is served from {}", area.postcode_prefix, area.depot);

    println!("Concurrent fetches share one load:");
    let (a, b) = tokio::join!(areas.get("YO"), areas.get("YO"));
    println!("  {} / {}", a?.depot, b?.depot);

    println!("Unknown area:");
    match areas.get("ZZ").await {
        Ok(area) => println!("  unexpected: {area:?}"),
        Err(e) => println!("  {e}"),
    }

    println!(
        "Static cache now holds {} entries",
        caches.static_assets.stats().valid_entries
    );
    Ok(())
}
