use std::sync::Arc;

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde_json::json;
use tokio::time::{sleep, Duration};

use bharatvikas::cities::{by_tier, find, registry, Tier};
use bharatvikas::config::Config;
use bharatvikas::feed::cache::IndicatorCache;
use bharatvikas::feed::source::{HttpIndicatorSource, IndicatorSource, OfflineSource};
use bharatvikas::generator::generate_all;
use bharatvikas::logging::{flush, log, obj, run_id, v_num, v_str, Domain, Level};
use bharatvikas::metric::descriptor;
use bharatvikas::ranking::{
    compare_selected, growth_trend, rank_all, rank_position, ranked_rows, SelectionStats, MAX_COMPARED_CITIES,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let seed = cfg.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("run_id", v_str(&run_id())),
            ("seed", json!(seed)),
            ("metric", v_str(&cfg.metric)),
            ("live_apis", json!(cfg.live_apis)),
        ]),
    );

    // Simulated city series
    let cities = registry();
    log(
        Level::Info,
        Domain::Registry,
        "registry_loaded",
        obj(&[
            ("cities", json!(cities.len())),
            ("tier1", json!(by_tier(&cities, Tier::One).len())),
            ("tier2", json!(by_tier(&cities, Tier::Two).len())),
            ("tier3", json!(by_tier(&cities, Tier::Three).len())),
        ]),
    );
    let years = cfg.years();
    let all = generate_all(&cities, &years, &mut rng)?;
    let desc = descriptor(&cfg.metric)?;
    let series = all
        .iter()
        .find(|s| s.metric == desc.key)
        .ok_or_else(|| anyhow::anyhow!("no series generated for {}", desc.key))?;

    let ranking = rank_all(series, desc);
    for row in ranked_rows(&ranking, desc, cfg.top_n) {
        log(
            Level::Info,
            Domain::Ranking,
            "rank_row",
            obj(&[
                ("metric", v_str(desc.key.as_str())),
                ("rank", json!(row.rank)),
                ("city", v_str(&row.city)),
                ("value", v_str(&desc.format_value(row.value))),
                ("podium", json!(row.podium)),
            ]),
        );
    }

    let selected = cfg.selected_cities();
    for name in selected.iter().filter(|n| find(&cities, n).is_none()) {
        log(
            Level::Warn,
            Domain::Registry,
            "unknown_city",
            obj(&[("city", v_str(name)), ("policy", v_str(&format!("{:?}", cfg.missing_city_policy)))]),
        );
    }
    if selected.len() > MAX_COMPARED_CITIES {
        log(
            Level::Warn,
            Domain::Ranking,
            "large_selection",
            obj(&[
                ("selected", json!(selected.len())),
                ("suggested_max", json!(MAX_COMPARED_CITIES)),
            ]),
        );
    }
    let compared = compare_selected(series, desc, &selected, cfg.missing_city_policy)?;
    let stats = SelectionStats::from_sorted(&compared);
    for cv in &compared {
        log(
            Level::Info,
            Domain::Ranking,
            "comparison",
            obj(&[
                ("city", v_str(&cv.city)),
                ("value", v_str(&desc.format_value(cv.value))),
                ("overall_rank", json!(rank_position(&ranking, &cv.city))),
                ("growth_pct", v_num(growth_trend(series, &cv.city))),
            ]),
        );
    }
    log(
        Level::Info,
        Domain::Ranking,
        "comparison_summary",
        obj(&[
            ("metric", v_str(desc.key.as_str())),
            ("average", json!(stats.average)),
            ("range", json!(stats.range)),
            ("best", json!(stats.best.as_ref().map(|b| b.city.clone()))),
        ]),
    );

    // National indicator feeds
    let source: Arc<dyn IndicatorSource + Send + Sync> = if cfg.live_apis {
        Arc::new(HttpIndicatorSource::new(&cfg.fetch)?)
    } else {
        Arc::new(OfflineSource)
    };
    let cache = Arc::new(IndicatorCache::new(cfg.fetch.clone(), source));
    cache.refresh_all().await;

    let status = cache.status();
    log(
        Level::Info,
        Domain::Cache,
        "dashboard_status",
        obj(&[
            ("loaded", json!(status.loaded)),
            ("missing", json!(status.missing)),
            ("any_error", json!(status.any_error)),
            ("all_live", json!(status.all_live)),
            ("last_updated_ms", json!(status.last_updated_ms)),
        ]),
    );

    if cfg.run_secs > 0 {
        let handles = Arc::clone(&cache).spawn_auto_refresh();
        sleep(Duration::from_secs(cfg.run_secs)).await;
        for h in handles {
            h.abort();
        }
        log(Level::Info, Domain::System, "shutdown", obj(&[("run_secs", json!(cfg.run_secs))]));
    }

    flush();
    Ok(())
}
