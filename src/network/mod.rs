pub mod aggregate;
pub mod client;
pub mod top_ip;

use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::interfaces::TextFetcher;

pub use aggregate::aggregate;
pub use client::HttpFetcher;
pub use top_ip::TopIpFetcher;

/// 汇总所有上游地址源，全部为空时回退到静态/内置列表
pub async fn resolve_addresses<F>(config: &AppConfig, fetcher: &F) -> String
where
    F: TextFetcher + Clone,
{
    let ranked = TopIpFetcher::new(fetcher.clone(), config.top_ip_port);
    let (plain, ranked) = tokio::join!(
        aggregate(fetcher, &config.upstream.address_apis),
        aggregate(&ranked, &config.upstream.top_ip_apis),
    );

    let blob = [plain, ranked]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",");

    if blob.is_empty() {
        warn!("No addresses from upstream sources, using fallback list");
        config.fallback_text().to_string()
    } else {
        info!("Fetched {} bytes of addresses from upstream sources", blob.len());
        blob
    }
}
