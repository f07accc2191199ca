use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::core::config::UpstreamConfig;
use crate::core::error::{Result, SubError};
use crate::interfaces::TextFetcher;

/// 基于 reqwest 的上游抓取客户端
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let target = Url::parse(url.trim()).map_err(|e| SubError::upstream(url, e))?;
        debug!("Fetching address source: {}", target);

        let resp = self.client.get(target).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SubError::upstream(url, format!("HTTP {}", status)));
        }
        Ok(resp.text().await?)
    }
}
