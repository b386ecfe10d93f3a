// Upstream monitoring API client. Fetches paginated per-resource daily usage
// samples for a set of app groups and hands fully-typed samples to the series
// engine. Decoding is lossy by policy: malformed entries become absent fields,
// never errors; only transport/status failures propagate.

pub mod decode;
pub mod series;

use crate::config::UpstreamConfig;
use crate::models::RawResourceSample;
use crate::window::ResolvedWindow;
use tracing::{debug, instrument};

pub struct UsageRepo {
    http: reqwest::Client,
    base_url: String,
    ui_base_url: String,
    api_token: Option<String>,
    page_size: u32,
}

impl UsageRepo {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ui_base_url: config.ui_base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            page_size: config.page_size,
        }
    }

    /// Fetches every page of raw samples for the groups and window.
    #[instrument(skip(self, app_groups), fields(repo = "usage", operation = "fetch_samples", groups = app_groups.len()))]
    pub async fn fetch_samples(
        &self,
        app_groups: &[String],
        window: &ResolvedWindow,
    ) -> anyhow::Result<Vec<RawResourceSample>> {
        let mut samples: Vec<RawResourceSample> = Vec::new();
        let mut offset: u32 = 0;
        loop {
            let page = self.fetch_page(app_groups, window, offset).await?;
            let page_len = page.resources.len() as u32;
            for resource in &page.resources {
                decode::append_resource_samples(resource, &mut samples);
            }
            if page_len < self.page_size {
                break;
            }
            offset += self.page_size;
        }
        debug!(samples = samples.len(), "upstream fetch complete");
        Ok(samples)
    }

    async fn fetch_page(
        &self,
        app_groups: &[String],
        window: &ResolvedWindow,
        offset: u32,
    ) -> anyhow::Result<decode::UsagePage> {
        let url = format!("{}/v1/workloads/usage", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("startDate", window.start_date().to_string()),
            ("endDate", window.end_date().to_string()),
            ("offset", offset.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        for group in app_groups {
            query.push(("appGroup", group.clone()));
        }

        let mut request = self.http.get(&url).query(&query);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("monitoring API request failed: {}", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "monitoring API returned {}: {}",
                status,
                body.chars().take(512).collect::<String>()
            );
        }
        response
            .json::<decode::UsagePage>()
            .await
            .map_err(|e| anyhow::anyhow!("monitoring API response decode failed: {}", e))
    }

    /// Deep link into the vendor UI, scoped to the same groups and window
    /// bounds as the fetch so the chart and the vendor view agree.
    pub fn deep_link(&self, app_groups: &[String], window: &ResolvedWindow) -> String {
        let mut url = format!(
            "{}/workloads?startDate={}&endDate={}",
            self.ui_base_url,
            window.start_date(),
            window.end_date()
        );
        for group in app_groups {
            url.push_str("&appGroup=");
            url.push_str(group);
        }
        url
    }
}
