use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::Result;

// The results site rejects requests that do not look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub struct ParkrunClient {
    base_url: String,
    client: reqwest::Client,
}

impl ParkrunClient {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(config.fetch_timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn athlete_url(&self, athlete_id: &str) -> String {
        format!("{}/parkrunner/{}/all/", self.base_url, athlete_id)
    }

    /// Downloads the "all results" page for one athlete. Timeouts and non-2xx
    /// responses both surface as [`crate::ImporterError::Fetch`].
    pub async fn fetch_athlete_page(&self, athlete_id: &str) -> Result<String> {
        let url = self.athlete_url(athlete_id);
        debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let html = response.text().await?;

        info!("Fetched {} bytes for athlete {}", html.len(), athlete_id);
        Ok(html)
    }
}
