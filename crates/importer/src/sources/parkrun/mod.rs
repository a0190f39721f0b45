mod client;
mod parser;

pub use client::ParkrunClient;
pub use parser::{ParsedAthletePage, parse_athlete_page};

use crate::Result;
use crate::config::PipelineConfig;
use crate::traits::{FetchedResults, ResultFetcher, verify_identity};
use storage::ParkrunId;
use tracing::info;

/// Fetches an athlete's full result list from their parkrun profile page.
pub struct ParkrunFetcher {
    client: ParkrunClient,
}

impl ParkrunFetcher {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            client: ParkrunClient::new(config)?,
        })
    }
}

#[async_trait::async_trait]
impl ResultFetcher for ParkrunFetcher {
    async fn fetch(
        &self,
        athlete_id: &str,
        expected_name: Option<&str>,
    ) -> Result<FetchedResults> {
        let athlete_id = ParkrunId::new(athlete_id);
        let html = self.client.fetch_athlete_page(athlete_id.as_str()).await?;
        let page = parse_athlete_page(&html)?;
        verify_identity(expected_name, &page.name)?;

        info!(
            "Found {} result(s) for {} ({})",
            page.rows.len(),
            page.name,
            athlete_id
        );

        Ok(FetchedResults {
            verified_name: page.name,
            rows: page.rows,
        })
    }

    fn name(&self) -> &'static str {
        "parkrun"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImporterError;
    use crate::error::FailureKind;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one connection on a local port. `reply` of `None` accepts the
    /// connection and never answers.
    async fn serve_once(reply: Option<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            match reply {
                Some(reply) => socket.write_all(reply.as_bytes()).await.unwrap(),
                None => tokio::time::sleep(Duration::from_secs(30)).await,
            }
        });

        format!("http://{}", addr)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    fn fetcher(base_url: String, fetch_timeout: Duration) -> ParkrunFetcher {
        let config = PipelineConfig {
            base_url,
            fetch_timeout,
            ..Default::default()
        };
        ParkrunFetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_parses_served_page() {
        let body = "<h2>Jane DOE (A123456)</h2>\
            <table><caption>All Results</caption>\
            <tr><th>Event</th><th>Run Date</th><th>Run Number</th><th>Pos</th>\
            <th>Time</th><th>Age Grade</th></tr>\
            <tr><td>Bushy parkrun</td><td>14/01/2023</td><td>812</td><td>57</td>\
            <td>24:02</td><td>61.45%</td></tr></table>";
        let base = serve_once(Some(http_response("200 OK", body))).await;

        let results = fetcher(base, Duration::from_secs(5))
            .fetch("A123456", Some("jane doe"))
            .await
            .unwrap();

        assert_eq!(results.verified_name, "Jane DOE");
        assert_eq!(results.rows.len(), 1);
        assert_eq!(results.rows[0].time, "24:02");
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_failure() {
        let base = serve_once(Some(http_response("503 Service Unavailable", ""))).await;

        let err = fetcher(base, Duration::from_secs(5))
            .fetch("123456", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ImporterError::Fetch(_)));
        assert_eq!(err.failure_kind(), Some(FailureKind::Fetch));
    }

    #[tokio::test]
    async fn test_timeout_is_fetch_failure() {
        let base = serve_once(None).await;

        let err = fetcher(base, Duration::from_millis(100))
            .fetch("123456", None)
            .await
            .unwrap_err();

        assert_eq!(err.failure_kind(), Some(FailureKind::Fetch));
        match err {
            ImporterError::Fetch(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
