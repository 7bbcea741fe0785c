//! HTTP client for the Starr queue APIs.

use super::types::{ApiVersion, QueueFetch, QueueItem, StarrApp, StarrClient, StarrError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

const API_KEY_HEADER: &str = "X-Api-Key";
const PAGE_SIZE: u32 = 100;

/// Queue client for one configured Starr instance.
pub struct HttpStarrClient {
    app: StarrApp,
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpStarrClient {
    pub fn new(app: StarrApp, api_url: &str, api_key: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            app,
            base_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    async fn fetch_page(
        &self,
        page: u32,
        version: ApiVersion,
    ) -> Result<(Vec<QueueRecord>, usize), StarrError> {
        let url = format!(
            "{}/api/{}/queue?page={}&pageSize={}",
            self.base_url, version, page, PAGE_SIZE
        );

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(StarrError::ApiError(format!("HTTP {}", response.status())));
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        decode_queue_page(version, &body)
    }
}

#[async_trait]
impl StarrClient for HttpStarrClient {
    fn app(&self) -> StarrApp {
        self.app
    }

    async fn fetch_queue(&self) -> QueueFetch {
        let version = self.app.api_version();
        let mut items = Vec::new();
        let mut records_seen = 0usize;
        let mut api_calls = 0u32;
        let mut page = 1u32;

        loop {
            api_calls += 1;
            match self.fetch_page(page, version).await {
                Ok((records, total)) => {
                    let fetched = records.len();
                    records_seen += fetched;
                    for record in records {
                        match record.into_queue_item(self.app) {
                            Some(item) => items.push(item),
                            None => warn!("Skipping {} queue record without an id", self.app),
                        }
                    }
                    if fetched == 0 || records_seen >= total {
                        break;
                    }
                    page += 1;
                }
                Err(e) => {
                    error!("Error fetching queue page {} from {}: {}", page, self.app, e);
                    return QueueFetch {
                        items,
                        api_calls,
                        error: Some(e),
                    };
                }
            }
        }

        info!(
            "Fetched {} queue items from {} using {} API calls",
            items.len(),
            self.app,
            api_calls
        );
        QueueFetch {
            items,
            api_calls,
            error: None,
        }
    }

    async fn delete_download(&self, id: &str, remove_from_client: bool) -> Result<(), StarrError> {
        let url = format!(
            "{}/api/{}/queue/{}?removeFromClient={}&blocklist=true",
            self.base_url,
            self.app.api_version(),
            id,
            remove_from_client
        );

        let response = self
            .client
            .delete(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(StarrError::ApiError(format!("HTTP {}", response.status())));
        }
        Ok(())
    }
}

fn map_reqwest_error(e: reqwest::Error) -> StarrError {
    if e.is_timeout() {
        StarrError::Timeout
    } else if e.is_connect() {
        StarrError::ConnectionFailed(e.to_string())
    } else {
        StarrError::ApiError(e.to_string())
    }
}

fn decode_queue_page(
    version: ApiVersion,
    body: &str,
) -> Result<(Vec<QueueRecord>, usize), StarrError> {
    match version {
        ApiVersion::V3 => serde_json::from_str::<QueuePage>(body).map(|page| {
            let total = page.total_records;
            (page.records, total)
        }),
        ApiVersion::V1 => serde_json::from_str::<Vec<QueueRecord>>(body).map(|records| {
            let total = records.len();
            (records, total)
        }),
    }
    .map_err(|e| StarrError::ApiError(format!("Invalid queue response: {}", e)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueuePage {
    #[serde(default)]
    records: Vec<QueueRecord>,
    #[serde(default)]
    total_records: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueueRecord {
    id: Option<i64>,
    title: Option<String>,
    #[serde(default)]
    size: f64,
    status: Option<String>,
    timeleft: Option<String>,
    error_message: Option<String>,
    movie: Option<MediaRecord>,
    series: Option<MediaRecord>,
    album: Option<MediaRecord>,
    book: Option<MediaRecord>,
}

#[derive(Debug, Deserialize)]
struct MediaRecord {
    title: Option<String>,
}

impl QueueRecord {
    /// Normalizes a raw queue record, resolving the display name from the
    /// attached media when present. Records without an id are dropped.
    fn into_queue_item(self, app: StarrApp) -> Option<QueueItem> {
        let id = self.id?;

        let media_title = match app {
            StarrApp::Radarr | StarrApp::Whisparr | StarrApp::Eros => self.movie,
            StarrApp::Sonarr => self.series,
            StarrApp::Lidarr => self.album,
            StarrApp::Readarr => self.book,
        }
        .and_then(|media| media.title);

        let name = media_title
            .or(self.title)
            .unwrap_or_else(|| "Unknown Download".to_string());

        let size = if self.size.is_finite() && self.size > 0.0 {
            self.size as u64
        } else {
            0
        };

        Some(QueueItem {
            id: id.to_string(),
            name,
            size,
            status: self
                .status
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "unknown".to_string()),
            eta: self.timeleft.as_deref().map(parse_timeleft).unwrap_or(0),
            error_message: self.error_message.unwrap_or_default(),
        })
    }
}

/// Parses the Starr "HH:MM:SS" timeleft format into seconds.
/// Anything else, including multi-day forms, counts as unknown. Backends can
/// report absurd hour counts, so the arithmetic saturates instead of trusting
/// the field to stay in range.
fn parse_timeleft(timeleft: &str) -> u64 {
    let parts: Vec<&str> = timeleft.split(':').collect();
    if parts.len() != 3 {
        return 0;
    }
    match (
        parts[0].parse::<u64>(),
        parts[1].parse::<u64>(),
        parts[2].parse::<u64>(),
    ) {
        (Ok(h), Ok(m), Ok(s)) => h
            .saturating_mul(3600)
            .saturating_add(m.saturating_mul(60))
            .saturating_add(s),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeleft() {
        assert_eq!(parse_timeleft("00:30:00"), 1800);
        assert_eq!(parse_timeleft("02:00:00"), 7200);
        assert_eq!(parse_timeleft("1:02:03"), 3723);
        assert_eq!(parse_timeleft(""), 0);
        assert_eq!(parse_timeleft("30:00"), 0);
        assert_eq!(parse_timeleft("1.00:00:00"), 0);
        assert_eq!(parse_timeleft("aa:bb:cc"), 0);
    }

    #[test]
    fn test_parse_timeleft_huge_hours_saturates() {
        // A broken backend must not be able to crash the fetch path; an
        // out-of-range ETA just reads as maximally far away.
        assert_eq!(parse_timeleft("9999999999999999999:00:00"), u64::MAX);
        assert_eq!(parse_timeleft("18446744073709551615:59:59"), u64::MAX);
        assert_eq!(parse_timeleft("5000000000000:00:00"), 18_000_000_000_000_000);
    }

    #[test]
    fn test_decode_v3_paged_envelope() {
        let body = r#"{"records": [{"id": 1, "title": "A"}], "totalRecords": 42}"#;
        let (records, total) = decode_queue_page(ApiVersion::V3, body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(total, 42);
    }

    #[test]
    fn test_decode_v3_tolerates_missing_fields() {
        let (records, total) = decode_queue_page(ApiVersion::V3, "{}").unwrap();
        assert!(records.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn test_decode_v1_bare_list() {
        let body = r#"[{"id": 7, "title": "B"}, {"id": 8}]"#;
        let (records, total) = decode_queue_page(ApiVersion::V1, body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(total, 2);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(decode_queue_page(ApiVersion::V1, "{}").is_err());
        assert!(decode_queue_page(ApiVersion::V3, "not json").is_err());
    }

    fn record_from_json(json: &str) -> QueueRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_record_name_prefers_media_title() {
        let record = record_from_json(
            r#"{"id": 1, "title": "Release.Name.2160p", "movie": {"title": "The Movie"}}"#,
        );
        let item = record.into_queue_item(StarrApp::Radarr).unwrap();
        assert_eq!(item.name, "The Movie");
    }

    #[test]
    fn test_record_name_falls_back_to_title_then_placeholder() {
        let record = record_from_json(r#"{"id": 2, "title": "Some.Episode"}"#);
        let item = record.into_queue_item(StarrApp::Sonarr).unwrap();
        assert_eq!(item.name, "Some.Episode");

        let record = record_from_json(r#"{"id": 3}"#);
        let item = record.into_queue_item(StarrApp::Sonarr).unwrap();
        assert_eq!(item.name, "Unknown Download");
    }

    #[test]
    fn test_record_media_field_depends_on_app() {
        let record = record_from_json(r#"{"id": 4, "album": {"title": "The Album"}}"#);
        let item = record.into_queue_item(StarrApp::Lidarr).unwrap();
        assert_eq!(item.name, "The Album");

        // The same record seen through a movie app ignores the album field.
        let record = record_from_json(r#"{"id": 4, "album": {"title": "The Album"}}"#);
        let item = record.into_queue_item(StarrApp::Radarr).unwrap();
        assert_eq!(item.name, "Unknown Download");
    }

    #[test]
    fn test_record_normalizes_status_eta_and_size() {
        let record = record_from_json(
            r#"{"id": 5, "title": "X", "status": "Downloading", "timeleft": "01:30:00", "size": 1234.9}"#,
        );
        let item = record.into_queue_item(StarrApp::Radarr).unwrap();
        assert_eq!(item.status, "downloading");
        assert_eq!(item.eta, 5400);
        assert_eq!(item.size, 1234);
        assert_eq!(item.error_message, "");

        let record = record_from_json(r#"{"id": 6, "title": "Y", "size": -5.0}"#);
        let item = record.into_queue_item(StarrApp::Radarr).unwrap();
        assert_eq!(item.status, "unknown");
        assert_eq!(item.eta, 0);
        assert_eq!(item.size, 0);
    }

    #[test]
    fn test_record_without_id_is_dropped() {
        let record = record_from_json(r#"{"title": "Orphan"}"#);
        assert!(record.into_queue_item(StarrApp::Radarr).is_none());
    }
}
