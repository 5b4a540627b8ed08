//! Where events come from: a JSON file or the REST backend.

use std::path::PathBuf;

use agenda_core::date_range::VisibleRange;
use agenda_core::event::{RawEvent, parse_timestamp};
use agenda_core::session::{Session, SessionUser};
use anyhow::{Context, Result};
use chrono_tz::Tz;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

/// Supplies the events of a visible range.
pub(crate) trait EventSource {
    async fn fetch(&self, range: &VisibleRange, tz: &Tz) -> Result<Vec<RawEvent>>;
}

pub enum Source {
    File(FileSource),
    Http(HttpSource),
}

impl EventSource for Source {
    async fn fetch(&self, range: &VisibleRange, tz: &Tz) -> Result<Vec<RawEvent>> {
        match self {
            Source::File(source) => source.fetch(range, tz).await,
            Source::Http(source) => source.fetch(range, tz).await,
        }
    }
}

/// A JSON array of events on disk, filtered to the requested window.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        FileSource { path }
    }
}

impl EventSource for FileSource {
    async fn fetch(&self, range: &VisibleRange, tz: &Tz) -> Result<Vec<RawEvent>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read events file at {}", self.path.display()))?;

        let events = decode_records(&content)
            .with_context(|| format!("Failed to parse events file at {}", self.path.display()))?;

        let (from, to) = range.query_bounds(tz);
        Ok(events
            .into_iter()
            .filter(|event| {
                let start = event.start_time.as_deref().and_then(parse_timestamp);
                let end = event.end_time.as_deref().and_then(parse_timestamp);
                match (start, end) {
                    (Some(start), Some(end)) => start < to && end >= from,
                    // let the view decide what to do with records it can't place
                    _ => true,
                }
            })
            .collect())
    }
}

/// `GET {api_url}/events/calendar?start=..&end=..`
pub struct HttpSource {
    client: reqwest::Client,
    api_url: String,
    session: Option<Session>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpSource {
    pub fn new(api_url: &str, session: Option<Session>) -> Self {
        HttpSource {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/events/calendar", self.api_url)
    }

    /// The logged-in user's record, `GET {api_url}/users/profile`.
    pub async fn profile(&self) -> Result<SessionUser> {
        let url = format!("{}/users/profile", self.api_url);
        self.send(self.client.get(url))
            .await?
            .json::<SessionUser>()
            .await
            .context("Backend returned an unexpected profile")
    }

    /// Attach the bearer token, send, and turn error statuses into errors.
    async fn send(&self, mut request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        if let Some(session) = &self.session {
            request = request.header(AUTHORIZATION, session.bearer());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Could not reach {}", self.api_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(error_message(status, &body));
        }
        Ok(response)
    }
}

/// Error text for a failed request: the body's `message` when there is one.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed ({status})"))
}

/// Decode a JSON array of event records one record at a time.
///
/// A record that doesn't fit the wire shape is logged and dropped; only a
/// payload that isn't an array at all is an error.
fn decode_records(payload: &str) -> Result<Vec<RawEvent>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(payload)?;
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| match serde_json::from_value::<RawEvent>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(position, "dropping event record: {e}");
                None
            }
        })
        .collect())
}

impl EventSource for HttpSource {
    async fn fetch(&self, range: &VisibleRange, tz: &Tz) -> Result<Vec<RawEvent>> {
        let (start, end) = range.query_params(tz);
        tracing::debug!(%start, %end, url = %self.endpoint(), "fetching calendar events");

        let request = self
            .client
            .get(self.endpoint())
            .query(&[("start", start.as_str()), ("end", end.as_str())]);

        let body = self
            .send(request)
            .await?
            .text()
            .await
            .context("Could not read calendar events")?;

        decode_records(&body).context("Backend returned an unexpected calendar payload")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::Granularity;
    use agenda_core::session::Role;
    use chrono::{NaiveDate, Weekday};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    // header `{"alg":"HS256"}`, payload `{}`
    const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.e30.signature";

    fn june() -> VisibleRange {
        VisibleRange::for_focus(
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            Granularity::Month,
            Weekday::Sun,
        )
    }

    /// Answer one HTTP request with `status` and `body`; resolves to the raw request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (format!("http://{addr}/api"), handle)
    }

    #[tokio::test]
    async fn test_file_source_keeps_overlapping_and_unplaceable_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 1, "title": "in", "startTime": "2025-06-10T09:00:00Z", "endTime": "2025-06-10T10:00:00Z"},
                {"id": 2, "title": "spans in", "startTime": "2025-05-30T09:00:00Z", "endTime": "2025-06-01T10:00:00Z"},
                {"id": 3, "title": "out", "startTime": "2025-07-02T09:00:00Z", "endTime": "2025-07-02T10:00:00Z"},
                {"id": 4, "title": "broken"}
            ]"#,
        )
        .unwrap();

        let range = VisibleRange::for_focus(
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            Granularity::Month,
            Weekday::Sun,
        );
        let events = FileSource::new(path).fetch(&range, &chrono_tz::UTC).await.unwrap();

        let ids: Vec<_> = events.iter().filter_map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn test_file_source_drops_only_the_mistyped_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 1, "title": "fine", "startTime": "2025-06-10T09:00:00Z", "endTime": "2025-06-10T10:00:00Z"},
                {"id": "2", "title": "string id", "startTime": "2025-06-11T09:00:00Z", "endTime": "2025-06-11T10:00:00Z"},
                {"id": 3, "startTime": 123, "endTime": "2025-06-12T10:00:00Z"},
                {"id": 4, "startTime": "2025-06-13T09:00:00Z", "endTime": "2025-06-13T10:00:00Z", "reminderOffset": "15"},
                "not an object",
                {"id": 5, "title": "also fine", "startTime": "2025-06-14T09:00:00Z", "endTime": "2025-06-14T10:00:00Z"}
            ]"#,
        )
        .unwrap();

        let events = FileSource::new(path).fetch(&june(), &chrono_tz::UTC).await.unwrap();

        let ids: Vec<_> = events.iter().filter_map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[tokio::test]
    async fn test_file_source_rejects_non_array_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, r#"{"events": []}"#).unwrap();

        assert!(FileSource::new(path).fetch(&june(), &chrono_tz::UTC).await.is_err());
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let range = VisibleRange::for_focus(
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            Granularity::Day,
            Weekday::Sun,
        );
        let result = FileSource::new(PathBuf::from("/nonexistent/events.json"))
            .fetch(&range, &chrono_tz::UTC)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_http_endpoint_trims_trailing_slash() {
        let source = HttpSource::new("http://localhost:3020/api/", None);
        assert_eq!(source.endpoint(), "http://localhost:3020/api/events/calendar");
    }

    #[test]
    fn test_error_message() {
        let status = StatusCode::UNAUTHORIZED;
        assert_eq!(error_message(status, r#"{"message": "Token expired"}"#), "Token expired");
        assert_eq!(
            error_message(status, "<html>Bad gateway</html>"),
            "Request failed (401 Unauthorized)"
        );
        assert_eq!(error_message(status, ""), "Request failed (401 Unauthorized)");
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message": null}"#),
            "Request failed (500 Internal Server Error)"
        );
    }

    #[tokio::test]
    async fn test_http_source_request_and_partial_payload() {
        let (api_url, server) = serve_once(
            "200 OK",
            r#"[{"id": 1, "title": "ok", "startTime": "2025-06-10T09:00:00Z", "endTime": "2025-06-10T10:00:00Z"},
                {"id": "2", "startTime": "2025-06-11T09:00:00Z", "endTime": "2025-06-11T10:00:00Z"}]"#,
        )
        .await;

        let session = Session::login(TOKEN, None).unwrap();
        let events = HttpSource::new(&api_url, Some(session))
            .fetch(&june(), &chrono_tz::UTC)
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(events.iter().filter_map(|e| e.id).collect::<Vec<_>>(), vec![1]);
        assert!(request.starts_with(
            "get /api/events/calendar?start=2025-06-01t00%3a00%3a00z&end=2025-07-01t00%3a00%3a00z http/1.1"
        ));
        assert!(request.contains(&format!("authorization: bearer {}", TOKEN.to_lowercase())));
    }

    #[tokio::test]
    async fn test_http_source_without_session_sends_no_token() {
        let (api_url, server) = serve_once("200 OK", "[]").await;

        let events = HttpSource::new(&api_url, None)
            .fetch(&june(), &chrono_tz::UTC)
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(events.is_empty());
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_http_source_surfaces_error_message() {
        let (api_url, server) =
            serve_once("401 Unauthorized", r#"{"message": "Token expired"}"#).await;

        let err = HttpSource::new(&api_url, None)
            .fetch(&june(), &chrono_tz::UTC)
            .await
            .unwrap_err();
        server.await.unwrap();

        assert_eq!(err.to_string(), "Token expired");
    }

    #[tokio::test]
    async fn test_profile() {
        let (api_url, server) = serve_once(
            "200 OK",
            r#"{"id": 7, "name": "ana", "email": "ana@example.com", "role": "ADMIN", "createdAt": "2025-01-01T00:00:00Z"}"#,
        )
        .await;

        let session = Session::login(TOKEN, None).unwrap();
        let user = HttpSource::new(&api_url, Some(session)).profile().await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("get /api/users/profile http/1.1"));
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "ana");
        assert_eq!(user.role, Role::Admin);
    }
}
