//! Remote track endpoint.
//!
//! `GET <base>?id=<id>` answers with a JSON array of encoded tracks.
//! Fetches are async but egui's update() is synchronous, so results come
//! back through a channel that the update loop polls.

use crate::error::FetchError;
use eframe::egui;
use std::sync::mpsc::Sender;
use url::Url;

/// Raw encoded tracks, one string per route.
pub type FetchOutcome = Result<Vec<String>, FetchError>;

/// Delivers a fetch outcome back to the UI thread.
///
/// Sending after the receiving side is gone is a silent no-op, which is
/// what makes late responses harmless after teardown.
pub struct FetchReply {
    sender: Sender<FetchOutcome>,
    ctx: Option<egui::Context>,
}

impl FetchReply {
    pub fn new(sender: Sender<FetchOutcome>, ctx: Option<egui::Context>) -> Self {
        Self { sender, ctx }
    }

    pub fn send(self, outcome: FetchOutcome) {
        if self.sender.send(outcome).is_err() {
            log::debug!("Track response arrived after teardown, ignoring");
            return;
        }
        if let Some(ctx) = self.ctx {
            ctx.request_repaint();
        }
    }
}

/// Source of remote route sets.
pub trait TrackEndpoint {
    /// Starts one fetch for `id`. The outcome goes to `reply` exactly once.
    fn fetch(&self, id: &str, reply: FetchReply);
}

/// Parses the endpoint body: a JSON array of strings.
pub fn parse_track_response(body: &str) -> FetchOutcome {
    Ok(serde_json::from_str::<Vec<String>>(body)?)
}

/// Builds `<base>?id=<id>`, resolving a relative base against `page_url`.
pub fn endpoint_url(base: &str, id: &str, page_url: Option<&str>) -> Result<Url, FetchError> {
    let mut url = match (Url::parse(base), page_url) {
        (Ok(url), _) => url,
        (Err(url::ParseError::RelativeUrlWithoutBase), Some(page)) => Url::parse(page)?.join(base)?,
        (Err(e), _) => return Err(e.into()),
    };
    url.set_query(None);
    url.query_pairs_mut().append_pair("id", id);
    Ok(url)
}

/// HTTP implementation backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTrackEndpoint {
    base_url: String,
}

impl HttpTrackEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn page_url() -> Option<String> {
        web_sys::window().and_then(|w| w.location().href().ok())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn page_url() -> Option<String> {
        None
    }
}

impl TrackEndpoint for HttpTrackEndpoint {
    #[cfg(target_arch = "wasm32")]
    fn fetch(&self, id: &str, reply: FetchReply) {
        let url = endpoint_url(&self.base_url, id, Self::page_url().as_deref());
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = match url {
                Ok(url) => fetch_tracks(url).await,
                Err(e) => Err(e),
            };
            reply.send(outcome);
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn fetch(&self, id: &str, reply: FetchReply) {
        let url = endpoint_url(&self.base_url, id, Self::page_url().as_deref());
        std::thread::spawn(move || {
            let outcome = url.and_then(fetch_tracks_blocking);
            reply.send(outcome);
        });
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_tracks(url: Url) -> FetchOutcome {
    log::info!("Fetching tracks from {}", url);
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    let body = response.text().await?;
    parse_track_response(&body)
}

#[cfg(not(target_arch = "wasm32"))]
fn fetch_tracks_blocking(url: Url) -> FetchOutcome {
    log::info!("Fetching tracks from {}", url);
    let response = reqwest::blocking::get(url)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    let body = response.text()?;
    parse_track_response(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_parse_array_of_strings() {
        assert_eq!(
            parse_track_response(r#"["1,2|3,4","5,6|7,8"]"#),
            Ok(vec!["1,2|3,4".to_string(), "5,6|7,8".to_string()])
        );
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(matches!(
            parse_track_response(r#"{"tracks":[]}"#),
            Err(FetchError::Json(_))
        ));
        assert!(matches!(
            parse_track_response("[1, 2]"),
            Err(FetchError::Json(_))
        ));
        assert!(matches!(
            parse_track_response("<html>"),
            Err(FetchError::Json(_))
        ));
    }

    #[test]
    fn test_endpoint_url_absolute() {
        let url = endpoint_url("https://example.com/tracks", "a b&c", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/tracks?id=a+b%26c");
    }

    #[test]
    fn test_endpoint_url_relative_to_page() {
        let url = endpoint_url(
            "/api/tracks",
            "42",
            Some("https://maps.example.org/view?id=42"),
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://maps.example.org/api/tracks?id=42");
    }

    #[test]
    fn test_endpoint_url_relative_without_page_fails() {
        assert!(matches!(
            endpoint_url("/api/tracks", "42", None),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_reply_after_receiver_dropped_is_silent() {
        let (sender, receiver) = channel();
        drop(receiver);
        FetchReply::new(sender, None).send(Ok(vec![]));
    }
}
