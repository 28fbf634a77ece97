//! Track source resolution.
//!
//! Decides where this page's routes come from, in priority order:
//! 1. `q`: one inline route, decoded locally, no network
//! 2. `id`: a remote route set fetched once from the track endpoint
//! 3. neither: no routes
//!
//! A failed fetch is logged and leaves the route set empty. There is no
//! retry; exactly one attempt is made per page load.

mod endpoint;
pub mod query;

pub use endpoint::{
    endpoint_url, parse_track_response, FetchOutcome, FetchReply, HttpTrackEndpoint,
    TrackEndpoint,
};
pub use query::QueryParams;

use crate::track::{decode_track, decode_track_set, RouteSet};
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Where the current routes came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSource {
    None,
    Inline,
    Remote { id: String },
}

/// Progress of the single resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveStatus {
    NotStarted,
    /// Waiting on the remote endpoint.
    Pending { id: String },
    Resolved(RouteSet),
}

/// Resolves the page's route set from its query parameters.
pub struct TrackSourceResolver {
    sender: Sender<FetchOutcome>,
    receiver: Receiver<FetchOutcome>,
    status: ResolveStatus,
    source: RouteSource,
}

impl Default for TrackSourceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackSourceResolver {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            status: ResolveStatus::NotStarted,
            source: RouteSource::None,
        }
    }

    pub fn status(&self) -> &ResolveStatus {
        &self.status
    }

    pub fn source(&self) -> &RouteSource {
        &self.source
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, ResolveStatus::Pending { .. })
    }

    /// Starts resolution. Only the first call has any effect.
    ///
    /// Returns the route set when it is available synchronously (inline or
    /// empty); returns `None` while a remote fetch is outstanding.
    pub fn resolve(
        &mut self,
        params: &QueryParams,
        endpoint: &dyn TrackEndpoint,
        ctx: Option<egui::Context>,
    ) -> Option<RouteSet> {
        if self.status != ResolveStatus::NotStarted {
            log::warn!("Track source already resolved, ignoring repeated request");
            return None;
        }

        if let Some(q) = &params.q {
            let routes = RouteSet::inline(decode_track(q));
            log::info!(
                "Loaded inline route with {} point(s)",
                routes.tracks().first().map_or(0, |t| t.len())
            );
            self.source = RouteSource::Inline;
            self.status = ResolveStatus::Resolved(routes.clone());
            return Some(routes);
        }

        if let Some(id) = &params.id {
            log::info!("Requesting route set '{}'", id);
            self.source = RouteSource::Remote { id: id.clone() };
            self.status = ResolveStatus::Pending { id: id.clone() };
            endpoint.fetch(id, FetchReply::new(self.sender.clone(), ctx));
            // The endpoint may have answered synchronously.
            return self.try_recv();
        }

        log::info!("No route parameters present");
        let routes = RouteSet::empty();
        self.status = ResolveStatus::Resolved(routes.clone());
        Some(routes)
    }

    /// Non-blocking check for the remote fetch outcome.
    ///
    /// Returns the route set once, when the fetch completes. A failed fetch
    /// yields an empty route set.
    pub fn try_recv(&mut self) -> Option<RouteSet> {
        if !self.is_pending() {
            return None;
        }
        let outcome = self.receiver.try_recv().ok()?;
        let routes = match outcome {
            Ok(raw) => {
                let routes = RouteSet::fetched(decode_track_set(&raw));
                log::info!(
                    "Fetched {} route(s), {} drawable",
                    raw.len(),
                    routes.tracks().len()
                );
                routes
            }
            Err(e) => {
                log::error!("Failed to fetch routes: {}", e);
                RouteSet::empty()
            }
        };
        self.status = ResolveStatus::Resolved(routes.clone());
        Some(routes)
    }
}
