use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;

use crate::{debounce::Debouncer, geocoding::Geocoder, model::Coordinates};

/// Results for one settled input.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchUpdate {
    pub query: String,
    pub results: Vec<Coordinates>,
}

/// Search-as-you-type: every input supersedes the previous one, and only
/// inputs that stay unchanged for the quiet period reach the geocoder.
#[derive(Debug)]
pub struct SearchSession {
    geocoder: Arc<Geocoder>,
    debouncer: Debouncer,
    limit: usize,
    updates: mpsc::UnboundedSender<SearchUpdate>,
}

impl SearchSession {
    pub fn new(
        geocoder: Arc<Geocoder>,
        quiet: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let limit = geocoder.default_limit();
        let session = Self {
            geocoder,
            debouncer: Debouncer::new(quiet),
            limit,
            updates,
        };
        (session, rx)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn input(&mut self, text: &str) {
        let geocoder = Arc::clone(&self.geocoder);
        let updates = self.updates.clone();
        let query = text.trim().to_string();
        let limit = self.limit;

        self.debouncer.schedule(async move {
            let results = geocoder.search_locations(&query, limit).await;
            // A closed receiver just means nobody is listening any more.
            let _ = updates.send(SearchUpdate { query, results });
        });
    }

    /// Drop any pending or in-flight lookup; its results are never published.
    pub fn dismiss(&mut self) {
        self.debouncer.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
