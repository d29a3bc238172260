//! View-state controller for the character list
//!
//! Every load or search runs the same cycle: raise `loading` and clear the
//! error, delegate to the [`CatalogClient`], turn a failure into a user-facing
//! message, then drop `loading` no matter how the attempt ended. Failures never
//! reach the caller and never clear the character set.

use crossterm::event::KeyCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

use crate::api_client::CatalogError;
use crate::config::config::MessagesConfig;
use crate::data::{CharacterSet, PageInfo};
use crate::services::CatalogClient;
use crate::state::{Derived, Observable, ReadOnly};

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub characters: CharacterSet,
    pub page_info: Option<PageInfo>,
    pub search_term: String,
    pub loading: bool,
    pub error_message: String,
    pub has_characters: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Load,
    Search,
}

/// Clears the loading flag when an attempt ends, including when its future
/// is dropped before completion
struct LoadingGuard<'a>(&'a Observable<bool>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[derive(Clone)]
pub struct ListPresenter {
    client: CatalogClient,
    messages: Arc<MessagesConfig>,
    search_term: Observable<String>,
    loading: Observable<bool>,
    error_message: Observable<String>,
    has_characters: Derived<CharacterSet, bool>,
    activated: Arc<AtomicBool>,
}

impl ListPresenter {
    pub fn new(client: CatalogClient, messages: MessagesConfig) -> Self {
        let has_characters = client.characters().map(|set| !set.is_empty());
        Self {
            client,
            messages: Arc::new(messages),
            search_term: Observable::default(),
            loading: Observable::new(false),
            error_message: Observable::default(),
            has_characters,
            activated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Hook for the view becoming active. Loads the listing the first time only.
    pub async fn on_activate(&self) {
        if self.activated.swap(true, Ordering::SeqCst) {
            debug!(target: "presenter", "View already active, skipping initial load");
            return;
        }
        self.load_initial().await;
    }

    pub async fn load_initial(&self) {
        let _guard = self.begin();
        let result = self.client.fetch_all().await;
        self.conclude(Attempt::Load, result);
    }

    pub async fn submit_search(&self) {
        let term = self.search_term.get();
        let _guard = self.begin();
        let result = self.client.fetch_by_name(&term).await;
        self.conclude(Attempt::Search, result);
    }

    /// Enter submits the search; every other key is ignored
    pub async fn handle_key(&self, key: KeyCode) {
        if key == KeyCode::Enter {
            self.submit_search().await;
        }
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        self.search_term.set(term.into());
    }

    pub fn search_term(&self) -> String {
        self.search_term.get()
    }

    pub fn characters(&self) -> ReadOnly<CharacterSet> {
        self.client.characters()
    }

    pub fn loading(&self) -> bool {
        self.loading.get()
    }

    /// Subscribe to loading changes
    pub fn loading_view(&self) -> ReadOnly<bool> {
        self.loading.read_only()
    }

    /// Empty when the last attempt succeeded
    pub fn error_message(&self) -> String {
        self.error_message.get()
    }

    pub fn has_characters(&self) -> bool {
        self.has_characters.get()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let characters = self.client.characters().get();
        ViewSnapshot {
            has_characters: !characters.is_empty(),
            characters,
            page_info: self.client.page_info().get(),
            search_term: self.search_term.get(),
            loading: self.loading.get(),
            error_message: self.error_message.get(),
        }
    }

    fn begin(&self) -> LoadingGuard<'_> {
        self.loading.set(true);
        self.error_message.set(String::new());
        LoadingGuard(&self.loading)
    }

    fn conclude(&self, attempt: Attempt, result: Result<CharacterSet, CatalogError>) {
        let err = match result {
            Ok(_) => return,
            Err(err) => err,
        };

        let message = match attempt {
            Attempt::Load => {
                error!(target: "presenter", "Error loading initial characters: {}", err);
                &self.messages.load_failed
            }
            Attempt::Search if err.is_not_found() => {
                error!(target: "presenter", "Error searching characters: {}", err);
                &self.messages.search_not_found
            }
            Attempt::Search => {
                error!(target: "presenter", "Error searching characters: {}", err);
                &self.messages.search_failed
            }
        };
        self.error_message.set(message.clone());
    }
}
