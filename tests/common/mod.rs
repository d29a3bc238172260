//! Shared fixtures: an in-process catalog server and a hand-driven source

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_cli::api_client::{CatalogError, CatalogQuery, CatalogSource, HttpCatalogSource};
use catalog_cli::config::config::{ApiConfig, MessagesConfig};
use catalog_cli::data::ApiResponse;
use catalog_cli::services::CatalogClient;
use catalog_cli::ui::list_presenter::ListPresenter;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// How the fake server answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    ServerError,
    Malformed,
    Hang,
}

/// One request seen by the fake server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub path: String,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct FakeCatalog {
    characters: Arc<Vec<Value>>,
    mode: Arc<Mutex<Mode>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl FakeCatalog {
    pub fn new(names: &[&str]) -> Self {
        let characters = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "id": i + 1,
                    "name": name,
                    "status": "Alive",
                    "species": "Human",
                    "type": "",
                    "gender": "Male",
                    "origin": {"name": "Earth (C-137)", "url": ""},
                    "location": {"name": "Citadel of Ricks", "url": ""},
                    "image": format!("https://example.test/avatar/{}.jpeg", i + 1),
                    "episode": [],
                    "url": format!("https://example.test/api/character/{}", i + 1),
                    "created": "2017-11-04T18:48:46.250Z"
                })
            })
            .collect();

        Self {
            characters: Arc::new(characters),
            mode: Arc::new(Mutex::new(Mode::Normal)),
            hits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    /// Serve on an ephemeral port and return the listing endpoint URL
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/api/character", get(characters))
            .route("/api/character/", get(characters))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}/api/character")
    }
}

async fn characters(
    State(fake): State<FakeCatalog>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let name = params.get("name").cloned();
    fake.hits.lock().unwrap().push(Hit {
        path: uri.path().to_string(),
        name: name.clone(),
    });

    let mode = *fake.mode.lock().unwrap();
    match mode {
        Mode::ServerError => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
        }
        Mode::Malformed => return (StatusCode::OK, "<html>not json</html>").into_response(),
        Mode::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Mode::Normal => {}
    }

    let results: Vec<Value> = match &name {
        Some(name) => {
            let needle = name.to_lowercase();
            fake.characters
                .iter()
                .filter(|c| {
                    c["name"]
                        .as_str()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect()
        }
        None => fake.characters.as_ref().clone(),
    };

    if results.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "There is nothing here" })),
        )
            .into_response();
    }

    Json(json!({
        "info": {"count": results.len(), "pages": 1, "next": null, "prev": null},
        "results": results,
    }))
    .into_response()
}

pub fn http_client(endpoint: &str, timeout_secs: Option<u64>) -> CatalogClient {
    let config = ApiConfig {
        endpoint: endpoint.to_string(),
        timeout_secs,
        ..ApiConfig::default()
    };
    CatalogClient::new(Arc::new(HttpCatalogSource::new(&config).unwrap()))
}

pub fn presenter_for(client: CatalogClient) -> ListPresenter {
    ListPresenter::new(client, MessagesConfig::default())
}

pub fn names(set: &[catalog_cli::data::Character]) -> Vec<String> {
    set.iter().map(|c| c.name.clone()).collect()
}

type Reply = Result<ApiResponse, CatalogError>;

/// Source whose fetches stay pending until the test answers them, in call order
#[derive(Default)]
pub struct ScriptedSource {
    pending: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<CatalogQuery>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply slot for the next fetch
    pub fn next_reply(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<CatalogQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch(&self, query: &CatalogQuery) -> Result<ApiResponse, CatalogError> {
        self.calls.lock().unwrap().push(query.clone());
        let reply = self.pending.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(CatalogError::Client("reply dropped".to_string()))),
            None => Err(CatalogError::Client("unexpected fetch".to_string())),
        }
    }
}

pub fn listing(names: &[&str]) -> ApiResponse {
    let results = names
        .iter()
        .enumerate()
        .map(|(i, name)| serde_json::from_value(json!({ "id": i + 1, "name": name })).unwrap())
        .collect();
    ApiResponse {
        info: None,
        results,
    }
}
