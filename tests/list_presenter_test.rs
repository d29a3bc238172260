//! List presenter scenarios: view-state transitions, messages and races

mod common;

use catalog_cli::api_client::{CatalogError, CatalogQuery};
use catalog_cli::config::config::MessagesConfig;
use catalog_cli::services::CatalogClient;
use common::{http_client, listing, names, presenter_for, FakeCatalog, Mode, ScriptedSource};
use crossterm::event::KeyCode;

#[tokio::test]
async fn test_loaded_pair_scenario() {
    let fake = FakeCatalog::new(&["Rick Sanchez", "Morty Smith"]);
    let presenter = presenter_for(http_client(&fake.spawn().await, None));

    presenter.load_initial().await;

    let view = presenter.snapshot();
    assert_eq!(names(&view.characters), vec!["Rick Sanchez", "Morty Smith"]);
    assert!(view.has_characters);
    assert_eq!(view.error_message, "");
    assert!(!view.loading);
}

#[tokio::test]
async fn test_search_not_found_scenario() {
    let fake = FakeCatalog::new(&["Rick Sanchez", "Morty Smith"]);
    let presenter = presenter_for(http_client(&fake.spawn().await, None));
    presenter.load_initial().await;
    let before = presenter.characters().get();

    presenter.set_search_term("zzz");
    presenter.submit_search().await;

    assert_eq!(presenter.characters().get(), before);
    assert_eq!(
        presenter.error_message(),
        MessagesConfig::default().search_not_found
    );
    assert!(!presenter.loading());
}

#[tokio::test]
async fn test_search_server_failures_use_generic_message() {
    let fake = FakeCatalog::new(&["Rick Sanchez"]);
    let presenter = presenter_for(http_client(&fake.spawn().await, None));
    let messages = MessagesConfig::default();

    fake.set_mode(Mode::ServerError);
    presenter.set_search_term("rick");
    presenter.submit_search().await;
    assert_eq!(presenter.error_message(), messages.search_failed);

    fake.set_mode(Mode::Malformed);
    presenter.submit_search().await;
    assert_eq!(presenter.error_message(), messages.search_failed);

    fake.set_mode(Mode::ServerError);
    presenter.load_initial().await;
    assert_eq!(presenter.error_message(), messages.load_failed);
}

#[tokio::test]
async fn test_initial_load_timeout_scenario() {
    let fake = FakeCatalog::new(&["Rick Sanchez"]);
    fake.set_mode(Mode::Hang);
    let presenter = presenter_for(http_client(&fake.spawn().await, Some(1)));

    presenter.on_activate().await;

    assert!(!presenter.loading());
    assert_eq!(
        presenter.error_message(),
        MessagesConfig::default().load_failed
    );
    assert!(presenter.characters().get().is_empty());
    assert!(!presenter.has_characters());
}

#[tokio::test]
async fn test_loading_rises_and_falls_on_success() {
    let source = ScriptedSource::new();
    let presenter = presenter_for(CatalogClient::new(source.clone()));
    let reply = source.next_reply();
    let mut loading = presenter.loading_view();
    assert!(!loading.get());

    let p = presenter.clone();
    let task = tokio::spawn(async move { p.load_initial().await });

    assert!(loading.changed().await);
    assert!(loading.get());
    assert_eq!(presenter.error_message(), "");

    reply.send(Ok(listing(&["Rick Sanchez", "Morty Smith"]))).unwrap();
    task.await.unwrap();

    assert!(!presenter.loading());
    assert_eq!(
        names(&presenter.characters().get()),
        vec!["Rick Sanchez", "Morty Smith"]
    );
}

#[tokio::test]
async fn test_loading_falls_on_failure_and_error_resets_on_retry() {
    let source = ScriptedSource::new();
    let presenter = presenter_for(CatalogClient::new(source.clone()));

    let first = source.next_reply();
    first.send(Err(CatalogError::NotFound)).unwrap();
    presenter.set_search_term("zzz");
    presenter.submit_search().await;
    assert!(!presenter.loading());
    assert!(!presenter.error_message().is_empty());

    let second = source.next_reply();
    let p = presenter.clone();
    let task = tokio::spawn(async move { p.load_initial().await });
    let mut loading = presenter.loading_view();
    loading.mark_seen();
    assert!(loading.changed().await);
    assert!(loading.get());
    assert_eq!(presenter.error_message(), "");

    second.send(Ok(listing(&["Summer Smith"]))).unwrap();
    task.await.unwrap();
    assert!(!presenter.loading());
    assert_eq!(presenter.error_message(), "");
}

#[tokio::test]
async fn test_last_completed_fetch_wins() {
    let source = ScriptedSource::new();
    let presenter = presenter_for(CatalogClient::new(source.clone()));
    let slow = source.next_reply();
    let fast = source.next_reply();

    presenter.set_search_term("rick");
    let p = presenter.clone();
    let first = tokio::spawn(async move { p.submit_search().await });
    tokio::task::yield_now().await;

    presenter.set_search_term("morty");
    let p = presenter.clone();
    let second = tokio::spawn(async move { p.submit_search().await });
    tokio::task::yield_now().await;

    assert_eq!(
        source.calls(),
        vec![
            CatalogQuery::ByName("rick".to_string()),
            CatalogQuery::ByName("morty".to_string()),
        ]
    );

    // The later request finishes first; loading drops while the other is in flight
    fast.send(Ok(listing(&["Morty Smith"]))).unwrap();
    second.await.unwrap();
    assert!(!presenter.loading());
    assert_eq!(names(&presenter.characters().get()), vec!["Morty Smith"]);

    slow.send(Ok(listing(&["Rick Sanchez"]))).unwrap();
    first.await.unwrap();
    assert_eq!(names(&presenter.characters().get()), vec!["Rick Sanchez"]);
    assert!(!presenter.loading());
}

#[tokio::test]
async fn test_only_enter_submits() {
    let source = ScriptedSource::new();
    let presenter = presenter_for(CatalogClient::new(source.clone()));

    for key in [KeyCode::Char('a'), KeyCode::Backspace, KeyCode::Left, KeyCode::F(5)] {
        presenter.handle_key(key).await;
    }
    assert!(source.calls().is_empty());

    source.next_reply().send(Ok(listing(&["Rick Sanchez"]))).unwrap();
    presenter.set_search_term("rick");
    presenter.handle_key(KeyCode::Enter).await;
    assert_eq!(source.calls(), vec![CatalogQuery::ByName("rick".to_string())]);
}

#[tokio::test]
async fn test_custom_messages_are_used() {
    let source = ScriptedSource::new();
    let messages = MessagesConfig {
        load_failed: "load broke".to_string(),
        search_not_found: "nobody".to_string(),
        search_failed: "search broke".to_string(),
    };
    let presenter = catalog_cli::ui::list_presenter::ListPresenter::new(
        CatalogClient::new(source.clone()),
        messages,
    );

    source.next_reply().send(Err(CatalogError::NotFound)).unwrap();
    presenter.submit_search().await;
    assert_eq!(presenter.error_message(), "nobody");

    source.next_reply().send(Err(CatalogError::NotFound)).unwrap();
    presenter.load_initial().await;
    assert_eq!(presenter.error_message(), "load broke");
}
