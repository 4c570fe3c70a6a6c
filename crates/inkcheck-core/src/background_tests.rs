use super::*;
use crate::injector::AgentInjector;
use crate::testing::{CountingHandler, FakeMenuHost, FakePages, RecordingNotifier, router};
use chrono::NaiveDate;
use inkcheck_config::{InjectionConfig, OrchestratorConfig};
use inkcheck_protocols::{ContextId, Counters, FixedClock, Mode, Settings, StatsEvent};
use inkcheck_storage::{MemoryStore, load_counters};
use serde_json::json;
use std::time::Duration;

struct Fixture {
    service: Arc<BackgroundService>,
    store: Arc<MemoryStore>,
    menu_host: Arc<FakeMenuHost>,
    notifier: Arc<RecordingNotifier>,
    router: MessageRouter,
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn fixture(store: MemoryStore) -> Fixture {
    let store = Arc::new(store);
    let router = router();
    let menu_host = Arc::new(FakeMenuHost::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let pages = Arc::new(FakePages::default());
    let clock = Arc::new(FixedClock::new(day(3)));

    let counters = Arc::new(CountersStore::new(store.clone(), clock, router.clone()));
    let injector = AgentInjector::new(pages, router.clone(), InjectionConfig::default());
    let orchestrator = Orchestrator::new(
        store.clone(),
        injector,
        router.clone(),
        notifier.clone(),
        OrchestratorConfig::default(),
    );
    let service = Arc::new(BackgroundService::new(
        store.clone(),
        router.clone(),
        MenuManager::new(menu_host.clone()),
        counters,
        orchestrator,
    ));

    Fixture {
        service,
        store,
        menu_host,
        notifier,
        router,
    }
}

fn stored(value: serde_json::Value) -> MemoryStore {
    MemoryStore::with_entries(value.as_object().cloned().unwrap())
}

#[tokio::test]
async fn test_install_populates_defaults_and_builds_menu() {
    let f = fixture(MemoryStore::new());

    let state = f.service.on_installed(InstallReason::Install).await.unwrap();

    assert_eq!(state, MenuState::MenuForMode(Mode::CheckText));
    assert_eq!(f.menu_host.ids(), vec!["aiTextChecker".to_string()]);

    let settings = load_settings(f.store.as_ref()).await.unwrap();
    assert_eq!(settings, Settings::default());
    let raw = f.store.get(keys::SETTINGS).await.unwrap();
    assert_eq!(raw.len(), keys::SETTINGS.len());
}

#[tokio::test]
async fn test_install_keeps_existing_values() {
    let f = fixture(stored(json!({"apiKey": "k-1", "mode": "prompt-convert"})));

    let state = f.service.on_installed(InstallReason::Install).await.unwrap();

    assert_eq!(state, MenuState::MenuForMode(Mode::ConvertPrompt));
    let settings = load_settings(f.store.as_ref()).await.unwrap();
    assert_eq!(settings.api_key, "k-1");
    assert_eq!(settings.mode, Mode::ConvertPrompt);
}

#[tokio::test]
async fn test_update_does_not_write_defaults() {
    let f = fixture(stored(json!({"enabled": false})));

    let state = f.service.on_installed(InstallReason::Update).await.unwrap();

    assert_eq!(state, MenuState::NoMenu);
    let raw = f.store.get(keys::SETTINGS).await.unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(f.menu_host.removals.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_startup_applies_rollover() {
    let f = fixture(stored(json!({
        "todayChecks": 8,
        "totalChecks": 30,
        "totalIssues": 4,
        "lastStatsDate": "2024-06-01"
    })));

    f.service.on_startup().await.unwrap();

    let counters = load_counters(f.store.as_ref()).await.unwrap();
    assert_eq!(
        counters,
        Counters {
            daily_count: 0,
            total_count: 30,
            total_issues_found: 4,
            last_rollover_date: Some(day(3)),
        }
    );
    assert_eq!(f.service.menu_state().await, MenuState::MenuForMode(Mode::CheckText));
}

#[tokio::test]
async fn test_mode_change_rebuilds_menu() {
    let f = fixture(MemoryStore::new());
    f.service.on_installed(InstallReason::Install).await.unwrap();

    let mut changes = f.store.subscribe();
    f.store
        .set(json!({"mode": "prompt-convert"}).as_object().cloned().unwrap())
        .await
        .unwrap();
    let change = changes.recv().await.unwrap();

    f.service.on_storage_changed(&change).await.unwrap();

    assert_eq!(f.menu_host.ids(), vec!["midjourneyPrompt".to_string()]);
    assert_eq!(
        f.service.menu_state().await,
        MenuState::MenuForMode(Mode::ConvertPrompt)
    );
}

#[tokio::test]
async fn test_settings_change_is_pushed_to_every_page() {
    let f = fixture(MemoryStore::new());
    let first = Arc::new(CountingHandler::default());
    let second = Arc::new(CountingHandler::default());
    let _a = f.router.register(Endpoint::Page(ContextId(1)), first.clone());
    let _b = f.router.register(Endpoint::Page(ContextId(2)), second.clone());

    let mut changes = f.store.subscribe();
    f.store
        .set(json!({"learningEnabled": false}).as_object().cloned().unwrap())
        .await
        .unwrap();
    let change = changes.recv().await.unwrap();
    f.service.on_storage_changed(&change).await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    for agent in [&first, &second] {
        assert_eq!(
            agent.requests.lock().as_slice(),
            &[Request::SettingsChanged {
                changed_keys: vec!["learningEnabled".to_string()]
            }]
        );
    }
    // Not a menu key.
    assert_eq!(f.menu_host.removals.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_counter_writes_are_not_broadcast() {
    let f = fixture(MemoryStore::new());
    let agent = Arc::new(CountingHandler::default());
    let _reg = f.router.register(Endpoint::Page(ContextId(1)), agent.clone());

    let mut changes = f.store.subscribe();
    f.service
        .counters()
        .record_event(StatsEvent::CheckCompleted, 1)
        .await
        .unwrap();
    let change = changes.recv().await.unwrap();
    f.service.on_storage_changed(&change).await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(agent.calls(), 0);
}

#[tokio::test]
async fn test_watcher_follows_store_changes() {
    let f = fixture(MemoryStore::new());
    f.service.on_installed(InstallReason::Install).await.unwrap();
    let watcher = f.service.spawn_storage_watcher();

    f.store
        .set(json!({"enabled": false}).as_object().cloned().unwrap())
        .await
        .unwrap();

    let mut state = f.service.menu_state().await;
    for _ in 0..50 {
        if state == MenuState::NoMenu {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        state = f.service.menu_state().await;
    }
    assert_eq!(state, MenuState::NoMenu);
    assert!(f.menu_host.ids().is_empty());

    watcher.abort();
}

#[tokio::test]
async fn test_foreign_menu_click_is_ignored() {
    let f = fixture(MemoryStore::new());
    let click = MenuClick {
        menu_item_id: "someoneElse".to_string(),
        selection_text: Some("plenty of selected text".to_string()),
        page: ContextId(4),
    };

    assert!(f.service.on_menu_click(&click).await.is_none());
    assert!(f.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_menu_click_on_closed_page_is_reported() {
    let f = fixture(MemoryStore::new());
    let click = MenuClick {
        menu_item_id: "aiTextChecker".to_string(),
        selection_text: Some("plenty of selected text".to_string()),
        page: ContextId(4),
    };

    let result = f.service.on_menu_click(&click).await.unwrap();

    assert!(result.is_err());
    assert_eq!(f.notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_update_stats_request_returns_counters() {
    let f = fixture(MemoryStore::new());
    let _reg = f.service.register();

    let reply = f
        .router
        .request(
            Endpoint::Page(ContextId(9)),
            Endpoint::Background,
            Request::UpdateStats {
                event: StatsEvent::CheckCompleted,
                issues_found: 2,
            },
        )
        .await
        .unwrap();

    let Response::Stats { counters } = reply else {
        panic!("expected stats reply");
    };
    assert_eq!(counters.daily_count, 1);
    assert_eq!(counters.total_issues_found, 2);
}

#[tokio::test]
async fn test_get_settings_request() {
    let f = fixture(stored(json!({"apiKey": "abc", "minLength": 25})));
    let _reg = f.service.register();

    let reply = f
        .router
        .request(Endpoint::SettingsUi, Endpoint::Background, Request::GetSettings)
        .await
        .unwrap();

    let Response::Settings { settings } = reply else {
        panic!("expected settings reply");
    };
    assert_eq!(settings.api_key, "abc");
    assert_eq!(settings.min_selection_length, 25);
}

#[tokio::test]
async fn test_background_rejects_page_commands() {
    let f = fixture(MemoryStore::new());
    let _reg = f.service.register();

    let err = f
        .router
        .request(Endpoint::SettingsUi, Endpoint::Background, Request::Ping)
        .await
        .unwrap_err();

    assert!(matches!(err, RouterError::Unsupported { .. }));
}
