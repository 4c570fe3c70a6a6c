use super::*;
use crate::testing::{CountingHandler, router};
use inkcheck_protocols::{ContextId, Counters};
use serde_json::json;

const PAGE: Endpoint = Endpoint::Page(ContextId(7));

#[tokio::test]
async fn test_request_reaches_handler() {
    let router = router();
    let handler = Arc::new(CountingHandler::default());
    let _reg = router.register(PAGE, handler.clone());

    let reply = router
        .request(Endpoint::Background, PAGE, Request::Ping)
        .await
        .unwrap();

    assert_eq!(reply, Response::ready());
    assert_eq!(handler.calls(), 1);
}

#[tokio::test]
async fn test_request_to_unregistered_endpoint() {
    let router = router();
    let err = router
        .request(Endpoint::Background, PAGE, Request::Ping)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RouterError::Transport(TransportError::ConnectionLost(_))
    ));
}

#[tokio::test]
async fn test_handler_error_is_returned_once() {
    let router = router();
    let handler = Arc::new(CountingHandler::default());
    let _reg = router.register(Endpoint::Background, handler.clone());

    let err = router
        .request(Endpoint::SettingsUi, Endpoint::Background, Request::GetSettings)
        .await
        .unwrap_err();

    assert!(matches!(err, RouterError::Unsupported { .. }));
    assert_eq!(handler.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_request_times_out() {
    let router = router();
    let handler = Arc::new(CountingHandler::slow(Duration::from_secs(30)));
    let _reg = router.register(PAGE, handler.clone());

    let err = router
        .request_with_timeout(
            Endpoint::Background,
            PAGE,
            Request::Ping,
            Duration::from_millis(1000),
        )
        .await
        .unwrap_err();

    assert_eq!(err, RouterError::Transport(TransportError::Timeout(1000)));
    assert_eq!(handler.calls(), 1);
}

#[tokio::test]
async fn test_dropped_registration_unbinds() {
    let router = router();
    let reg = router.register(PAGE, Arc::new(CountingHandler::default()));
    assert!(router.is_registered(PAGE));
    assert_eq!(reg.endpoint(), PAGE);

    drop(reg);

    assert!(!router.is_registered(PAGE));
    let err = router
        .request(Endpoint::Background, PAGE, Request::Ping)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RouterError::Transport(TransportError::ConnectionLost(_))
    ));
}

#[tokio::test]
async fn test_replaced_registration_survives_old_guard_drop() {
    let router = router();
    let old = router.register(PAGE, Arc::new(CountingHandler::default()));
    let newer = Arc::new(CountingHandler::default());
    let _new = router.register(PAGE, newer.clone());

    drop(old);

    assert!(router.is_registered(PAGE));
    router
        .request(Endpoint::Background, PAGE, Request::Ping)
        .await
        .unwrap();
    assert_eq!(newer.calls(), 1);
}

#[tokio::test]
async fn test_closed_router_reports_invalidated() {
    let router = router();
    let _reg = router.register(PAGE, Arc::new(CountingHandler::default()));

    router.close();

    let err = router
        .request(Endpoint::Background, PAGE, Request::Ping)
        .await
        .unwrap_err();
    assert_eq!(err, RouterError::Transport(TransportError::ExtensionInvalidated));
    assert_eq!(
        router
            .notify(Endpoint::Background, PAGE, Request::Ping)
            .await
            .unwrap_err(),
        TransportError::ExtensionInvalidated
    );
}

#[tokio::test]
async fn test_notify_delivers_without_reply() {
    let router = router();
    let handler = Arc::new(CountingHandler::default());
    let _reg = router.register(Endpoint::SettingsUi, handler.clone());

    router
        .notify(
            Endpoint::Background,
            Endpoint::SettingsUi,
            Request::StatsUpdated {
                counters: Counters::default(),
            },
        )
        .await
        .unwrap();

    for _ in 0..100 {
        if handler.calls() == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(handler.calls(), 1);
}

#[tokio::test]
async fn test_broadcast_reaches_pages_only() {
    let router = router();
    let a = Arc::new(CountingHandler::default());
    let b = Arc::new(CountingHandler::default());
    let ui = Arc::new(CountingHandler::default());
    let _ra = router.register(Endpoint::Page(ContextId(1)), a.clone());
    let _rb = router.register(Endpoint::Page(ContextId(2)), b.clone());
    let _ru = router.register(Endpoint::SettingsUi, ui.clone());

    let reached = router
        .broadcast_pages(
            Endpoint::Background,
            Request::SettingsChanged {
                changed_keys: vec!["mode".to_string()],
            },
        )
        .await;

    assert_eq!(reached, 2);
    for _ in 0..100 {
        if a.calls() == 1 && b.calls() == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 1);
    assert_eq!(ui.calls(), 0);
}

#[tokio::test]
async fn test_dispatch_raw_unknown_action() {
    let router = router();
    let err = router
        .dispatch_raw(Endpoint::SettingsUi, PAGE, json!({"action": "selfDestruct"}))
        .await
        .unwrap_err();
    assert_eq!(err, RouterError::UnknownCommand("selfDestruct".to_string()));
}

#[tokio::test]
async fn test_dispatch_raw_ping() {
    let router = router();
    let _reg = router.register(PAGE, Arc::new(CountingHandler::default()));

    let reply = router
        .dispatch_raw(Endpoint::Background, PAGE, json!({"action": "ping"}))
        .await
        .unwrap();
    assert_eq!(reply, Some(Response::ready()));
}

#[tokio::test]
async fn test_dispatch_raw_notification_has_no_reply() {
    let router = router();
    let _reg = router.register(PAGE, Arc::new(CountingHandler::default()));

    let reply = router
        .dispatch_raw(
            Endpoint::SettingsUi,
            PAGE,
            json!({"action": "settingsChanged", "changedKeys": ["enabled"]}),
        )
        .await
        .unwrap();
    assert_eq!(reply, None);
}

#[test]
fn test_router_timeouts_from_config() {
    let config = RouterConfig {
        ping_timeout_ms: 250,
        command_timeout_secs: 9,
        mailbox_capacity: 4,
    };
    let router = MessageRouter::new(&config);
    assert_eq!(router.ping_timeout(), Duration::from_millis(250));
    assert_eq!(router.command_timeout(), Duration::from_secs(9));
}
