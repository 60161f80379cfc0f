use super::*;
use crate::test_helpers::{MemoryGateway, session_for};

#[test]
fn new_context_is_loading_and_not_redirecting() {
    let ctx = SessionContext::new();
    let state = ctx.state();
    assert!(state.loading);
    assert!(state.session.is_none());
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn restore_without_session_triggers_redirect() {
    let ctx = SessionContext::new();
    ctx.restore(None);
    assert!(should_redirect_unauth(&ctx.state()));
}

#[test]
fn signed_in_context_exposes_user_and_token() {
    let ctx = SessionContext::signed_in(session_for("u-1"));
    assert_eq!(ctx.user_id().as_deref(), Some("u-1"));
    assert_eq!(ctx.access_token().as_deref(), Some("token-u-1"));
    assert!(!should_redirect_unauth(&ctx.state()));
}

#[test]
fn refresh_requires_a_session() {
    let ctx = SessionContext::new();
    assert!(matches!(ctx.refresh("t".into()), Err(ApiError::NotAuthenticated)));
}

#[test]
fn refresh_replaces_token_and_keeps_user() {
    let ctx = SessionContext::signed_in(session_for("u-1"));
    ctx.refresh("fresh".into()).unwrap();
    let state = ctx.state();
    assert_eq!(state.event, SessionEvent::TokenRefreshed);
    assert_eq!(state.session.unwrap(), Session { user_id: "u-1".into(), access_token: "fresh".into() });
}

#[tokio::test]
async fn subscriber_observes_sign_in() {
    let ctx = SessionContext::new();
    let mut sub = ctx.subscribe();

    ctx.sign_in(session_for("u-2"));

    let state = sub.changed().await.expect("context alive");
    assert_eq!(state.event, SessionEvent::SignedIn);
    assert_eq!(state.session.map(|s| s.user_id).as_deref(), Some("u-2"));
}

#[test]
fn dropping_subscription_unsubscribes() {
    let ctx = SessionContext::new();
    let a = ctx.subscribe();
    let b = ctx.subscribe();
    assert_eq!(ctx.subscriber_count(), 2);
    drop(a);
    assert_eq!(ctx.subscriber_count(), 1);
    drop(b);
    assert_eq!(ctx.subscriber_count(), 0);
}

#[tokio::test]
async fn sign_out_revokes_remotely_and_clears_locally() {
    let gateway = MemoryGateway::new();
    let ctx = SessionContext::signed_in(session_for("u-1"));

    ctx.sign_out(&gateway).await.unwrap();

    assert_eq!(gateway.calls(), vec!["sign_out".to_string()]);
    let state = ctx.state();
    assert_eq!(state.event, SessionEvent::SignedOut);
    assert!(should_redirect_unauth(&state));
}

#[tokio::test]
async fn failed_remote_sign_out_still_clears_session() {
    let gateway = MemoryGateway::new();
    gateway.fail_on("sign_out", "auth");
    let ctx = SessionContext::signed_in(session_for("u-1"));

    let result = ctx.sign_out(&gateway).await;

    assert!(result.is_err());
    assert!(ctx.current().is_none());
}

#[tokio::test]
async fn sign_out_without_session_is_a_no_op() {
    let gateway = MemoryGateway::new();
    let ctx = SessionContext::new();
    ctx.restore(None);
    ctx.sign_out(&gateway).await.unwrap();
    assert!(gateway.calls().is_empty());
}
