use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;

use super::*;
use crate::api::error::MSG_INVALID_CREDENTIALS;
use crate::auth::form::{CedulaType, LoginField};
use crate::auth::session::SessionPhase;
use crate::routes::Page;
use crate::test_support::{
    config_for, envelope, fresh_token, memory_store, sample_user, spawn_stub, unreachable_config,
};
use crate::ui::notification::NotificationKind;

/// Stub API that accepts only `V-12345678` / `test123`.
async fn stub_api() -> String {
    let token = fresh_token();
    let router = Router::new()
        .route(
            "/api/v1/auth/sign-in",
            post(move |Json(body): Json<serde_json::Value>| {
                let token = token.clone();
                async move {
                    if body["cedula"] == "V-12345678" && body["clave"] == "test123" {
                        let data = serde_json::json!({
                            "token": token,
                            "type": "Bearer",
                            "user": serde_json::to_value(sample_user()).unwrap(),
                        });
                        (StatusCode::OK, Json(envelope(200, "ok", Some(data))))
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(envelope(401, "", None)))
                    }
                }
            }),
        )
        .route("/api/v1/auth/logout", post(|| async { Json(envelope(200, "ok", None)) }));
    spawn_stub(router).await
}

fn valid_form() -> LoginForm {
    LoginForm::new(CedulaType::V, "12345678", "test123")
}

#[tokio::test]
async fn login_navigates_to_dashboard() {
    let origin = stub_api().await;
    let app = App::new(config_for(&origin), memory_store()).unwrap();

    let resolved = app.login(&mut valid_form(), None).await.unwrap();
    assert_eq!(resolved.page, Page::Dashboard);
    assert_eq!(app.location().map(|l| l.url), Some("/dashboard".to_owned()));
    assert_eq!(app.gateway().phase(), SessionPhase::Authenticated);
    assert!(!app.notifications().has_notification());
}

#[tokio::test]
async fn login_honors_preserved_return_url() {
    let origin = stub_api().await;
    let app = App::new(config_for(&origin), memory_store()).unwrap();

    let at_login = app.navigate("/users").unwrap();
    assert_eq!(at_login.page, Page::Login);
    let return_url = app.pending_return_url();
    assert_eq!(return_url.as_deref(), Some("/users"));

    let resolved = app.login(&mut valid_form(), return_url.as_deref()).await.unwrap();
    assert_eq!(resolved.page, Page::Users);
    assert_eq!(resolved.url, "/users");
}

#[tokio::test]
async fn foreign_return_url_is_ignored() {
    let origin = stub_api().await;
    let app = App::new(config_for(&origin), memory_store()).unwrap();

    let resolved = app.login(&mut valid_form(), Some("https://evil.test/")).await.unwrap();
    assert_eq!(resolved.page, Page::Dashboard);
}

#[tokio::test]
async fn rejected_login_notifies_and_flags_fields() {
    let origin = stub_api().await;
    let app = App::new(config_for(&origin), memory_store()).unwrap();
    let mut form = LoginForm::new(CedulaType::V, "12345678", "wrong");

    let err = app.login(&mut form, None).await.unwrap_err();
    assert!(matches!(err, LoginFailure::Rejected(ref e) if e.is_authentication()));

    let notification = app.notifications().current().unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.message, MSG_INVALID_CREDENTIALS);
    assert!(form.is_invalid(LoginField::Numero));
    assert!(form.is_invalid(LoginField::Clave));
    assert!(!app.gateway().session().is_authenticated());
    assert!(app.location().is_none());
}

#[tokio::test]
async fn invalid_form_sends_nothing() {
    let app = App::new(unreachable_config(), memory_store()).unwrap();
    let mut form = LoginForm::new(CedulaType::V, "", "test123");

    let err = app.login(&mut form, None).await.unwrap_err();
    let LoginFailure::Invalid(errors) = err else { panic!("expected validation failure") };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, LoginField::Numero);
    assert!(app.gateway().session().error().is_none());
}

#[tokio::test]
async fn connectivity_failure_does_not_flag_fields() {
    let app = App::new(unreachable_config(), memory_store()).unwrap();
    let mut form = valid_form();

    let err = app.login(&mut form, None).await.unwrap_err();
    assert!(matches!(err, LoginFailure::Rejected(ref e) if e.is_connectivity()));
    assert!(!form.is_invalid(LoginField::Clave));
    assert!(app.notifications().has_notification());
}

#[tokio::test]
async fn logout_lands_on_login() {
    let origin = stub_api().await;
    let app = App::new(config_for(&origin), memory_store()).unwrap();
    app.login(&mut valid_form(), None).await.unwrap();

    let ack = app.logout().await.unwrap();
    assert!(ack.remote_acknowledged);
    assert_eq!(app.location().map(|l| l.page), Some(Page::Login));
    assert!(!app.gateway().session().is_authenticated());
}

#[tokio::test]
async fn session_survives_restart_on_shared_storage() {
    let origin = stub_api().await;
    let storage = memory_store();
    let first = App::new(config_for(&origin), Arc::clone(&storage)).unwrap();
    first.login(&mut valid_form(), None).await.unwrap();

    let second = App::new(config_for(&origin), storage).unwrap();
    assert!(second.gateway().session().is_authenticated());
    assert_eq!(second.navigate("/").unwrap().page, Page::Dashboard);
}

#[tokio::test(start_paused = true)]
async fn navigation_shows_route_preloader() {
    let app = App::new(unreachable_config(), memory_store()).unwrap();
    app.navigate("/dashboard").unwrap();
    // Still inside the minimum display window.
    assert!(app.preloader().is_loading());

    tokio::time::sleep(std::time::Duration::from_millis(301)).await;
    assert!(!app.preloader().is_loading());
}

#[test]
fn login_route_skips_preloader() {
    let app = App::new(unreachable_config(), memory_store()).unwrap();
    app.navigate("/login").unwrap();
    assert!(!app.preloader().is_loading());
}
