use std::sync::atomic::{AtomicBool, Ordering};

use super::*;

struct Fixed(AtomicBool);

impl Fixed {
    fn anonymous() -> Self {
        Self(AtomicBool::new(false))
    }

    fn signed_in() -> Self {
        Self(AtomicBool::new(true))
    }
}

impl SessionAuthority for Fixed {
    fn check_auth_status(&self) {}

    fn is_authenticated(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Flips authentication on every check, so guards never settle.
struct Flapping(AtomicBool);

impl SessionAuthority for Flapping {
    fn check_auth_status(&self) {
        self.0.fetch_xor(true, Ordering::SeqCst);
    }

    fn is_authenticated(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[test]
fn table_covers_app_routes() {
    assert_eq!(lookup("/").unwrap().guard, GuardKind::Redirect);
    assert_eq!(lookup("/login").unwrap().page, Some(Page::Login));
    for path in ["/dashboard", "/users", "/institutions", "/reports"] {
        assert_eq!(lookup(path).unwrap().guard, GuardKind::Protected, "{path}");
    }
    assert!(lookup("/nope").is_none());
}

#[test]
fn root_sends_anonymous_user_to_login() {
    let resolved = navigate(&Fixed::anonymous(), "/").unwrap();
    assert_eq!(resolved.page, Page::Login);
    assert_eq!(resolved.url, "/login");
    assert_eq!(resolved.hops, 1);
}

#[test]
fn root_sends_signed_in_user_to_dashboard() {
    let resolved = navigate(&Fixed::signed_in(), "/").unwrap();
    assert_eq!(resolved.page, Page::Dashboard);
    assert_eq!(resolved.url, "/dashboard");
}

#[test]
fn protected_route_preserves_return_url() {
    let resolved = navigate(&Fixed::anonymous(), "/users").unwrap();
    assert_eq!(resolved.page, Page::Login);
    assert_eq!(resolved.url, "/login?returnUrl=%2Fusers");
    assert_eq!(resolved.return_url().as_deref(), Some("/users"));
}

#[test]
fn login_while_signed_in_lands_on_dashboard() {
    let resolved = navigate(&Fixed::signed_in(), "/login").unwrap();
    assert_eq!(resolved.page, Page::Dashboard);
}

#[test]
fn unknown_route_falls_back_through_landing_guard() {
    let resolved = navigate(&Fixed::anonymous(), "/nope").unwrap();
    assert_eq!(resolved.page, Page::Login);
    assert_eq!(resolved.return_url().as_deref(), Some("/dashboard"));

    let resolved = navigate(&Fixed::signed_in(), "/nope").unwrap();
    assert_eq!(resolved.page, Page::Dashboard);
}

#[test]
fn allowed_page_needs_no_hops() {
    let resolved = navigate(&Fixed::signed_in(), "/reports?year=2025").unwrap();
    assert_eq!(resolved.page, Page::Reports);
    assert_eq!(resolved.url, "/reports?year=2025");
    assert_eq!(resolved.hops, 0);
}

#[test]
fn endless_redirects_are_cut_off() {
    let err = navigate(&Flapping(AtomicBool::new(false)), "/login").unwrap_err();
    assert_eq!(err, RouteError::TooManyRedirects { url: "/login".into() });
}

#[test]
fn return_url_accepts_only_app_paths() {
    assert_eq!(return_url_of("/login?returnUrl=%2Fusers").as_deref(), Some("/users"));
    assert_eq!(return_url_of("/login?returnUrl=%2F%2Fevil.test"), None);
    assert_eq!(return_url_of("/login?returnUrl=https%3A%2F%2Fevil.test"), None);
    assert_eq!(return_url_of("/login"), None);
}
