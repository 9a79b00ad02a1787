use super::*;

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// =============================================================================
// Counting
// =============================================================================

#[tokio::test(start_paused = true)]
async fn show_sets_loading_state() {
    let preloader = PreloaderService::default();
    preloader.show(Some("Cargando".into()), LoaderKind::Route);

    let state = preloader.state();
    assert!(state.is_loading);
    assert_eq!(state.loading_count, 1);
    assert_eq!(state.message.as_deref(), Some("Cargando"));
    assert_eq!(state.kind, LoaderKind::Route);
}

#[tokio::test(start_paused = true)]
async fn stays_visible_until_every_show_is_released() {
    let preloader = PreloaderService::default();
    preloader.show(None, LoaderKind::Http);
    preloader.show(None, LoaderKind::Http);
    sleep_ms(500).await;

    preloader.hide(false);
    assert!(preloader.is_loading());
    assert_eq!(preloader.state().loading_count, 1);

    preloader.hide(false);
    assert!(!preloader.is_loading());
}

#[tokio::test(start_paused = true)]
async fn hide_without_show_is_noop() {
    let preloader = PreloaderService::default();
    preloader.hide(false);
    assert_eq!(preloader.state(), PreloaderState::default());
}

// =============================================================================
// Minimum display time
// =============================================================================

#[tokio::test(start_paused = true)]
async fn quick_hide_waits_for_minimum_display() {
    let preloader = PreloaderService::default();
    preloader.show(None, LoaderKind::Http);
    sleep_ms(100).await;
    preloader.hide(false);

    assert!(preloader.is_loading(), "should stay up for the remaining 200ms");
    sleep_ms(150).await;
    assert!(preloader.is_loading());
    sleep_ms(100).await;
    assert!(!preloader.is_loading());
}

#[tokio::test(start_paused = true)]
async fn show_during_pending_hide_cancels_it() {
    let preloader = PreloaderService::default();
    preloader.show(None, LoaderKind::Http);
    preloader.hide(false);
    preloader.show(None, LoaderKind::Http);

    sleep_ms(1_000).await;
    let state = preloader.state();
    assert!(state.is_loading);
    assert_eq!(state.loading_count, 1);
}

#[tokio::test(start_paused = true)]
async fn force_hide_is_immediate() {
    let preloader = PreloaderService::default();
    preloader.show(None, LoaderKind::Custom);
    preloader.show(None, LoaderKind::Custom);
    preloader.force_hide();
    assert_eq!(preloader.state(), PreloaderState::default());
}

#[tokio::test(start_paused = true)]
async fn forced_hide_ignores_counter_but_respects_minimum() {
    let preloader = PreloaderService::default();
    preloader.show(None, LoaderKind::Custom);
    preloader.show(None, LoaderKind::Custom);
    preloader.hide(true);
    assert_eq!(preloader.state().loading_count, 0);
    sleep_ms(301).await;
    assert!(!preloader.is_loading());
}

// =============================================================================
// Safety timeout
// =============================================================================

#[tokio::test(start_paused = true)]
async fn safety_timeout_hides_leaked_show() {
    let preloader = PreloaderService::default();
    preloader.show(None, LoaderKind::Route);
    sleep_ms(9_999).await;
    assert!(preloader.is_loading());
    sleep_ms(2).await;
    assert!(!preloader.is_loading());
}

#[tokio::test(start_paused = true)]
async fn safety_timer_is_not_rearmed_by_nested_shows() {
    let preloader = PreloaderService::default();
    preloader.show(None, LoaderKind::Route);
    sleep_ms(6_000).await;
    preloader.show(None, LoaderKind::Http);
    sleep_ms(4_001).await;
    assert!(!preloader.is_loading(), "safety deadline counts from the first show");
}

#[tokio::test(start_paused = true)]
async fn released_preloader_does_not_fire_safety_later() {
    let preloader = PreloaderService::default();
    preloader.show(None, LoaderKind::Route);
    sleep_ms(400).await;
    preloader.hide(false);
    assert!(!preloader.is_loading());

    sleep_ms(5_000).await;
    preloader.show(None, LoaderKind::Route);
    sleep_ms(6_000).await;
    assert!(preloader.is_loading(), "old safety timer must have been cancelled");
}

// =============================================================================
// Config and exclusions
// =============================================================================

#[test]
fn exclusions_match_fragments() {
    let preloader = PreloaderService::default();
    assert!(preloader.is_route_excluded("/login?returnUrl=%2Fusers"));
    assert!(!preloader.is_route_excluded("/dashboard"));
    assert!(preloader.is_http_url_excluded("http://api.test/api/health"));
    assert!(!preloader.is_http_url_excluded("http://api.test/api/v1/auth/check"));
}

#[test]
fn update_config_merges() {
    let preloader = PreloaderService::default();
    preloader.update_config(|c| {
        c.min_display = Duration::ZERO;
        c.excluded_routes.push("/help".into());
    });
    let cfg = preloader.config();
    assert_eq!(cfg.min_display, Duration::ZERO);
    assert_eq!(cfg.max_display, DEFAULT_MAX_DISPLAY);
    assert!(preloader.is_route_excluded("/help"));
}

#[test]
fn without_runtime_hide_is_immediate() {
    let preloader = PreloaderService::default();
    preloader.show(None, LoaderKind::Custom);
    preloader.hide(false);
    assert!(!preloader.is_loading());
}
