//! Loading indicator bookkeeping.
//!
//! DESIGN
//! ======
//! Shows are counted: the indicator stays up until every `show` has been
//! matched by a `hide`. Once visible it stays up for at least
//! `min_display` to avoid flashes, and a safety timer force-hides it after
//! `max_display` if some caller never releases it.
//!
//! Timers are tokio tasks. Each one is aborted before its slot is re-armed,
//! and a firing hide timer re-checks the counter under the lock so a late
//! show always wins. Without a runtime, hides happen immediately and the
//! safety timer is not armed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;

pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_millis(300);
pub const DEFAULT_MAX_DISPLAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderKind {
    Route,
    Http,
    #[default]
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreloaderState {
    pub is_loading: bool,
    pub loading_count: u32,
    pub message: Option<String>,
    pub kind: LoaderKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloaderConfig {
    pub min_display: Duration,
    pub max_display: Duration,
    pub show_on_route_change: bool,
    pub show_on_http_requests: bool,
    pub excluded_routes: Vec<String>,
    pub excluded_http_urls: Vec<String>,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            min_display: DEFAULT_MIN_DISPLAY,
            max_display: DEFAULT_MAX_DISPLAY,
            show_on_route_change: true,
            show_on_http_requests: true,
            excluded_routes: vec!["/login".to_owned()],
            excluded_http_urls: vec!["/api/health".to_owned()],
        }
    }
}

#[derive(Default)]
struct Timers {
    started_at: Option<Instant>,
    hide: Option<AbortHandle>,
    safety: Option<AbortHandle>,
}

impl Timers {
    fn cancel_hide(&mut self) {
        if let Some(handle) = self.hide.take() {
            handle.abort();
        }
    }

    fn cancel_safety(&mut self) {
        if let Some(handle) = self.safety.take() {
            handle.abort();
        }
    }
}

struct Inner {
    state: watch::Sender<PreloaderState>,
    timers: Mutex<Timers>,
    config: Mutex<PreloaderConfig>,
}

impl Inner {
    fn timers(&self) -> MutexGuard<'_, Timers> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_idle(&self, timers: &mut Timers) {
        timers.cancel_hide();
        timers.cancel_safety();
        timers.started_at = None;
        self.state.send_replace(PreloaderState::default());
    }

    /// Hide timer callback: only hides if nothing was shown in the meantime.
    fn finish_hide(&self) {
        let mut timers = self.timers();
        timers.hide = None;
        if self.state.borrow().loading_count == 0 {
            self.set_idle(&mut timers);
        }
    }

    fn safety_expired(&self) {
        let mut timers = self.timers();
        timers.safety = None;
        if self.state.borrow().is_loading {
            tracing::warn!("preloader exceeded its maximum display time; forcing hide");
            self.set_idle(&mut timers);
        }
    }
}

#[derive(Clone)]
pub struct PreloaderService {
    inner: Arc<Inner>,
}

impl Default for PreloaderService {
    fn default() -> Self {
        Self::new(PreloaderConfig::default())
    }
}

impl PreloaderService {
    #[must_use]
    pub fn new(config: PreloaderConfig) -> Self {
        let (state, _rx) = watch::channel(PreloaderState::default());
        Self {
            inner: Arc::new(Inner { state, timers: Mutex::new(Timers::default()), config: Mutex::new(config) }),
        }
    }

    /// Show the indicator, or bump the counter if it is already up.
    pub fn show(&self, message: Option<String>, kind: LoaderKind) {
        let mut timers = self.inner.timers();
        timers.cancel_hide();

        let count = self.inner.state.borrow().loading_count + 1;
        if timers.started_at.is_none() {
            timers.started_at = Some(Instant::now());
            let max_display = self.config().max_display;
            timers.cancel_safety();
            timers.safety = self.spawn_after(max_display, Inner::safety_expired);
        }

        self.inner.state.send_replace(PreloaderState { is_loading: true, loading_count: count, message, kind });
    }

    /// Release one show. The indicator goes away when the counter reaches
    /// zero (or immediately on `force`), after the minimum display time.
    pub fn hide(&self, force: bool) {
        let mut timers = self.inner.timers();
        let count = self.inner.state.borrow().loading_count;
        if count == 0 && !force {
            return;
        }

        let remaining_count = if force { 0 } else { count - 1 };
        self.inner.state.send_modify(|s| s.loading_count = remaining_count);
        if remaining_count > 0 {
            return;
        }

        let min_display = self.config().min_display;
        let elapsed = timers.started_at.map_or(Duration::ZERO, |t| t.elapsed());
        let remaining = min_display.saturating_sub(elapsed);
        if remaining.is_zero() {
            self.inner.set_idle(&mut timers);
            return;
        }

        timers.cancel_hide();
        timers.hide = self.spawn_after(remaining, Inner::finish_hide);
        if timers.hide.is_none() {
            self.inner.set_idle(&mut timers);
        }
    }

    /// Hide now, ignoring the counter and the minimum display time.
    pub fn force_hide(&self) {
        let mut timers = self.inner.timers();
        self.inner.set_idle(&mut timers);
    }

    #[must_use]
    pub fn state(&self) -> PreloaderState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PreloaderState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn is_route_excluded(&self, route: &str) -> bool {
        self.config().excluded_routes.iter().any(|r| route.contains(r.as_str()))
    }

    #[must_use]
    pub fn is_http_url_excluded(&self, url: &str) -> bool {
        self.config().excluded_http_urls.iter().any(|u| url.contains(u.as_str()))
    }

    #[must_use]
    pub fn config(&self) -> PreloaderConfig {
        self.inner.config.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn update_config(&self, f: impl FnOnce(&mut PreloaderConfig)) {
        f(&mut self.inner.config.lock().unwrap_or_else(PoisonError::into_inner));
    }

    fn spawn_after(&self, delay: Duration, action: fn(&Inner)) -> Option<AbortHandle> {
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let inner = Arc::clone(&self.inner);
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            action(&inner);
        });
        Some(task.abort_handle())
    }
}

#[cfg(test)]
#[path = "preloader_test.rs"]
mod tests;
