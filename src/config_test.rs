use std::sync::Mutex;

use super::*;

// Env mutation is process-global; every test that touches it holds this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// # Safety
/// Caller must hold `ENV_LOCK`.
unsafe fn clear_client_env() {
    unsafe {
        std::env::remove_var("API_URL");
        std::env::remove_var("APP_NAME");
        std::env::remove_var("VERSION");
        std::env::remove_var("NUTRIZULIA_ADMIN_LOGIN");
        std::env::remove_var("NUTRIZULIA_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("NUTRIZULIA_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("NUTRIZULIA_STORE_PATH");
    }
}

// =============================================================================
// from_env
// =============================================================================

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_client_env() };

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.app_name, "NutriZulia");
    assert_eq!(cfg.version, "1.0.0");
    assert!(!cfg.admin_login);
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 30, connect_secs: 10 });
    assert_eq!(cfg.store_path, PathBuf::from(DEFAULT_STORE_PATH));
}

#[test]
fn from_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_client_env();
        std::env::set_var("API_URL", "https://nutrizulia-backend.onrender.com/");
        std::env::set_var("APP_NAME", "NutriZulia Admin");
        std::env::set_var("VERSION", "2.3.0");
        std::env::set_var("NUTRIZULIA_ADMIN_LOGIN", "yes");
        std::env::set_var("NUTRIZULIA_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("NUTRIZULIA_CONNECT_TIMEOUT_SECS", "2");
        std::env::set_var("NUTRIZULIA_STORE_PATH", "/tmp/nz.json");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.api_url, "https://nutrizulia-backend.onrender.com");
    assert_eq!(cfg.app_name, "NutriZulia Admin");
    assert_eq!(cfg.version, "2.3.0");
    assert!(cfg.admin_login);
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/nz.json"));

    unsafe { clear_client_env() };
}

#[test]
fn from_env_bad_timeout_falls_back() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_client_env();
        std::env::set_var("NUTRIZULIA_REQUEST_TIMEOUT_SECS", "soon");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_client_env() };
}

#[test]
fn from_env_rejects_bad_api_url() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_client_env();
        std::env::set_var("API_URL", "not a url");
    }

    let err = ClientConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("invalid API_URL"));

    unsafe { clear_client_env() };
}

#[test]
fn env_bool_variants() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let key = "__NZ_TEST_ENV_BOOL__";
    for (val, expected) in [("1", Some(true)), ("On", Some(true)), ("off", Some(false)), ("maybe", None)] {
        unsafe { std::env::set_var(key, val) };
        assert_eq!(env_bool(key), expected, "value {val:?}");
    }
    unsafe { std::env::remove_var(key) };
    assert_eq!(env_bool(key), None);
}

// =============================================================================
// URL building
// =============================================================================

#[test]
fn new_rejects_non_http_scheme() {
    assert!(ClientConfig::new("ftp://example.test").is_err());
}

#[test]
fn api_url_for_joins_prefix() {
    let cfg = ClientConfig::new("http://localhost:8080/").unwrap();
    assert_eq!(cfg.api_url_for("/auth/sign-in"), "http://localhost:8080/api/v1/auth/sign-in");
}

#[test]
fn replace_params_substitutes_each_key() {
    let out = replace_params("/user/:id/institution/:inst", &[("id", "7"), ("inst", "42")]);
    assert_eq!(out, "/user/7/institution/42");
}

#[test]
fn api_url_with_params_builds_full_url() {
    let cfg = ClientConfig::new("http://api.test").unwrap();
    let url = cfg.api_url_with_params("/user/detail/:id", &[("id", "3")]);
    assert_eq!(url, "http://api.test/api/v1/user/detail/3");
}

#[test]
fn timeouts_convert_to_durations() {
    let t = Timeouts { request_secs: 3, connect_secs: 1 };
    assert_eq!(t.request(), Duration::from_secs(3));
    assert_eq!(t.connect(), Duration::from_secs(1));
}

#[test]
fn set_api_url_normalizes() {
    let mut config = ClientConfig::new("http://localhost:8080").unwrap();
    config.set_api_url("https://api.nutrizulia.test/").unwrap();
    assert_eq!(config.api_url, "https://api.nutrizulia.test");
    assert!(config.set_api_url("ftp://x").is_err());
    assert_eq!(config.api_url, "https://api.nutrizulia.test");
}
