//! Relative API endpoints. Join with `ClientConfig::api_url_for`.
//!
//! Only the `auth` group is called by this crate. The `user` and `catalog`
//! groups complete the server's catalog for the screens built on top of it.

/// Versioned prefix every endpoint lives under.
pub const API_PREFIX: &str = "/api/v1";

pub mod auth {
    pub const LOGIN: &str = "/auth/sign-in";
    pub const LOGIN_ADMIN: &str = "/auth/sign-in-admin";
    pub const LOGOUT: &str = "/auth/logout";
    pub const FORGOT_PASSWORD: &str = "/auth/forgot-password";
    pub const CHANGE_PASSWORD: &str = "/auth/change-password";
    pub const CHECK_AUTH: &str = "/auth/check";
}

pub mod user {
    pub const INSTITUTIONS_USER: &str = "/user/institutions-by-user";
    pub const GET_ALL: &str = "/user/get-all";
    pub const WITH_INSTITUTIONS: &str = "/user/get-all/institutions";
    pub const CREATE: &str = "/user/create";
    pub const CHECK_CEDULA: &str = "/user/check-cedula";
    pub const CHECK_EMAIL: &str = "/user/check-email";
    pub const CHECK_PHONE: &str = "/user/check-phone";
    pub const GET_DETAIL: &str = "/user/detail";
    pub const UPDATE: &str = "/user/update";
    pub const ASSIGN_INSTITUTION: &str = "/user/assign-institution";
    pub const UPDATE_INSTITUTION: &str = "/user/update-institution";
    pub const REMOVE_INSTITUTION: &str = "/user/remove-institution";
    pub const HISTORY: &str = "/user/history";
}

pub mod catalog {
    pub const STATES: &str = "/catalog/states";
    pub const HEALTH_MUNICIPALITIES: &str = "/catalog/health-municipalities";
    pub const INSTITUTIONS: &str = "/catalog/institutions";
    pub const INSTITUTION_TYPES: &str = "/catalog/institution-types";
    pub const ROLES: &str = "/catalog/roles";
}
