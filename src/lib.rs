//! # nutrizulia
//!
//! Client-side session core for the NutriZulia administrative frontend.
//!
//! This crate owns everything between a user-facing surface and the
//! NutriZulia REST API that carries state: the durable token store, the
//! single-writer session holder, the auth gateway, the request authenticator
//! that stamps bearer tokens and reacts to 401s, and the route guards.
//! Around that core sit the API client, the route table, and the small
//! timer-driven UI services (notifications and the preloader).
//!
//! `app::App` is the composition root; `src/main.rs` drives it from the
//! command line.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod routes;
pub mod ui;

#[cfg(test)]
mod test_support;
