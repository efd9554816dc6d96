//! etuition-http - reqwest-backed client for the eTuition marketplace backend.
//!
//! [`AuthenticatedClient`] attaches the session credential and logs the
//! session out on 401/403, [`HttpRoleResolver`] looks roles up through it,
//! and [`MarketplaceApi`] types the backend's routes.

mod api;
mod client;
mod config;
pub mod endpoints;
pub mod models;
mod resolver;

pub use api::MarketplaceApi;
pub use client::{ApiResponse, AuthenticatedClient, PublicClient, RequestOptions};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use resolver::HttpRoleResolver;

pub use reqwest::Method;
