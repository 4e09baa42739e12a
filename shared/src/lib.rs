//! Re-exports the pieces shared by the campaign services: configuration
//! handling, the Ads API wire model, the error type for remote calls and the
//! HTTP client talking to the platform.

pub mod ads_client;
pub mod config;
pub mod dto;
pub mod error;
