//! Provisioning pipeline and lifecycle actions for ad campaigns.

pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod provisioners;
pub mod routes;
