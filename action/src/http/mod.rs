//! HTTP client for the CES REST API

pub mod client;
pub mod deployments;
