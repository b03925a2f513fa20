//! Code Pipeline Deploy Library
//!
//! Deploys Code Pipeline tasks through the CES REST API and follows the
//! resulting set until it settles.

pub mod app;
pub mod authn;
pub mod deploy;
pub mod errors;
pub mod http;
pub mod logs;
pub mod outputs;
pub mod utils;
pub mod workers;
