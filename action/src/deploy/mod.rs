//! Deploy module

pub mod invoker;
pub mod params;
pub mod request;
pub mod response;
pub mod set_state;
