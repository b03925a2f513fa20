//! Workers running after the deploy is submitted

pub mod poller;
