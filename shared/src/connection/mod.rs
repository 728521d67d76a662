pub mod bandwidth_monitor;
pub mod connection_config;
pub mod connection_state;
pub mod error;
pub mod link_conditioner;
pub mod session_stats;
