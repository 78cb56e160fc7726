//! Read-only data sources

pub mod virtual_servers;
