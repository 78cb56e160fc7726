//! Managed resource types

pub mod bucket;
pub mod database;
pub mod dns_record;
pub mod security_group;
pub mod virtual_server;
