pub mod configure;
pub mod resolve;
pub mod schema;
