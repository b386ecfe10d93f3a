// Library for tests to access modules

pub mod cache;
pub mod catalog;
pub mod config;
pub mod models;
pub mod routes;
pub mod usage_repo;
pub mod version;
pub mod window;
