//! Unit tests for individual components

mod builders_test;
mod config_store_test;
mod config_test;
mod error_test;
mod service_test;
