pub mod capture;
pub mod config;
pub mod logstore;
pub mod observability;
