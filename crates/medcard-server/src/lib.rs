pub mod auth;
pub mod config;
pub mod error;
pub mod service;
pub mod state;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;
