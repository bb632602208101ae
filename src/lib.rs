pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod filter;
pub mod graph;
pub mod handlers;
pub mod mapping;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod testing;
