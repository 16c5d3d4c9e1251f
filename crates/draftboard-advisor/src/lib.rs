// HTTP client for the advisory ranking service.

pub mod client;

pub use client::{AdvisorClient, RankingClient};
