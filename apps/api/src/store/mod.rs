//! Persistence over Postgres. Every function takes the pool explicitly;
//! multi-statement writes run in a single transaction.

pub mod interactions;
pub mod jobs;
pub mod keywords;
pub mod users;
