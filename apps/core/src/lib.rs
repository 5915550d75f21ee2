//! Career counselor conversation core.
//!
//! A rule-based counselor that chats with a student, builds a profile of
//! their subjects, interests, strengths and hobbies, and recommends careers.
//! The pure turn logic lives in [`brain`]; [`actors`] wraps it in per-session
//! actors and [`api`] exposes those over HTTP.

pub mod actors;
pub mod api;
pub mod brain;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;
pub mod telemetry;

#[cfg(test)]
mod tests;
