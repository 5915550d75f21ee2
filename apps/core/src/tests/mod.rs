//! Test Module
//!
//! Scenario tests that span more than one module.
//!
//! ## Test Categories
//! - `brain_tests`: whole conversations through the pure engine
//! - `supervisor_tests`: session actors, delegates and concurrency
//! - `api_tests`: the HTTP surface, driven in-process
