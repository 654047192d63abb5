//! Benchmark utilities for the sieve engine.
//!
//! - **Microbenchmarks**: entity churn, component add/remove, filtered iteration
//! - **Scenario benchmarks**: a particle system with continuous destroy and respawn
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench -p sieve_bench
//! cargo bench -p sieve_bench -- churn
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports.

pub mod components;
pub mod scenarios;
