//! # taskdeck
//!
//! Task orchestration service with dependency-aware scheduling and simulated
//! asynchronous workers.
//!
//! This library provides:
//! - An HTTP API for creating tasks, wiring dependencies between them, and
//!   querying which task to work on next
//! - An in-memory task store with a dependency graph that stays acyclic
//! - A heuristic complexity estimator for planning subtask breakdowns
//! - A completion simulator that drives submitted tasks to a terminal state
//!   after a priority-dependent delay, standing in for a real worker fleet
//!
//! ## Task Flow
//! 1. Receive a task submission via the API
//! 2. Hand it to the routing collaborator (degraded, never blocks creation)
//! 3. Schedule a simulated completion for it
//! 4. Serve scheduling queries (`/api/next-task`) against the live store
//!
//! ## Modules
//! - `task`: task model, store, dependency graph, scheduler, estimator
//! - `simulator`: delayed completion driver
//! - `routing`: client for the external routing collaborator
//! - `api`: HTTP surface

pub mod api;
pub mod config;
pub mod error;
pub mod routing;
pub mod simulator;
pub mod task;

pub use config::Config;
pub use error::Error;
