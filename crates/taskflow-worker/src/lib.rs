//! Worker runtime: claims due jobs from a [`taskflow_core::ports::UnitOfWorkFactory`]
//! and dispatches them to application-provided [`Handler`]s.

pub mod config;
pub mod handler;
pub mod handlers;
pub mod run;

pub use handler::{Handler, HandlerError, HandlerRegistry};
pub use run::{run_worker_loop, DEFAULT_IDLE_POLL_INTERVAL};
