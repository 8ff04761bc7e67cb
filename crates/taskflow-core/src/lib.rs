//! # taskflow-core
//!
//! Domain model, ports, and use cases for a persistent, multi-queue job
//! broker and worker runtime. Clients submit named jobs with arbitrary
//! payloads; workers atomically claim due jobs from a shared relational
//! store, execute them, and record outcomes.
//!
//! ## Architecture
//!
//! ```text
//! ScheduleJob ──► UnitOfWork ──► JobRepository::insert
//!
//! worker loop ──► AcquireNextJob ──► UnitOfWork ──► JobRepository::acquire_next_due_job
//!             │                                         (FOR UPDATE SKIP LOCKED, transactional)
//!             ├─► dispatch by job.name
//!             ├─► CompleteJob ──► UnitOfWork ──► job.mark_succeeded + JobAttemptRepository::insert
//!             └─► FailJob     ──► UnitOfWork ──► job.apply_failure  + JobAttemptRepository::insert
//! ```
//!
//! ## Key invariants
//!
//! 1. [`Job`] and [`JobAttempt`] are immutable values — every transition
//!    method returns a new value, never mutates in place.
//! 2. One use case = one [`ports::UnitOfWork`] = one transaction. A job
//!    mutation and its attempt insert always commit together.
//! 3. Acquisition is the single point that increments `attempts` — see
//!    [`use_cases::CompleteJob`] and [`use_cases::FailJob`].
//! 4. This crate never performs I/O directly — it depends only on the
//!    [`ports`] traits; concrete storage lives in `taskflow-postgres`.
//!
//! This crate intentionally says nothing about HTTP, SQL, or process
//! lifecycle — see the `taskflow-api`, `taskflow-postgres`, and
//! `taskflow-worker` crates respectively.

pub mod attempt;
pub mod commands;
pub mod error;
pub mod job;
pub mod ports;
pub mod retry;
pub mod use_cases;

pub use attempt::{JobAttempt, NewJobAttempt};
pub use commands::ScheduleJobCommand;
pub use error::{ErrorKind, TaskFlowError, TaskFlowResult};
pub use job::{Job, JobState, NewJob, ResolvedCommand};
pub use ports::{JobAttemptRepository, JobRepository, UnitOfWork, UnitOfWorkFactory};
pub use retry::{RetryPolicy, RetryStrategy, MAX_RETRY_DELAY};
