//! The job aggregate: an immutable value with pure transition methods.
//!
//! Mutation never happens in place — every transition consumes `self` and
//! returns a new `Job`. Persisting the result is the repository's job, not
//! this module's. Grounded in `original_source/domain/models/job.py`'s
//! frozen-dataclass-plus-`_replace` pattern, expressed here as ordinary
//! owned-`self` methods instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Pending,
    Scheduled,
    Running,
    Succeeded,
    /// Reserved for a non-retryable terminal failure classification. No
    /// transition in this implementation currently produces it — every
    /// `RUNNING` failure resolves to either `Scheduled` or `Dead` — but it
    /// stays in the enum because the source model and spec both name it.
    /// See DESIGN.md.
    Failed,
    Dead,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Dead)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub queue: String,
    pub name: String,
    pub tenant_id: Option<String>,
    pub payload: Value,
    pub state: JobState,
    pub priority: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub attempts: u32,
    pub max_attempts: u32,
    pub archived: bool,
    pub locked_by: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
    pub retry_policy: RetryPolicy,
}

/// The output of [`crate::commands::ScheduleJobCommand::validate`]: a
/// `NewJob` that has already passed every field constraint and is safe to
/// hand to `Job::new` without re-checking anything.
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    pub new_job: NewJob,
}

/// Inputs accepted by [`Job::new`]. Mirrors `ScheduleJobCommand` one level
/// down from the wire — the API crate validates the command and hands this
/// straight through.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: Option<Uuid>,
    pub name: String,
    pub payload: Value,
    pub queue: String,
    pub tenant_id: Option<String>,
    pub priority: i16,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub max_attempts: u32,
    pub retry_policy: RetryPolicy,
}

impl Job {
    /// Factory for a freshly submitted job. `scheduled_at`, if set, becomes
    /// `next_run_at` directly (the job starts life SCHEDULED rather than
    /// PENDING) — otherwise the job is immediately runnable.
    pub fn new(input: NewJob, now: DateTime<Utc>) -> Self {
        let state = if input.scheduled_at.is_some() {
            JobState::Scheduled
        } else {
            JobState::Pending
        };

        Job {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            queue: input.queue,
            name: input.name,
            tenant_id: input.tenant_id,
            payload: input.payload,
            state,
            priority: input.priority,
            created_at: now,
            updated_at: now,
            scheduled_at: input.scheduled_at,
            next_run_at: input.scheduled_at,
            last_run_at: None,
            attempts: 0,
            max_attempts: input.max_attempts,
            archived: false,
            locked_by: None,
            locked_at: None,
            retry_policy: input.retry_policy,
        }
    }

    /// Whether this job is eligible for acquisition right now: not
    /// archived, in a claimable state, and due.
    pub fn is_runnable_at(&self, now: DateTime<Utc>) -> bool {
        !self.archived
            && matches!(self.state, JobState::Pending | JobState::Scheduled)
            && self.next_run_at.map(|t| t <= now).unwrap_or(true)
    }

    /// `PENDING|SCHEDULED -> RUNNING`. Sets the lease fields, bumps
    /// `last_run_at`, and increments `attempts` — acquisition is the single
    /// authoritative increment point for the whole lifecycle;
    /// `complete`/`apply_failure` never increment again.
    pub fn mark_running(&self, worker_id: impl Into<String>, now: DateTime<Utc>) -> Job {
        let mut job = self.clone();
        job.state = JobState::Running;
        job.locked_by = Some(worker_id.into());
        job.locked_at = Some(now);
        job.last_run_at = Some(now);
        job.attempts += 1;
        job.updated_at = now;
        job
    }

    /// `RUNNING -> SUCCEEDED`. Terminal: clears the lease and `next_run_at`.
    pub fn mark_succeeded(&self, now: DateTime<Utc>) -> Job {
        let mut job = self.clone();
        job.state = JobState::Succeeded;
        job.next_run_at = None;
        job.locked_by = None;
        job.locked_at = None;
        job.updated_at = now;
        job
    }

    /// `RUNNING -> SCHEDULED` (retry) or `RUNNING -> DEAD` (budget
    /// exhausted), per this job's own `retry_policy`. Increments `attempts`
    /// to count the attempt that just failed.
    pub fn apply_failure(&self, now: DateTime<Utc>) -> Job {
        let mut job = self.clone();
        job.attempts += 1;

        let next_run_at =
            job.retry_policy
                .compute_next_run_at(job.attempts, job.max_attempts, now);

        job.locked_by = None;
        job.locked_at = None;
        job.updated_at = now;

        match next_run_at {
            Some(when) => {
                job.state = JobState::Scheduled;
                job.next_run_at = Some(when);
            }
            None => {
                job.state = JobState::Dead;
                job.next_run_at = None;
            }
        }

        job
    }

    /// Any non-terminal state -> same state, `archived = true`. Archived
    /// jobs are invisible to acquisition but keep their state for audit.
    pub fn archive(&self, now: DateTime<Utc>) -> Job {
        let mut job = self.clone();
        job.archived = true;
        job.updated_at = now;
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryStrategy;
    use serde_json::json;

    fn job_fixture(now: DateTime<Utc>) -> Job {
        Job::new(
            NewJob {
                id: None,
                name: "send-email".into(),
                payload: json!({"to": "a@b"}),
                queue: "default".into(),
                tenant_id: None,
                priority: 0,
                scheduled_at: None,
                max_attempts: 3,
                retry_policy: RetryPolicy::new(RetryStrategy::Exponential, 10),
            },
            now,
        )
    }

    #[test]
    fn new_job_without_scheduled_at_is_pending() {
        let now = Utc::now();
        let job = job_fixture(now);
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.attempts, 0);
        assert!(job.next_run_at.is_none());
        assert_eq!(job.created_at, now);
        assert_eq!(job.updated_at, now);
    }

    #[test]
    fn new_job_with_scheduled_at_is_scheduled() {
        let now = Utc::now();
        let later = now + chrono::Duration::hours(1);
        let mut input_now = job_fixture(now);
        input_now.scheduled_at = Some(later);
        // Build directly to also exercise next_run_at mirroring scheduled_at.
        let job = Job::new(
            NewJob {
                id: None,
                name: "x".into(),
                payload: json!({}),
                queue: "default".into(),
                tenant_id: None,
                priority: 0,
                scheduled_at: Some(later),
                max_attempts: 3,
                retry_policy: RetryPolicy::fixed(5),
            },
            now,
        );
        assert_eq!(job.state, JobState::Scheduled);
        assert_eq!(job.next_run_at, Some(later));
    }

    #[test]
    fn mark_running_sets_lease_and_increments_attempts() {
        let now = Utc::now();
        let job = job_fixture(now);
        let running = job.mark_running("w1", now);
        assert_eq!(running.state, JobState::Running);
        assert_eq!(running.locked_by.as_deref(), Some("w1"));
        assert_eq!(running.locked_at, Some(now));
        assert_eq!(running.attempts, 1);
        assert_eq!(running.last_run_at, Some(now));
    }

    #[test]
    fn mark_succeeded_clears_lease_and_next_run_at() {
        let now = Utc::now();
        let job = job_fixture(now).mark_running("w1", now);
        let done = job.mark_succeeded(now);
        assert_eq!(done.state, JobState::Succeeded);
        assert!(done.locked_by.is_none());
        assert!(done.locked_at.is_none());
        assert!(done.next_run_at.is_none());
    }

    #[test]
    fn apply_failure_schedules_retry_when_budget_remains() {
        let now = Utc::now();
        let job = job_fixture(now).mark_running("w1", now);
        let failed = job.apply_failure(now);
        assert_eq!(failed.state, JobState::Scheduled);
        assert_eq!(failed.attempts, 2);
        assert_eq!(failed.next_run_at, Some(now + chrono::Duration::seconds(10)));
        assert!(failed.locked_by.is_none());
    }

    #[test]
    fn apply_failure_goes_dead_when_budget_exhausted() {
        let now = Utc::now();
        let mut job = job_fixture(now).mark_running("w1", now);
        job.attempts = 2; // one more failure reaches max_attempts=3
        let failed = job.apply_failure(now);
        assert_eq!(failed.state, JobState::Dead);
        assert_eq!(failed.attempts, 3);
        assert!(failed.next_run_at.is_none());
        assert!(failed.locked_by.is_none());
    }

    #[test]
    fn archive_preserves_state_but_sets_archived() {
        let now = Utc::now();
        let job = job_fixture(now);
        let archived = job.archive(now);
        assert!(archived.archived);
        assert_eq!(archived.state, JobState::Pending);
    }

    #[test]
    fn is_runnable_at_respects_next_run_at() {
        let now = Utc::now();
        let future = now + chrono::Duration::seconds(60);
        let job = Job::new(
            NewJob {
                id: None,
                name: "x".into(),
                payload: json!({}),
                queue: "default".into(),
                tenant_id: None,
                priority: 0,
                scheduled_at: Some(future),
                max_attempts: 3,
                retry_policy: RetryPolicy::fixed(5),
            },
            now,
        );
        assert!(!job.is_runnable_at(now));
        assert!(job.is_runnable_at(future));
    }
}
