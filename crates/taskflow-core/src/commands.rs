//! `ScheduleJobCommand` and its validation. Grounded in
//! `original_source/application/dto/schedule_job_command.py`'s pydantic
//! model — validated by hand here since the core crate doesn't depend on a
//! web framework (the API crate owns JSON deserialization; this module owns
//! the domain-level field constraints).

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::error::TaskFlowError;
use crate::job::{NewJob, ResolvedCommand};
use crate::retry::{RetryPolicy, RetryStrategy};

const MAX_NAME_LEN: usize = 255;
const MAX_QUEUE_LEN: usize = 64;
const MAX_TENANT_ID_LEN: usize = 64;
const MIN_PRIORITY: i32 = -32_768;
const MAX_PRIORITY: i32 = 32_767;
const MIN_MAX_ATTEMPTS: u32 = 1;
const MAX_MAX_ATTEMPTS: u32 = 100;

fn default_queue() -> String {
    "default".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_payload() -> Value {
    Value::Object(Default::default())
}

/// Request to schedule a new job. Constructed by the API crate from the
/// wire payload; `ScheduleJob::execute` validates it before touching the
/// store.
#[derive(Debug, Clone)]
pub struct ScheduleJobCommand {
    pub id: Option<Uuid>,
    pub name: String,
    pub payload: Value,
    pub queue: String,
    pub tenant_id: Option<String>,
    pub priority: i32,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub max_attempts: u32,
    pub retry_policy: RetryPolicy,
}

impl Default for ScheduleJobCommand {
    fn default() -> Self {
        ScheduleJobCommand {
            id: None,
            name: String::new(),
            payload: default_payload(),
            queue: default_queue(),
            tenant_id: None,
            priority: 0,
            scheduled_at: None,
            max_attempts: default_max_attempts(),
            retry_policy: RetryPolicy::new(RetryStrategy::Exponential, 30),
        }
    }
}

impl ScheduleJobCommand {
    pub fn new(name: impl Into<String>) -> Self {
        ScheduleJobCommand {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Validate and normalize this command into the inputs `Job::new` needs.
    pub fn validate(self) -> Result<ResolvedCommand, TaskFlowError> {
        let name = self.name.trim().to_string();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(TaskFlowError::validation(format!(
                "name must be 1-{MAX_NAME_LEN} characters"
            )));
        }

        if self.queue.is_empty() || self.queue.chars().count() > MAX_QUEUE_LEN {
            return Err(TaskFlowError::validation(format!(
                "queue must be 1-{MAX_QUEUE_LEN} characters"
            )));
        }

        if let Some(tenant_id) = &self.tenant_id {
            if tenant_id.chars().count() > MAX_TENANT_ID_LEN {
                return Err(TaskFlowError::validation(format!(
                    "tenant_id must be at most {MAX_TENANT_ID_LEN} characters"
                )));
            }
        }

        if self.priority < MIN_PRIORITY || self.priority > MAX_PRIORITY {
            return Err(TaskFlowError::validation(format!(
                "priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}"
            )));
        }

        if self.max_attempts < MIN_MAX_ATTEMPTS || self.max_attempts > MAX_MAX_ATTEMPTS {
            return Err(TaskFlowError::validation(format!(
                "max_attempts must be between {MIN_MAX_ATTEMPTS} and {MAX_MAX_ATTEMPTS}"
            )));
        }

        if !self.payload.is_object() {
            return Err(TaskFlowError::validation("payload must be a JSON object"));
        }

        Ok(ResolvedCommand {
            new_job: NewJob {
                id: self.id,
                name,
                payload: self.payload,
                queue: self.queue,
                tenant_id: self.tenant_id,
                priority: self.priority as i16,
                scheduled_at: self.scheduled_at,
                max_attempts: self.max_attempts,
                retry_policy: self.retry_policy,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        let cmd = ScheduleJobCommand::new("   ");
        let err = cmd.validate().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn trims_name() {
        let cmd = ScheduleJobCommand::new("  send-email  ");
        let resolved = cmd.validate().unwrap();
        assert_eq!(resolved.new_job.name, "send-email");
    }

    #[test]
    fn rejects_out_of_range_priority() {
        let mut cmd = ScheduleJobCommand::new("x");
        cmd.priority = 40_000;
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_max_attempts() {
        let mut cmd = ScheduleJobCommand::new("x");
        cmd.max_attempts = 0;
        assert!(cmd.validate().is_err());

        let mut cmd = ScheduleJobCommand::new("x");
        cmd.max_attempts = 101;
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn defaults_match_spec() {
        let cmd = ScheduleJobCommand::new("x");
        let resolved = cmd.validate().unwrap();
        assert_eq!(resolved.new_job.queue, "default");
        assert_eq!(resolved.new_job.max_attempts, 3);
        assert_eq!(resolved.new_job.payload, Value::Object(Default::default()));
    }
}
