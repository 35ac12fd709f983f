use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::listing::{ListQuery, sort_field};
use crate::domain::types::{CustomerId, JobId, JobTitle, UserId, str_enum};

str_enum!(
    /// Progress of a job.
    JobStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub user_id: UserId,
    pub customer_id: CustomerId,
    pub title: JobTitle,
    pub description: Option<String>,
    pub status: JobStatus,
    pub archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewJob {
    pub user_id: UserId,
    pub customer_id: CustomerId,
    pub title: JobTitle,
    pub description: Option<String>,
    pub status: JobStatus,
    pub archived: bool,
    pub created_at: NaiveDateTime,
}

impl NewJob {
    #[must_use]
    pub fn new(
        user_id: UserId,
        customer_id: CustomerId,
        title: JobTitle,
        description: Option<String>,
    ) -> Self {
        Self {
            user_id,
            customer_id,
            title,
            description: description
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            status: JobStatus::Pending,
            archived: false,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[must_use]
    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

sort_field!(
    /// Columns jobs may be ordered by.
    JobSortField {
        default: CreatedAt,
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
        Title => "title",
        Status => "status",
    }
);

/// Equality filters accepted by the jobs listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub customer_id: Option<CustomerId>,
}

pub type JobListQuery = ListQuery<JobSortField, JobFilter>;
