use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::job::{Job as DomainJob, NewJob as DomainNewJob};
use crate::domain::types::{CustomerId, JobId, JobTitle, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::jobs)]
pub struct Job {
    pub id: i32,
    pub user_id: i32,
    pub customer_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::jobs)]
pub struct NewJob<'a> {
    pub user_id: i32,
    pub customer_id: i32,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Job> for DomainJob {
    type Error = TypeConstraintError;

    fn try_from(job: Job) -> Result<Self, Self::Error> {
        Ok(Self {
            id: JobId::new(job.id)?,
            user_id: UserId::new(job.user_id)?,
            customer_id: CustomerId::new(job.customer_id)?,
            title: JobTitle::new(job.title)?,
            description: job.description,
            status: job.status.parse()?,
            archived: job.archived,
            created_at: job.created_at,
            updated_at: job.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewJob> for NewJob<'a> {
    fn from(job: &'a DomainNewJob) -> Self {
        Self {
            user_id: job.user_id.get(),
            customer_id: job.customer_id.get(),
            title: job.title.as_str(),
            description: job.description.as_deref(),
            status: job.status.as_str(),
            archived: job.archived,
            created_at: job.created_at,
            updated_at: job.created_at,
        }
    }
}
