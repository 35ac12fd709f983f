use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::job::{Job, JobListQuery, JobSortField, NewJob};
use crate::domain::types::UserId;
use crate::models::job::{Job as DbJob, NewJob as DbNewJob};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, JobReader, JobWriter, Listing};
use crate::schema::jobs;

fn filtered(owner: UserId, query: &JobListQuery) -> jobs::BoxedQuery<'static, Sqlite> {
    let mut items = jobs::table
        .filter(jobs::user_id.eq(owner.get()))
        .into_boxed();

    if let Some(range) = query.created_between {
        items = items.filter(jobs::created_at.ge(range.lower_bound()));
        if let Some(upper) = range.upper_bound() {
            items = items.filter(jobs::created_at.lt(upper));
        }
    }

    if let Some(archived) = query.archived {
        items = items.filter(jobs::archived.eq(archived));
    }

    if let Some(status) = query.filter.status {
        items = items.filter(jobs::status.eq(status.as_str()));
    }

    if let Some(customer_id) = query.filter.customer_id {
        items = items.filter(jobs::customer_id.eq(customer_id.get()));
    }

    items
}

impl JobReader for DieselRepository {
    fn list_jobs(&self, owner: UserId, query: &JobListQuery) -> RepositoryResult<Listing<Job>> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(owner, query).count().get_result(&mut conn)?;

        let items = filtered(owner, query);
        let items = match query.sort.field {
            JobSortField::CreatedAt => order_by!(items, jobs::created_at, jobs::id, query.sort.order),
            JobSortField::UpdatedAt => order_by!(items, jobs::updated_at, jobs::id, query.sort.order),
            JobSortField::Title => order_by!(items, jobs::title, jobs::id, query.sort.order),
            JobSortField::Status => order_by!(items, jobs::status, jobs::id, query.sort.order),
        };
        let items = paginate!(items, query.pagination);

        let jobs = items
            .load::<DbJob>(&mut conn)?
            .into_iter()
            .map(Job::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, jobs))
    }
}

impl JobWriter for DieselRepository {
    fn create_job(&self, new_job: &NewJob) -> RepositoryResult<Job> {
        let mut conn = self.conn()?;
        let insertable: DbNewJob = new_job.into();

        let created = diesel::insert_into(jobs::table)
            .values(&insertable)
            .get_result::<DbJob>(&mut conn)?;

        Ok(Job::try_from(created)?)
    }
}
