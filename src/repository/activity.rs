use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::activity::{Activity, ActivityListQuery, ActivitySortField, NewActivity};
use crate::domain::types::UserId;
use crate::models::activity::{Activity as DbActivity, NewActivity as DbNewActivity};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ActivityReader, ActivityWriter, DieselRepository, Listing};
use crate::schema::activities;

fn filtered(owner: UserId, query: &ActivityListQuery) -> activities::BoxedQuery<'static, Sqlite> {
    let mut items = activities::table
        .filter(activities::user_id.eq(owner.get()))
        .into_boxed();

    if let Some(range) = query.created_between {
        items = items.filter(activities::created_at.ge(range.lower_bound()));
        if let Some(upper) = range.upper_bound() {
            items = items.filter(activities::created_at.lt(upper));
        }
    }

    if let Some(subject_type) = query.filter.subject_type {
        items = items.filter(activities::subject_type.eq(subject_type.as_str()));
    }

    items
}

impl ActivityReader for DieselRepository {
    fn list_activities(
        &self,
        owner: UserId,
        query: &ActivityListQuery,
    ) -> RepositoryResult<Listing<Activity>> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(owner, query).count().get_result(&mut conn)?;

        let items = filtered(owner, query);
        let order = query.sort.order;
        let items = match query.sort.field {
            ActivitySortField::CreatedAt => {
                order_by!(items, activities::created_at, activities::id, order)
            }
            ActivitySortField::Action => order_by!(items, activities::action, activities::id, order),
            ActivitySortField::SubjectType => {
                order_by!(items, activities::subject_type, activities::id, order)
            }
        };
        let items = paginate!(items, query.pagination);

        let activities = items
            .load::<DbActivity>(&mut conn)?
            .into_iter()
            .map(Activity::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, activities))
    }
}

impl ActivityWriter for DieselRepository {
    fn create_activity(&self, new_activity: &NewActivity) -> RepositoryResult<Activity> {
        let mut conn = self.conn()?;
        let insertable: DbNewActivity = new_activity.into();

        let created = diesel::insert_into(activities::table)
            .values(&insertable)
            .get_result::<DbActivity>(&mut conn)?;

        Ok(Activity::try_from(created)?)
    }
}
