//! Diesel models for the activity log.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::activity::{Activity as DomainActivity, NewActivity as DomainNewActivity};
use crate::domain::types::{ActivityId, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::activities)]
pub struct Activity {
    pub id: i32,
    pub user_id: i32,
    pub subject_type: String,
    pub subject_id: i32,
    pub action: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::activities)]
pub struct NewActivity<'a> {
    pub user_id: i32,
    pub subject_type: &'a str,
    pub subject_id: i32,
    pub action: &'a str,
    pub description: &'a str,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Activity> for DomainActivity {
    type Error = TypeConstraintError;

    fn try_from(activity: Activity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActivityId::new(activity.id)?,
            user_id: UserId::new(activity.user_id)?,
            subject_type: activity.subject_type.parse()?,
            subject_id: activity.subject_id,
            action: activity.action.parse()?,
            description: activity.description,
            created_at: activity.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewActivity> for NewActivity<'a> {
    fn from(activity: &'a DomainNewActivity) -> Self {
        Self {
            user_id: activity.user_id.get(),
            subject_type: activity.subject_type.as_str(),
            subject_id: activity.subject_id,
            action: activity.action.as_str(),
            description: activity.description.as_str(),
            created_at: activity.created_at,
        }
    }
}
