//! Audit trail of actions performed on billing records.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::listing::{ListQuery, sort_field};
use crate::domain::types::{ActivityId, UserId, str_enum};

str_enum!(
    /// Kind of record an activity refers to.
    SubjectType {
        Customer => "customer",
        Job => "job",
        Invoice => "invoice",
        Payment => "payment",
    }
);

str_enum!(
    /// What happened to the subject.
    ActivityAction {
        Created => "created",
        Updated => "updated",
        Archived => "archived",
        Exported => "exported",
        EmailSent => "email_sent",
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: ActivityId,
    pub user_id: UserId,
    pub subject_type: SubjectType,
    /// Identifier of the subject, `0` for actions on a whole list.
    pub subject_id: i32,
    pub action: ActivityAction,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewActivity {
    pub user_id: UserId,
    pub subject_type: SubjectType,
    pub subject_id: i32,
    pub action: ActivityAction,
    pub description: String,
    pub created_at: NaiveDateTime,
}

impl NewActivity {
    /// Builds an activity, sanitizing the free-text description.
    #[must_use]
    pub fn new(
        user_id: UserId,
        subject_type: SubjectType,
        subject_id: i32,
        action: ActivityAction,
        description: &str,
    ) -> Self {
        Self {
            user_id,
            subject_type,
            subject_id,
            action,
            description: ammonia::clean(description).trim().to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }

    #[must_use]
    pub fn created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

sort_field!(
    /// Columns activities may be ordered by.
    ActivitySortField {
        default: CreatedAt,
        CreatedAt => "created_at",
        Action => "action",
        SubjectType => "subject_type",
    }
);

/// Equality filters accepted by the activities listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActivityFilter {
    pub subject_type: Option<SubjectType>,
}

pub type ActivityListQuery = ListQuery<ActivitySortField, ActivityFilter>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_sanitized() {
        let activity = NewActivity::new(
            UserId::new(1).unwrap(),
            SubjectType::Invoice,
            3,
            ActivityAction::EmailSent,
            " Sent <script>alert(1)</script>reminder ",
        );

        assert_eq!(activity.description, "Sent reminder");
    }
}
