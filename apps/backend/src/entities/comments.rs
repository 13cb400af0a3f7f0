use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "post_id")]
    pub post_id: i64,
    /// Null for anonymous comments.
    #[sea_orm(column_name = "author_id")]
    pub author_id: Option<i64>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_name = "is_anonymous")]
    pub is_anonymous: bool,
    #[sea_orm(column_name = "anonymous_name")]
    pub anonymous_name: Option<String>,
    /// Plain-comparison guard chosen at creation time for anonymous edits.
    #[serde(skip_serializing)]
    #[sea_orm(column_name = "delete_password")]
    pub delete_password: Option<String>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::posts::Entity",
        from = "Column::PostId",
        to = "super::posts::Column::Id"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Outcome of checking whether a caller may edit or delete a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Allowed,
    NotAuthor,
    InvalidPassword,
    NotAllowed,
}

impl Model {
    /// Authored comments are editable only by their author; anonymous
    /// comments require the delete password chosen at creation.
    pub fn can_access(&self, user_id: Option<i64>, password: Option<&str>) -> AccessResult {
        if let Some(author_id) = self.author_id {
            return if user_id == Some(author_id) {
                AccessResult::Allowed
            } else {
                AccessResult::NotAuthor
            };
        }

        if self.is_anonymous {
            if let Some(expected) = self.delete_password.as_deref() {
                return if password == Some(expected) {
                    AccessResult::Allowed
                } else {
                    AccessResult::InvalidPassword
                };
            }
        }

        AccessResult::NotAllowed
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;

    fn comment(author_id: Option<i64>, delete_password: Option<&str>) -> Model {
        Model {
            id: 1,
            post_id: 1,
            author_id,
            content: "hello".to_string(),
            is_anonymous: author_id.is_none(),
            anonymous_name: author_id.is_none().then(|| "anon".to_string()),
            delete_password: delete_password.map(str::to_string),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn author_match_is_allowed() {
        let c = comment(Some(7), None);
        assert_eq!(c.can_access(Some(7), None), AccessResult::Allowed);
        assert_eq!(c.can_access(Some(8), None), AccessResult::NotAuthor);
        assert_eq!(c.can_access(None, None), AccessResult::NotAuthor);
    }

    #[test]
    fn anonymous_requires_matching_password() {
        let c = comment(None, Some("pw"));
        assert_eq!(c.can_access(None, Some("pw")), AccessResult::Allowed);
        assert_eq!(c.can_access(None, Some("no")), AccessResult::InvalidPassword);
        assert_eq!(c.can_access(None, None), AccessResult::InvalidPassword);
    }

    #[test]
    fn anonymous_without_password_is_locked() {
        let c = comment(None, None);
        assert_eq!(c.can_access(None, Some("pw")), AccessResult::NotAllowed);
    }
}
