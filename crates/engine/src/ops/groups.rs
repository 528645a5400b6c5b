use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Group, ResultEngine, group_memberships, groups, util::normalize_required_name};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a group with `user_id` as its first member.
    pub async fn new_group(&self, name: &str, user_id: &str) -> ResultEngine<Group> {
        let name = normalize_required_name(name, "group")?;
        let group = Group::new(name, user_id);

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            groups::ActiveModel::from(&group).insert(&db_tx).await?;
            group_memberships::ActiveModel {
                group_id: ActiveValue::Set(group.id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(group_id = %group.id, user_id, "group created");
            Ok(group)
        })
    }

    /// Adds `member` to a group the acting user belongs to.
    pub async fn add_group_member(
        &self,
        group_id: Uuid,
        member: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let group = self.require_group_member(&db_tx, group_id, user_id).await?;
            self.require_user_exists(&db_tx, member).await?;
            if self.is_group_member(&db_tx, &group.id, member).await? {
                return Err(EngineError::ExistingKey(member.to_string()));
            }
            group_memberships::ActiveModel {
                group_id: ActiveValue::Set(group.id),
                user_id: ActiveValue::Set(member.to_string()),
            }
            .insert(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Usernames of the group's members, sorted.
    pub async fn list_group_members(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<String>> {
        with_tx!(self, |db_tx| {
            let group = self.require_group_member(&db_tx, group_id, user_id).await?;
            let rows = group_memberships::Entity::find()
                .filter(group_memberships::Column::GroupId.eq(group.id))
                .order_by_asc(group_memberships::Column::UserId)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(|m| m.user_id).collect())
        })
    }
}
