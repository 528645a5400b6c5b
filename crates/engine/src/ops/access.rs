use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResolvedRates, ResultEngine, expenses, group_memberships, groups, items,
    payments, shares, users,
};

use super::{Engine, with_tx};

/// Generates a lookup of a child row scoped to its parent: a row that exists
/// under another parent is reported as missing.
macro_rules! impl_child_in_parent {
    ($require_fn:ident, $entity:path, $model:path, $parent_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            parent_id: Uuid,
            target_id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(target_id.to_string())
                .filter($parent_col.eq(parent_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_child_in_parent!(
        require_item_in_expense,
        items::Entity,
        items::Model,
        items::Column::ExpenseId,
        "item not exists"
    );

    impl_child_in_parent!(
        require_share_in_item,
        shares::Entity,
        shares::Model,
        shares::Column::ItemId,
        "share not exists"
    );

    impl_child_in_parent!(
        require_payment_in_expense,
        payments::Entity,
        payments::Model,
        payments::Column::ExpenseId,
        "payment not exists"
    );

    pub(super) async fn is_group_member(
        &self,
        db: &DatabaseTransaction,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<bool> {
        Ok(
            group_memberships::Entity::find_by_id((group_id.to_string(), user_id.to_string()))
                .one(db)
                .await?
                .is_some(),
        )
    }

    /// The group, if `user_id` belongs to it. Outsiders get the same error as
    /// for a missing group.
    pub(super) async fn require_group_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<groups::Model> {
        let group = groups::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))?;
        if !self.is_group_member(db, &group.id, user_id).await? {
            return Err(EngineError::KeyNotFound("group not exists".to_string()));
        }
        Ok(group)
    }

    /// A user referenced by an expense (payer, participant, settlement
    /// target) must belong to the expense's group.
    pub(super) async fn require_member_of(
        &self,
        db: &DatabaseTransaction,
        group_id: &str,
        username: &str,
    ) -> ResultEngine<()> {
        if !self.is_group_member(db, group_id, username).await? {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    /// The expense, if `user_id` belongs to its group.
    pub(super) async fn require_expense(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<expenses::Model> {
        let expense = expenses::Entity::find_by_id(expense_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        if !self.is_group_member(db, &expense.group_id, user_id).await? {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        Ok(expense)
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    /// Rates of an expense: its frozen snapshot, or the resolver's fallback
    /// chain for rows that never got one.
    pub(super) async fn expense_rates(&self, expense: &expenses::Model) -> ResolvedRates {
        self.rates.rates_for(expense.rate_snapshot.as_deref()).await
    }

    /// Rates of an expense visible to `user_id`, resolved before the caller
    /// opens its write transaction. A missing snapshot may reach the live
    /// source, which must not happen while rows are locked.
    pub(super) async fn rates_before_write(
        &self,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<ResolvedRates> {
        let expense = self.read_expense(expense_id, user_id).await?;
        Ok(self.expense_rates(&expense).await)
    }

    async fn read_expense(&self, expense_id: Uuid, user_id: &str) -> ResultEngine<expenses::Model> {
        with_tx!(self, |db_tx| self.require_expense(&db_tx, expense_id, user_id).await)
    }
}
