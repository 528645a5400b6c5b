use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseItem, Money, ResultEngine, Share, ShareInput, SharePatch, expenses, items,
    shares, util::parse_uuid,
};

use super::{Engine, with_tx};

impl Engine {
    /// Gives `participant` a share of an item.
    ///
    /// Exactly one of `value` (in the item's currency) and `percent` must be
    /// supplied. A participant holds at most one share per item.
    pub async fn allocate_share(
        &self,
        expense_id: Uuid,
        item_id: Uuid,
        participant: &str,
        value: Option<Money>,
        percent: Option<Decimal>,
        user_id: &str,
    ) -> ResultEngine<Share> {
        let input = ShareInput::resolve(value, percent)?;
        let rates = self.rates_before_write(expense_id, user_id).await?.rates;

        with_tx!(self, |db_tx| {
            let (expense, item) = self
                .require_expense_item(&db_tx, expense_id, item_id, user_id)
                .await?;
            self.require_member_of(&db_tx, &expense.group_id, participant)
                .await?;

            let taken = shares::Entity::find()
                .filter(shares::Column::ItemId.eq(item.id.to_string()))
                .filter(shares::Column::ParticipantId.eq(participant))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(participant.to_string()));
            }

            let computed = input.compute(item.currency, item.amount, &rates);
            let share = Share::new(item.id, participant.to_string(), input, computed);
            shares::ActiveModel::try_from(&share)?.insert(&db_tx).await?;

            self.refresh_expense_status(&db_tx, &expense).await?;
            Ok(share)
        })
    }

    /// Partially updates a share.
    ///
    /// The supplied field replaces the stored one and the other stored field
    /// is kept as is. A share that holds a percent only accepts a new percent.
    pub async fn update_share(
        &self,
        expense_id: Uuid,
        item_id: Uuid,
        share_id: Uuid,
        patch: SharePatch,
        user_id: &str,
    ) -> ResultEngine<Share> {
        let input = patch.input()?;
        let rates = self.rates_before_write(expense_id, user_id).await?.rates;

        with_tx!(self, |db_tx| {
            let (expense, item) = self
                .require_expense_item(&db_tx, expense_id, item_id, user_id)
                .await?;
            let model = self.require_share_in_item(&db_tx, item_id, share_id).await?;
            let mut share = Share::try_from(model)?;

            share.apply(input)?;
            share.recompute(item.currency, item.amount, &rates);
            shares::ActiveModel::try_from(&share)?.update(&db_tx).await?;

            self.refresh_expense_status(&db_tx, &expense).await?;
            Ok(share)
        })
    }

    pub async fn delete_share(
        &self,
        expense_id: Uuid,
        item_id: Uuid,
        share_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (expense, _) = self
                .require_expense_item(&db_tx, expense_id, item_id, user_id)
                .await?;
            let model = self.require_share_in_item(&db_tx, item_id, share_id).await?;
            shares::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            self.refresh_expense_status(&db_tx, &expense).await?;
            Ok(())
        })
    }

    /// Updates a share addressed only by its id.
    ///
    /// The owning item and expense are looked up and the call goes through
    /// [`Engine::update_share`], so the same access rules apply.
    pub async fn update_share_by_id(
        &self,
        share_id: Uuid,
        patch: SharePatch,
        user_id: &str,
    ) -> ResultEngine<Share> {
        let (expense_id, item_id) = self.share_parents(share_id).await?;
        self.update_share(expense_id, item_id, share_id, patch, user_id)
            .await
    }

    /// Deletes a share addressed only by its id. See
    /// [`Engine::update_share_by_id`].
    pub async fn delete_share_by_id(&self, share_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let (expense_id, item_id) = self.share_parents(share_id).await?;
        self.delete_share(expense_id, item_id, share_id, user_id)
            .await
    }

    async fn share_parents(&self, share_id: Uuid) -> ResultEngine<(Uuid, Uuid)> {
        with_tx!(self, |db_tx| {
            let (_, item) = shares::Entity::find_by_id(share_id.to_string())
                .find_also_related(items::Entity)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("share not exists".to_string()))?;
            let item =
                item.ok_or_else(|| EngineError::KeyNotFound("share not exists".to_string()))?;
            Ok((
                parse_uuid(&item.expense_id, "expense")?,
                parse_uuid(&item.id, "item")?,
            ))
        })
    }

    async fn require_expense_item(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        item_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(expenses::Model, ExpenseItem)> {
        let expense = self.require_expense(db, expense_id, user_id).await?;
        let item = self.require_item_in_expense(db, expense_id, item_id).await?;
        Ok((expense, ExpenseItem::try_from(item)?))
    }
}
