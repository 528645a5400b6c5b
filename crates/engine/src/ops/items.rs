use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    ExpenseItem, ItemPatch, ItemView, NewItem, ResultEngine, Share, items, items::validate_item_amount,
    shares, util::normalize_required_name,
};

use super::{Engine, expenses::item_view, with_tx};

impl Engine {
    pub async fn add_item(
        &self,
        expense_id: Uuid,
        new: NewItem,
        user_id: &str,
    ) -> ResultEngine<ExpenseItem> {
        let name = normalize_required_name(&new.name, "item")?;

        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id, user_id).await?;
            let item = ExpenseItem::new(
                expense_id,
                name,
                new.amount,
                new.currency.unwrap_or_default(),
            )?;
            items::ActiveModel::try_from(&item)?.insert(&db_tx).await?;
            tracing::debug!(expense_id = %expense.id, item_id = %item.id, "item added");
            Ok(item)
        })
    }

    /// Partially updates an item.
    ///
    /// When the amount or the currency changes, every share of the item gets
    /// its base value recomputed with the expense's frozen rates.
    pub async fn update_item(
        &self,
        expense_id: Uuid,
        item_id: Uuid,
        patch: ItemPatch,
        user_id: &str,
    ) -> ResultEngine<ItemView> {
        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "item"))
            .transpose()?;
        if let Some(amount) = patch.amount {
            validate_item_amount(amount)?;
        }
        let rates = self.rates_before_write(expense_id, user_id).await?.rates;

        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id, user_id).await?;
            let model = self
                .require_item_in_expense(&db_tx, expense_id, item_id)
                .await?;
            let mut item = ExpenseItem::try_from(model)?;

            let reprice = patch.amount.is_some_and(|amount| amount != item.amount)
                || patch.currency.is_some_and(|currency| currency != item.currency);
            if let Some(name) = name {
                item.name = name;
            }
            if let Some(amount) = patch.amount {
                item.amount = amount;
            }
            if let Some(currency) = patch.currency {
                item.currency = currency;
            }
            items::ActiveModel::try_from(&item)?.update(&db_tx).await?;

            let mut item_shares = shares::Entity::find()
                .filter(shares::Column::ItemId.eq(item.id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Share::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            if reprice {
                for share in &mut item_shares {
                    if !share.recompute(item.currency, item.amount, &rates) {
                        tracing::warn!(share_id = %share.id, "share without value or percent");
                        continue;
                    }
                    shares::ActiveModel {
                        id: ActiveValue::Unchanged(share.id.to_string()),
                        computed_value_minor: ActiveValue::Set(Some(share.computed_value.minor()?)),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
                self.refresh_expense_status(&db_tx, &expense).await?;
            }

            Ok(item_view(item, item_shares, &rates))
        })
    }

    /// Deletes an item together with its shares.
    pub async fn delete_item(
        &self,
        expense_id: Uuid,
        item_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id, user_id).await?;
            let item = self
                .require_item_in_expense(&db_tx, expense_id, item_id)
                .await?;
            shares::Entity::delete_many()
                .filter(shares::Column::ItemId.eq(item.id.clone()))
                .exec(&db_tx)
                .await?;
            items::Entity::delete_by_id(item.id).exec(&db_tx).await?;
            self.refresh_expense_status(&db_tx, &expense).await?;
            Ok(())
        })
    }
}
