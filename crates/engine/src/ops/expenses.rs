use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Expense, ExpenseDetail, ExpenseItem, ItemView, Money, NewExpense, RateMap, RateOrigin,
    ResultEngine, Share, expenses, items, items_total_base, shares, shares::allocation_gap,
    to_base, util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates an expense in a group and freezes the current rates on it.
    ///
    /// Rates are looked up once, before the transaction starts, and never
    /// again for this expense. The returned origin tells whether they came
    /// from the live source or the 1:1 fallback.
    pub async fn new_expense(
        &self,
        group_id: Uuid,
        new: NewExpense,
        user_id: &str,
    ) -> ResultEngine<(Expense, RateOrigin)> {
        let name = normalize_required_name(&new.name, "expense")?;
        let payer = new
            .payer
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(user_id)
            .to_string();
        let locked = self.rates.lock_rates().await;

        with_tx!(self, |db_tx| {
            let group = self.require_group_member(&db_tx, group_id, user_id).await?;
            self.require_member_of(&db_tx, &group.id, &payer).await?;

            let expense = Expense::new(
                group_id,
                payer,
                name,
                new.amount,
                new.currency.unwrap_or_default(),
                locked.rates.to_snapshot(),
                user_id,
            )?;
            expenses::ActiveModel::try_from(&expense)?
                .insert(&db_tx)
                .await?;
            tracing::info!(
                expense_id = %expense.id,
                group_id = %group_id,
                origin = ?locked.origin,
                "expense created"
            );
            Ok((expense, locked.origin))
        })
    }

    /// An expense with its items and shares, converted with the frozen
    /// snapshot.
    pub async fn expense(&self, expense_id: Uuid, user_id: &str) -> ResultEngine<ExpenseDetail> {
        let (model, rows) = self.load_expense_items(expense_id, user_id).await?;

        let resolved = self.expense_rates(&model).await;
        let mut views = Vec::with_capacity(rows.len());
        for (item, shares) in rows {
            let item = ExpenseItem::try_from(item)?;
            let shares = shares
                .into_iter()
                .map(Share::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            views.push(item_view(item, shares, &resolved.rates));
        }
        let items_total = views.iter().map(|view| view.amount_base).sum();

        Ok(ExpenseDetail {
            expense: Expense::try_from(model)?,
            items: views,
            items_total,
            rates_origin: resolved.origin,
        })
    }

    /// Expenses of a group, oldest first.
    pub async fn list_group_expenses(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            let group = self.require_group_member(&db_tx, group_id, user_id).await?;
            let rows = expenses::Entity::find()
                .filter(expenses::Column::GroupId.eq(group.id))
                .order_by_asc(expenses::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            rows.into_iter()
                .map(Expense::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Base-currency total of the expense's items under its frozen snapshot.
    pub async fn expense_total(&self, expense_id: Uuid, user_id: &str) -> ResultEngine<Money> {
        let (model, rows) = self.load_expense_items(expense_id, user_id).await?;

        let resolved = self.expense_rates(&model).await;
        let items = rows
            .into_iter()
            .map(|(item, _)| ExpenseItem::try_from(item))
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(items_total_base(
            items.iter().map(|item| (item.currency, item.amount)),
            &resolved.rates,
        ))
    }

    async fn load_expense_items(
        &self,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(expenses::Model, Vec<(items::Model, Vec<shares::Model>)>)> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, expense_id, user_id).await?;
            let rows = items::Entity::find()
                .filter(items::Column::ExpenseId.eq(model.id.clone()))
                .order_by_asc(items::Column::Name)
                .order_by_asc(items::Column::Id)
                .find_with_related(shares::Entity)
                .all(&db_tx)
                .await?;
            Ok((model, rows))
        })
    }
}

pub(super) fn item_view(item: ExpenseItem, shares: Vec<Share>, rates: &RateMap) -> ItemView {
    let amount_base = to_base(item.currency, item.amount, rates);
    let unallocated = allocation_gap(amount_base, shares.iter().map(|s| s.computed_value));
    ItemView {
        item,
        amount_base,
        shares,
        unallocated,
    }
}
