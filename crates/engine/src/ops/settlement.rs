use std::collections::HashMap;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    ExpenseLedger, ExpenseStatus, Money, ResultEngine, SettlementLine, expenses, items, payments,
    settlement::{ShareRow, is_fully_settled, settle, settle_all},
    shares,
    util::parse_uuid,
};

use super::{Engine, with_tx};

impl Engine {
    /// Settlement of `target_user` on one expense.
    pub async fn settlement(
        &self,
        expense_id: Uuid,
        target_user: &str,
        user_id: &str,
    ) -> ResultEngine<SettlementLine> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id, user_id).await?;
            self.require_member_of(&db_tx, &expense.group_id, target_user)
                .await?;
            let ledgers = self.load_ledgers(&db_tx, vec![expense]).await?;
            Ok(ledgers
                .first()
                .map(|ledger| settle(expense_id, target_user, &ledger.shares, &ledger.payments))
                .unwrap_or_else(|| settle(expense_id, target_user, &[], &[])))
        })
    }

    /// Settlement of every participant of an expense, sorted by user.
    pub async fn all_settlements(
        &self,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<SettlementLine>> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id, user_id).await?;
            let ledgers = self.load_ledgers(&db_tx, vec![expense]).await?;
            Ok(ledgers
                .first()
                .map(|ledger| settle_all(expense_id, &ledger.shares, &ledger.payments))
                .unwrap_or_default())
        })
    }

    /// Loads shares and payments of the given expenses, one ledger per
    /// expense in input order.
    pub(super) async fn load_ledgers(
        &self,
        db: &DatabaseTransaction,
        expenses: Vec<expenses::Model>,
    ) -> ResultEngine<Vec<ExpenseLedger>> {
        if expenses.is_empty() {
            return Ok(Vec::new());
        }
        let expense_ids: Vec<String> = expenses.iter().map(|e| e.id.clone()).collect();

        let item_rows = items::Entity::find()
            .filter(items::Column::ExpenseId.is_in(expense_ids.clone()))
            .all(db)
            .await?;
        let item_expense: HashMap<String, String> = item_rows
            .into_iter()
            .map(|item| (item.id, item.expense_id))
            .collect();
        let share_rows = shares::Entity::find()
            .filter(shares::Column::ItemId.is_in(item_expense.keys().cloned()))
            .all(db)
            .await?;
        let payment_rows = payments::Entity::find()
            .filter(payments::Column::ExpenseId.is_in(expense_ids))
            .order_by_asc(payments::Column::CreatedAt)
            .all(db)
            .await?;

        let mut ledgers = Vec::with_capacity(expenses.len());
        let mut index = HashMap::with_capacity(expenses.len());
        for expense in expenses {
            index.insert(expense.id.clone(), ledgers.len());
            ledgers.push(ExpenseLedger::new(
                parse_uuid(&expense.id, "expense")?,
                parse_uuid(&expense.group_id, "group")?,
                Some(expense.payer_id),
            ));
        }

        for share in share_rows {
            let Some(slot) = item_expense
                .get(&share.item_id)
                .and_then(|expense_id| index.get(expense_id))
            else {
                continue;
            };
            ledgers[*slot].shares.push(ShareRow {
                participant_id: share.participant_id,
                computed_value: share.computed_value_minor.map(Money::from_minor),
            });
        }
        for payment in payment_rows {
            let Some(slot) = index.get(&payment.expense_id) else {
                continue;
            };
            ledgers[*slot].push_stored_payment(
                payment.from_user,
                Money::from_minor(payment.amount_minor),
                &payment.status,
            );
        }

        Ok(ledgers)
    }

    /// Re-derives the expense status after its shares or payments changed.
    pub(super) async fn refresh_expense_status(
        &self,
        db: &DatabaseTransaction,
        expense: &expenses::Model,
    ) -> ResultEngine<ExpenseStatus> {
        let expense_id = parse_uuid(&expense.id, "expense")?;
        let ledgers = self.load_ledgers(db, vec![expense.clone()]).await?;
        // The payer's own share is covered by the bill they paid.
        let lines: Vec<_> = ledgers
            .first()
            .map(|ledger| settle_all(expense_id, &ledger.shares, &ledger.payments))
            .unwrap_or_default()
            .into_iter()
            .filter(|line| line.user_id != expense.payer_id)
            .collect();
        let status = if is_fully_settled(&lines) {
            ExpenseStatus::Settled
        } else {
            ExpenseStatus::Open
        };

        if status.as_str() != expense.status {
            expenses::ActiveModel {
                id: ActiveValue::Unchanged(expense.id.clone()),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            }
            .update(db)
            .await?;
            tracing::info!(expense_id = %expense.id, status = status.as_str(), "expense status changed");
        }
        Ok(status)
    }
}
