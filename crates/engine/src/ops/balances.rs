use std::collections::BTreeSet;

use sea_orm::{Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    BalanceLine, BalanceSummary, CounterpartyBalance, ExpenseLedger, PaymentStatus, ResultEngine,
    balances::{balance_lines, by_counterparty, candidate_lines, summarize},
    expenses, items, payments, shares,
};

use super::{Engine, with_tx};

impl Engine {
    /// Outstanding balance lines of `user_id` across all expenses.
    pub async fn balances(&self, user_id: &str) -> ResultEngine<Vec<BalanceLine>> {
        with_tx!(self, |db_tx| {
            let ledgers = self.user_ledgers(&db_tx, user_id).await?;
            Ok(balance_lines(user_id, &ledgers))
        })
    }

    /// Outstanding balances of `user_id` rolled up per counterparty.
    pub async fn balances_by_counterparty(
        &self,
        user_id: &str,
    ) -> ResultEngine<Vec<CounterpartyBalance>> {
        let lines = self.balances(user_id).await?;
        Ok(by_counterparty(&lines))
    }

    /// Totals of what `user_id` owes and is owed.
    pub async fn summary(&self, user_id: &str) -> ResultEngine<BalanceSummary> {
        with_tx!(self, |db_tx| {
            let ledgers = self.user_ledgers(&db_tx, user_id).await?;
            Ok(summarize(&candidate_lines(user_id, &ledgers)))
        })
    }

    /// Ledgers of every expense the user pays for, has a share in or sent a
    /// verified payment to.
    async fn user_ledgers(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<ExpenseLedger>> {
        let mut expense_ids = BTreeSet::new();

        let shared = shares::Entity::find()
            .filter(shares::Column::ParticipantId.eq(user_id))
            .find_also_related(items::Entity)
            .all(db)
            .await?;
        expense_ids.extend(
            shared
                .into_iter()
                .filter_map(|(_, item)| item.map(|item| item.expense_id)),
        );

        let paid = payments::Entity::find()
            .filter(payments::Column::FromUser.eq(user_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Verified.as_str()))
            .all(db)
            .await?;
        expense_ids.extend(paid.into_iter().map(|payment| payment.expense_id));

        let expenses = expenses::Entity::find()
            .filter(
                Condition::any()
                    .add(expenses::Column::PayerId.eq(user_id))
                    .add(expenses::Column::Id.is_in(expense_ids)),
            )
            .order_by_asc(expenses::Column::CreatedAt)
            .all(db)
            .await?;

        self.load_ledgers(db, expenses).await
    }
}
