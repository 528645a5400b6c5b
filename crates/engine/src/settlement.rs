//! Settlement of a single expense.
//!
//! [`settle`] works on plain rows already loaded for one expense: what a
//! user owes is the sum of their shares, what they paid is the sum of their
//! verified payments.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Money, Payment, PaymentStatus, Share};

/// The part of a share the calculator needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareRow {
    pub participant_id: String,
    pub computed_value: Option<Money>,
}

impl From<&Share> for ShareRow {
    fn from(share: &Share) -> Self {
        Self {
            participant_id: share.participant_id.clone(),
            computed_value: Some(share.computed_value),
        }
    }
}

/// The part of a payment the calculator needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRow {
    pub from_user: String,
    pub amount: Money,
    pub status: PaymentStatus,
}

impl From<&Payment> for PaymentRow {
    fn from(payment: &Payment) -> Self {
        Self {
            from_user: payment.from_user.clone(),
            amount: payment.amount,
            status: payment.status,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLine {
    pub expense_id: Uuid,
    pub user_id: String,
    pub owed_amount: Money,
    pub paid_amount: Money,
    pub remaining: Money,
    pub settled: bool,
}

/// Computes the settlement line of `user_id` for one expense.
///
/// `remaining` never goes below zero: paying more than owed settles the
/// line and the excess is ignored.
#[must_use]
pub fn settle(
    expense_id: Uuid,
    user_id: &str,
    shares: &[ShareRow],
    payments: &[PaymentRow],
) -> SettlementLine {
    let owed: Money = shares
        .iter()
        .filter(|share| share.participant_id == user_id)
        .map(|share| share.computed_value.unwrap_or(Money::ZERO))
        .sum();
    let paid: Money = payments
        .iter()
        .filter(|payment| payment.from_user == user_id && payment.status.counts_for_settlement())
        .map(|payment| payment.amount)
        .sum();

    SettlementLine {
        expense_id,
        user_id: user_id.to_string(),
        owed_amount: owed,
        paid_amount: paid,
        remaining: (owed - paid).clamp_zero(),
        settled: paid >= owed,
    }
}

/// Everybody with a stake in the expense: share holders and verified payers,
/// sorted and deduplicated.
#[must_use]
pub fn participants(shares: &[ShareRow], payments: &[PaymentRow]) -> Vec<String> {
    let verified = payments
        .iter()
        .filter(|payment| payment.status.counts_for_settlement())
        .map(|payment| payment.from_user.as_str());
    shares
        .iter()
        .map(|share| share.participant_id.as_str())
        .chain(verified)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// Settlement lines for every participant of the expense.
#[must_use]
pub fn settle_all(
    expense_id: Uuid,
    shares: &[ShareRow],
    payments: &[PaymentRow],
) -> Vec<SettlementLine> {
    participants(shares, payments)
        .iter()
        .map(|user| settle(expense_id, user, shares, payments))
        .collect()
}

/// `true` when the expense has at least one participant and all of them are
/// settled.
#[must_use]
pub fn is_fully_settled(lines: &[SettlementLine]) -> bool {
    !lines.is_empty() && lines.iter().all(|line| line.settled)
}
