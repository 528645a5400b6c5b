//! Cross-expense balances of one user.
//!
//! Every expense the user is involved in contributes lines towards the
//! expense payer: the payer is owed each participant's remaining, every other
//! participant owes the payer their own remaining. A debt therefore shows up
//! once from each side and never twice from the same side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Money, PaymentStatus,
    settlement::{PaymentRow, ShareRow, participants, settle},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceDirection {
    YouOwe,
    OwesYou,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLine {
    pub direction: BalanceDirection,
    pub counterparty_user_id: String,
    pub group_id: Uuid,
    pub expense_id: Uuid,
    pub remaining: Money,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub you_owe_total: Money,
    pub you_are_owed_total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyBalance {
    pub counterparty_user_id: String,
    pub you_owe: Money,
    pub owes_you: Money,
    /// `owes_you - you_owe`: positive when the counterparty owes you overall.
    pub net: Money,
}

/// Everything loaded for one expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseLedger {
    pub expense_id: Uuid,
    pub group_id: Uuid,
    pub payer_id: Option<String>,
    pub shares: Vec<ShareRow>,
    pub payments: Vec<PaymentRow>,
}

impl ExpenseLedger {
    #[must_use]
    pub fn new(expense_id: Uuid, group_id: Uuid, payer_id: Option<String>) -> Self {
        Self {
            expense_id,
            group_id,
            payer_id: payer_id.filter(|payer| !payer.trim().is_empty()),
            shares: Vec::new(),
            payments: Vec::new(),
        }
    }

    /// Adds a payment read from storage. A status outside the known set is
    /// an integrity anomaly: it is logged and the payment is left out.
    pub fn push_stored_payment(&mut self, from_user: String, amount: Money, status: &str) {
        match PaymentStatus::try_from(status) {
            Ok(status) => self.payments.push(PaymentRow {
                from_user,
                amount,
                status,
            }),
            Err(_) => tracing::warn!(
                expense_id = %self.expense_id,
                status,
                "skipping payment with unknown status"
            ),
        }
    }

    /// Whether `user_id` has a stake in this expense.
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.payer_id.as_deref() == Some(user_id)
            || self.shares.iter().any(|s| s.participant_id == user_id)
            || self
                .payments
                .iter()
                .any(|p| p.from_user == user_id && p.status.counts_for_settlement())
    }
}

/// All lines of `user_id`, including the settled ones.
///
/// The summary is computed over these so a zero line adds zero rather than
/// disappearing from the arithmetic.
#[must_use]
pub fn candidate_lines(user_id: &str, ledgers: &[ExpenseLedger]) -> Vec<BalanceLine> {
    let mut lines = Vec::new();
    for ledger in ledgers.iter().filter(|ledger| ledger.involves(user_id)) {
        let Some(payer) = ledger.payer_id.as_deref() else {
            tracing::warn!(
                expense_id = %ledger.expense_id,
                "skipping expense without payer"
            );
            continue;
        };

        if payer == user_id {
            for counterparty in participants(&ledger.shares, &ledger.payments) {
                if counterparty == user_id {
                    continue;
                }
                let line = settle(
                    ledger.expense_id,
                    &counterparty,
                    &ledger.shares,
                    &ledger.payments,
                );
                lines.push(BalanceLine {
                    direction: BalanceDirection::OwesYou,
                    counterparty_user_id: counterparty,
                    group_id: ledger.group_id,
                    expense_id: ledger.expense_id,
                    remaining: line.remaining,
                });
            }
        } else {
            let line = settle(ledger.expense_id, user_id, &ledger.shares, &ledger.payments);
            lines.push(BalanceLine {
                direction: BalanceDirection::YouOwe,
                counterparty_user_id: payer.to_string(),
                group_id: ledger.group_id,
                expense_id: ledger.expense_id,
                remaining: line.remaining,
            });
        }
    }
    lines
}

/// Outstanding lines of `user_id`; settled lines are left out.
#[must_use]
pub fn balance_lines(user_id: &str, ledgers: &[ExpenseLedger]) -> Vec<BalanceLine> {
    candidate_lines(user_id, ledgers)
        .into_iter()
        .filter(|line| !line.remaining.is_zero())
        .collect()
}

#[must_use]
pub fn summarize(lines: &[BalanceLine]) -> BalanceSummary {
    lines
        .iter()
        .fold(BalanceSummary::default(), |mut summary, line| {
            match line.direction {
                BalanceDirection::YouOwe => summary.you_owe_total += line.remaining,
                BalanceDirection::OwesYou => summary.you_are_owed_total += line.remaining,
            }
            summary
        })
}

/// Rolls lines up per counterparty, sorted by counterparty.
#[must_use]
pub fn by_counterparty(lines: &[BalanceLine]) -> Vec<CounterpartyBalance> {
    let mut totals: BTreeMap<&str, (Money, Money)> = BTreeMap::new();
    for line in lines {
        let entry = totals
            .entry(line.counterparty_user_id.as_str())
            .or_insert((Money::ZERO, Money::ZERO));
        match line.direction {
            BalanceDirection::YouOwe => entry.0 += line.remaining,
            BalanceDirection::OwesYou => entry.1 += line.remaining,
        }
    }
    totals
        .into_iter()
        .map(|(counterparty, (you_owe, owes_you))| CounterpartyBalance {
            counterparty_user_id: counterparty.to_string(),
            you_owe,
            owes_you,
            net: owes_you - you_owe,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(user: &str, minor: i64) -> ShareRow {
        ShareRow {
            participant_id: user.to_string(),
            computed_value: Some(Money::from_minor(minor)),
        }
    }

    fn verified(user: &str, minor: i64) -> PaymentRow {
        PaymentRow {
            from_user: user.to_string(),
            amount: Money::from_minor(minor),
            status: PaymentStatus::Verified,
        }
    }

    fn dinner() -> ExpenseLedger {
        let mut ledger = ExpenseLedger::new(Uuid::new_v4(), Uuid::new_v4(), Some("alice".into()));
        ledger.shares = vec![share("alice", 4_000), share("bob", 3_000), share("carol", 3_000)];
        ledger.payments = vec![verified("carol", 3_000)];
        ledger
    }

    #[test]
    fn payer_is_owed_by_each_participant() {
        let ledgers = [dinner()];
        let lines = balance_lines("alice", &ledgers);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].direction, BalanceDirection::OwesYou);
        assert_eq!(lines[0].counterparty_user_id, "bob");
        assert_eq!(lines[0].remaining, Money::from_minor(3_000));
    }

    #[test]
    fn participant_owes_the_payer_once() {
        let ledgers = [dinner()];
        let lines = balance_lines("bob", &ledgers);
        assert_eq!(
            lines,
            [BalanceLine {
                direction: BalanceDirection::YouOwe,
                counterparty_user_id: "alice".to_string(),
                group_id: ledgers[0].group_id,
                expense_id: ledgers[0].expense_id,
                remaining: Money::from_minor(3_000),
            }]
        );
    }

    #[test]
    fn settled_lines_are_hidden_but_summary_holds() {
        let ledgers = [dinner()];
        assert!(balance_lines("carol", &ledgers).is_empty());
        assert_eq!(candidate_lines("carol", &ledgers).len(), 1);

        let summary = summarize(&candidate_lines("carol", &ledgers));
        assert_eq!(summary, BalanceSummary::default());
        assert_eq!(summary.you_owe_total.to_string(), "0.00");

        let alice = summarize(&candidate_lines("alice", &ledgers));
        assert_eq!(alice.you_are_owed_total, Money::from_minor(3_000));
        assert_eq!(alice.you_owe_total, Money::ZERO);
    }

    #[test]
    fn uninvolved_user_has_no_lines() {
        assert!(candidate_lines("dave", &[dinner()]).is_empty());
    }

    #[test]
    fn payment_without_share_is_a_zero_line() {
        let mut ledger = dinner();
        ledger.payments.push(verified("dave", 1_000));
        let ledgers = [ledger];

        let candidates = candidate_lines("dave", &ledgers);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].direction, BalanceDirection::YouOwe);
        assert_eq!(candidates[0].counterparty_user_id, "alice");
        assert!(candidates[0].remaining.is_zero());

        assert!(balance_lines("dave", &ledgers).is_empty());
        assert_eq!(summarize(&candidates), BalanceSummary::default());
    }

    #[test]
    fn anomalies_are_skipped() {
        let mut ledger = ExpenseLedger::new(Uuid::new_v4(), Uuid::new_v4(), Some(" ".into()));
        ledger.shares = vec![share("bob", 100)];
        assert_eq!(ledger.payer_id, None);
        assert!(candidate_lines("bob", &[ledger.clone()]).is_empty());

        ledger.push_stored_payment("bob".into(), Money::from_minor(100), "REFUNDED");
        ledger.push_stored_payment("bob".into(), Money::from_minor(100), "PENDING");
        assert_eq!(ledger.payments.len(), 1);
    }

    #[test]
    fn counterparties_roll_up_with_net() {
        let mut lunch = ExpenseLedger::new(Uuid::new_v4(), Uuid::new_v4(), Some("bob".into()));
        lunch.shares = vec![share("alice", 1_000)];
        let ledgers = [dinner(), lunch];

        let rolled = by_counterparty(&balance_lines("alice", &ledgers));
        assert_eq!(
            rolled,
            [CounterpartyBalance {
                counterparty_user_id: "bob".to_string(),
                you_owe: Money::from_minor(1_000),
                owes_you: Money::from_minor(3_000),
                net: Money::from_minor(2_000),
            }]
        );
    }
}
