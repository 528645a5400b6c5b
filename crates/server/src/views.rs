//! Engine values rendered as API bodies.

use std::collections::BTreeMap;

use api_types::{
    RateOrigin,
    balance::{BalanceDirection, BalanceLineView, CounterpartyView, SummaryView},
    expense::{ExpenseStatus, ExpenseView},
    group::GroupView,
    item::ItemView,
    payment::{PaymentStatus, PaymentView, ReceiptView},
    settlement::SettlementView,
    share::{ShareBasis, ShareView},
};
use engine::RateMap;
use rust_decimal::Decimal;

pub(crate) fn rate_origin(origin: engine::RateOrigin) -> RateOrigin {
    match origin {
        engine::RateOrigin::Snapshot => RateOrigin::Snapshot,
        engine::RateOrigin::Live => RateOrigin::Live,
        engine::RateOrigin::Fallback => RateOrigin::Fallback,
    }
}

pub(crate) fn rates(rates: &RateMap) -> BTreeMap<String, Decimal> {
    rates
        .iter()
        .map(|(currency, rate)| (currency.to_string(), *rate))
        .collect()
}

pub(crate) fn group(group: engine::Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        created_by: group.created_by,
        created_at: group.created_at,
    }
}

pub(crate) fn expense(expense: engine::Expense) -> ExpenseView {
    // An unreadable snapshot is reported as missing.
    let snapshot = expense
        .rate_snapshot
        .as_deref()
        .and_then(|raw| RateMap::parse_snapshot(raw).ok())
        .map(|map| rates(&map));

    ExpenseView {
        id: expense.id,
        group_id: expense.group_id,
        payer_id: expense.payer_id,
        name: expense.name,
        amount: expense.amount.into(),
        currency: expense.currency.to_string(),
        status: match expense.status {
            engine::ExpenseStatus::Open => ExpenseStatus::Open,
            engine::ExpenseStatus::Settled => ExpenseStatus::Settled,
        },
        rates: snapshot,
        created_by: expense.created_by,
        created_at: expense.created_at,
    }
}

pub(crate) fn share(share: engine::Share) -> ShareView {
    ShareView {
        id: share.id,
        item_id: share.item_id,
        participant: share.participant_id,
        value: share.value.map(Decimal::from),
        percent: share.percent,
        basis: share.basis.map(|basis| match basis {
            engine::ShareBasis::Fixed => ShareBasis::Fixed,
            engine::ShareBasis::Percent => ShareBasis::Percent,
        }),
        computed_value: share.computed_value.into(),
    }
}

pub(crate) fn item(view: engine::ItemView) -> ItemView {
    ItemView {
        id: view.item.id,
        expense_id: view.item.expense_id,
        name: view.item.name,
        amount: view.item.amount.into(),
        currency: view.item.currency.to_string(),
        amount_base: view.amount_base.into(),
        unallocated: view.unallocated.into(),
        shares: view.shares.into_iter().map(share).collect(),
    }
}

pub(crate) fn payment(payment: engine::Payment) -> PaymentView {
    PaymentView {
        id: payment.id,
        expense_id: payment.expense_id,
        from_user: payment.from_user,
        amount: payment.amount.into(),
        status: match payment.status {
            engine::PaymentStatus::Pending => PaymentStatus::Pending,
            engine::PaymentStatus::Verified => PaymentStatus::Verified,
            engine::PaymentStatus::Rejected => PaymentStatus::Rejected,
        },
        note: payment.note,
        created_at: payment.created_at,
    }
}

pub(crate) fn receipt(receipt: engine::Receipt) -> ReceiptView {
    ReceiptView {
        id: receipt.id,
        payment_id: receipt.payment_id,
        file_name: receipt.file_name,
        content_type: receipt.content_type,
        storage_key: receipt.storage_key,
        created_at: receipt.created_at,
    }
}

pub(crate) fn settlement(line: engine::SettlementLine) -> SettlementView {
    SettlementView {
        expense_id: line.expense_id,
        user_id: line.user_id,
        owed_amount: line.owed_amount.into(),
        paid_amount: line.paid_amount.into(),
        remaining: line.remaining.into(),
        settled: line.settled,
    }
}

pub(crate) fn balance_line(line: engine::BalanceLine) -> BalanceLineView {
    BalanceLineView {
        direction: match line.direction {
            engine::BalanceDirection::YouOwe => BalanceDirection::YouOwe,
            engine::BalanceDirection::OwesYou => BalanceDirection::OwesYou,
        },
        counterparty_user_id: line.counterparty_user_id,
        group_id: line.group_id,
        expense_id: line.expense_id,
        remaining: line.remaining.into(),
    }
}

pub(crate) fn counterparty(balance: engine::CounterpartyBalance) -> CounterpartyView {
    CounterpartyView {
        counterparty_user_id: balance.counterparty_user_id,
        you_owe: balance.you_owe.into(),
        owes_you: balance.owes_you.into(),
        net: balance.net.into(),
    }
}

pub(crate) fn summary(summary: engine::BalanceSummary) -> SummaryView {
    SummaryView {
        you_owe_total: summary.you_owe_total.into(),
        you_are_owed_total: summary.you_are_owed_total.into(),
    }
}
