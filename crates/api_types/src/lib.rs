//! JSON bodies of the HTTP API.
//!
//! Amounts sent by clients are decimal strings (`"10.50"`, `"10,50"`) and are
//! validated by the server. Amounts returned by the server are decimal
//! strings with two fractional digits.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the rates used for a conversion came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    Snapshot,
    Live,
    /// No rates were available; every currency was converted 1:1.
    Fallback,
}

/// Error body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<String>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum ExpenseStatus {
        Open,
        Settled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub name: String,
        /// Defaults to the authenticated user.
        pub payer: Option<String>,
        pub amount: String,
        /// ISO 4217 code, defaults to `THB`.
        pub currency: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: Uuid,
        /// `fallback` means the expense froze 1:1 rates.
        pub rates_origin: RateOrigin,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub payer_id: String,
        pub name: String,
        pub amount: Decimal,
        pub currency: String,
        pub status: ExpenseStatus,
        /// Frozen rates, base units per one unit of each currency.
        pub rates: Option<BTreeMap<String, Decimal>>,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseDetail {
        pub expense: ExpenseView,
        pub items: Vec<super::item::ItemView>,
        pub items_total: Decimal,
        pub rates_origin: RateOrigin,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseTotal {
        pub total: Decimal,
        pub currency: String,
    }
}

pub mod item {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub name: String,
        pub amount: String,
        pub currency: Option<String>,
    }

    /// Partial update: omitted fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItemUpdate {
        pub name: Option<String>,
        pub amount: Option<String>,
        pub currency: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub expense_id: Uuid,
        pub name: String,
        pub amount: Decimal,
        pub currency: String,
        pub amount_base: Decimal,
        /// Negative when the shares exceed the item.
        pub unallocated: Decimal,
        pub shares: Vec<super::share::ShareView>,
    }
}

pub mod share {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ShareBasis {
        Fixed,
        Percent,
    }

    /// Exactly one of `value` and `percent` must be present.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareNew {
        pub participant: String,
        /// Amount in the item's currency.
        pub value: Option<String>,
        /// Percentage of the item, `0..=100`.
        pub percent: Option<String>,
    }

    /// Exactly one of `value` and `percent` must be present; the other stored
    /// field is kept.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ShareUpdate {
        pub value: Option<String>,
        pub percent: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub id: Uuid,
        pub item_id: Uuid,
        pub participant: String,
        pub value: Option<Decimal>,
        pub percent: Option<Decimal>,
        pub basis: Option<ShareBasis>,
        /// Value in base currency.
        pub computed_value: Decimal,
    }
}

pub mod payment {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum PaymentStatus {
        Pending,
        Verified,
        Rejected,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub amount: String,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub expense_id: Uuid,
        pub from_user: String,
        pub amount: Decimal,
        pub status: PaymentStatus,
        pub note: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentsResponse {
        pub payments: Vec<PaymentView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptNew {
        pub file_name: String,
        pub content_type: String,
        /// Where the uploaded file is stored.
        pub storage_key: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptView {
        pub id: Uuid,
        pub payment_id: Uuid,
        pub file_name: String,
        pub content_type: String,
        pub storage_key: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub expense_id: Uuid,
        pub user_id: String,
        pub owed_amount: Decimal,
        pub paid_amount: Decimal,
        pub remaining: Decimal,
        pub settled: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementsResponse {
        pub settlements: Vec<SettlementView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum BalanceDirection {
        YouOwe,
        OwesYou,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceLineView {
        pub direction: BalanceDirection,
        pub counterparty_user_id: String,
        pub group_id: Uuid,
        pub expense_id: Uuid,
        pub remaining: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CounterpartyView {
        pub counterparty_user_id: String,
        pub you_owe: Decimal,
        pub owes_you: Decimal,
        pub net: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub lines: Vec<BalanceLineView>,
        pub counterparties: Vec<CounterpartyView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub you_owe_total: Decimal,
        pub you_are_owed_total: Decimal,
    }
}

pub mod rates {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RatesView {
        pub base: String,
        pub origin: RateOrigin,
        /// Base units per one unit of each currency.
        pub rates: BTreeMap<String, Decimal>,
    }
}
