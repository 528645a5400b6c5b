//! Settlement and multi-currency ledger engine for shared expenses.
//!
//! The pure core is split in five stages, each a plain function over its
//! inputs:
//!
//! - [`rates`]: which exchange rates apply to an expense ([`RateResolver`])
//! - [`money`]: fixed-point amounts and base-currency conversion
//! - [`shares`]: per-item share allocation ([`ShareInput`])
//! - [`settlement`]: owed / paid / remaining per user and expense
//! - [`balances`]: "you owe" / "owes you" lines and the dashboard summary
//!
//! [`Engine`] loads rows from storage inside a transaction, runs the stages
//! and persists the results. Every operation takes the acting user's username
//! explicitly.

pub use balances::{
    BalanceDirection, BalanceLine, BalanceSummary, CounterpartyBalance, ExpenseLedger,
};
pub use currency::{CurrencyCode, currency_or_base};
pub use error::{EngineError, RateError};
pub use expenses::{Expense, ExpenseDetail, ExpenseStatus, NewExpense};
pub use groups::Group;
pub use items::{ExpenseItem, ItemPatch, ItemView, NewItem};
pub use money::{Money, items_total_base, to_base};
pub use ops::{Engine, EngineBuilder};
pub use payments::{Payment, PaymentStatus};
pub use rates::{LiveRates, RateMap, RateOrigin, RateResolver, ResolvedRates, StaticRates};
pub use receipts::{NewReceipt, Receipt};
pub use settlement::{PaymentRow, SettlementLine, ShareRow};
pub use shares::{Share, ShareBasis, ShareInput, SharePatch};

pub mod balances;
mod currency;
mod error;
mod expenses;
mod group_memberships;
mod groups;
mod items;
pub mod money;
mod ops;
mod payments;
pub mod rates;
mod receipts;
pub mod settlement;
pub mod shares;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
