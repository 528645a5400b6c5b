//! Expense primitives.
//!
//! An [`Expense`] belongs to one group, has one designated payer and carries
//! the rate snapshot frozen when it was created. The snapshot column is
//! written once, by the insert, and never by an update.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CurrencyCode, EngineError, ItemView, Money, RateOrigin, ResultEngine,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    #[default]
    Open,
    Settled,
}

impl ExpenseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Settled => "SETTLED",
        }
    }
}

impl TryFrom<&str> for ExpenseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "OPEN" => Ok(Self::Open),
            "SETTLED" => Ok(Self::Settled),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid expense status: {other}"
            ))),
        }
    }
}

/// Input for [`Engine::new_expense`](crate::Engine::new_expense).
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub name: String,
    /// Who paid the expense up front. Defaults to the acting user.
    pub payer: Option<String>,
    pub amount: Money,
    pub currency: Option<CurrencyCode>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub payer_id: String,
    pub name: String,
    pub amount: Money,
    pub currency: CurrencyCode,
    pub status: ExpenseStatus,
    /// Frozen rate map in its stored JSON form.
    pub rate_snapshot: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub(crate) fn new(
        group_id: Uuid,
        payer_id: String,
        name: String,
        amount: Money,
        currency: CurrencyCode,
        rate_snapshot: String,
        created_by: &str,
    ) -> ResultEngine<Self> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "expense amount must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            payer_id,
            name,
            amount,
            currency,
            status: ExpenseStatus::Open,
            rate_snapshot: Some(rate_snapshot),
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// An expense with its items and their shares.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDetail {
    pub expense: Expense,
    pub items: Vec<ItemView>,
    /// Base-currency total of all items under the frozen snapshot.
    pub items_total: Money,
    pub rates_origin: RateOrigin,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub payer_id: String,
    pub name: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub rate_snapshot: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
    #[sea_orm(has_many = "super::items::Entity")]
    Items,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Expense> for ActiveModel {
    type Error = EngineError;

    fn try_from(expense: &Expense) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(expense.id.to_string()),
            group_id: ActiveValue::Set(expense.group_id.to_string()),
            payer_id: ActiveValue::Set(expense.payer_id.clone()),
            name: ActiveValue::Set(expense.name.clone()),
            amount_minor: ActiveValue::Set(expense.amount.minor()?),
            currency: ActiveValue::Set(expense.currency.to_string()),
            status: ActiveValue::Set(expense.status.as_str().to_string()),
            rate_snapshot: ActiveValue::Set(expense.rate_snapshot.clone()),
            created_by: ActiveValue::Set(expense.created_by.clone()),
            created_at: ActiveValue::Set(expense.created_at),
        })
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            group_id: parse_uuid(&model.group_id, "group")?,
            payer_id: model.payer_id,
            name: model.name,
            amount: Money::from_minor(model.amount_minor),
            currency: model_currency(&model.currency)?,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            rate_snapshot: model.rate_snapshot,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
