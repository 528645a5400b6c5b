//! Expense items.
//!
//! An [`ExpenseItem`] is one line of an expense with its own amount and
//! currency. Shares split an item among participants.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CurrencyCode, EngineError, Money, ResultEngine, Share,
    util::{model_currency, parse_uuid},
};

/// Input for [`Engine::add_item`](crate::Engine::add_item).
#[derive(Clone, Debug)]
pub struct NewItem {
    pub name: String,
    pub amount: Money,
    /// Defaults to the base currency when omitted.
    pub currency: Option<CurrencyCode>,
}

/// Partial update of an item: only `Some` fields change.
#[derive(Clone, Debug, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub currency: Option<CurrencyCode>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub name: String,
    pub amount: Money,
    pub currency: CurrencyCode,
}

impl ExpenseItem {
    pub(crate) fn new(
        expense_id: Uuid,
        name: String,
        amount: Money,
        currency: CurrencyCode,
    ) -> ResultEngine<Self> {
        validate_item_amount(amount)?;
        Ok(Self {
            id: Uuid::new_v4(),
            expense_id,
            name,
            amount,
            currency,
        })
    }
}

pub(crate) fn validate_item_amount(amount: Money) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "item amount must be >= 0".to_string(),
        ));
    }
    Ok(())
}

/// An item together with its shares, as returned by expense detail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub item: ExpenseItem,
    pub amount_base: Money,
    pub shares: Vec<Share>,
    /// Part of the item not yet covered by shares (negative when
    /// over-allocated).
    pub unallocated: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expense_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub name: String,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
    #[sea_orm(has_many = "super::shares::Entity")]
    Shares,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&ExpenseItem> for ActiveModel {
    type Error = EngineError;

    fn try_from(item: &ExpenseItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(item.id.to_string()),
            expense_id: ActiveValue::Set(item.expense_id.to_string()),
            name: ActiveValue::Set(item.name.clone()),
            amount_minor: ActiveValue::Set(item.amount.minor()?),
            currency: ActiveValue::Set(item.currency.to_string()),
        })
    }
}

impl TryFrom<Model> for ExpenseItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "item")?,
            expense_id: parse_uuid(&model.expense_id, "expense")?,
            name: model.name,
            amount: Money::from_minor(model.amount_minor),
            currency: model_currency(&model.currency)?,
        })
    }
}
