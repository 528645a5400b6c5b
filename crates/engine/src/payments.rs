//! Reimbursement payments.
//!
//! A [`Payment`] is money a user sent towards an expense. It only counts for
//! settlement once the expense payer has verified it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
        }
    }

    #[must_use]
    pub fn counts_for_settlement(self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "VERIFIED" => Ok(Self::Verified),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid payment status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub from_user: String,
    pub amount: Money,
    pub status: PaymentStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a pending payment. The amount is rounded to two places and
    /// must be strictly positive.
    pub(crate) fn new(
        expense_id: Uuid,
        from_user: String,
        amount: Money,
        note: Option<String>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "payment amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            expense_id,
            from_user,
            amount,
            status: PaymentStatus::Pending,
            note,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub from_user: String,
    pub amount_minor: i64,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
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
    #[sea_orm(has_one = "super::receipts::Entity")]
    Receipts,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::receipts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Payment> for ActiveModel {
    type Error = EngineError;

    fn try_from(payment: &Payment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(payment.id.to_string()),
            expense_id: ActiveValue::Set(payment.expense_id.to_string()),
            from_user: ActiveValue::Set(payment.from_user.clone()),
            amount_minor: ActiveValue::Set(payment.amount.minor()?),
            status: ActiveValue::Set(payment.status.as_str().to_string()),
            note: ActiveValue::Set(payment.note.clone()),
            created_at: ActiveValue::Set(payment.created_at),
        })
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            expense_id: parse_uuid(&model.expense_id, "expense")?,
            from_user: model.from_user,
            amount: Money::from_minor(model.amount_minor),
            status: PaymentStatus::try_from(model.status.as_str())?,
            note: model.note,
            created_at: model.created_at,
        })
    }
}
