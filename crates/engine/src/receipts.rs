//! Payment receipts.
//!
//! The engine stores receipt metadata only; the file itself lives wherever
//! `storage_key` points. A payment has at most one receipt and the receipt
//! goes away with its payment.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// Input for [`Engine::attach_receipt`](crate::Engine::attach_receipt).
#[derive(Clone, Debug)]
pub struct NewReceipt {
    pub file_name: String,
    pub content_type: String,
    pub storage_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub payment_id: String,
    pub file_name: String,
    pub content_type: String,
    pub storage_key: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Payments,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Receipt> for ActiveModel {
    fn from(receipt: &Receipt) -> Self {
        Self {
            id: ActiveValue::Set(receipt.id.to_string()),
            payment_id: ActiveValue::Set(receipt.payment_id.to_string()),
            file_name: ActiveValue::Set(receipt.file_name.clone()),
            content_type: ActiveValue::Set(receipt.content_type.clone()),
            storage_key: ActiveValue::Set(receipt.storage_key.clone()),
            created_at: ActiveValue::Set(receipt.created_at),
        }
    }
}

impl TryFrom<Model> for Receipt {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "receipt")?,
            payment_id: parse_uuid(&model.payment_id, "payment")?,
            file_name: model.file_name,
            content_type: model.content_type,
            storage_key: model.storage_key,
            created_at: model.created_at,
        })
    }
}
