use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Money, NewReceipt, Payment, PaymentStatus, Receipt, ResultEngine, expenses,
    payments, receipts,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Records a payment from the acting user towards an expense. The payment
    /// waits as `PENDING` until the expense payer verifies it.
    pub async fn record_payment(
        &self,
        expense_id: Uuid,
        amount: Money,
        note: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<Payment> {
        let payment = Payment::new(
            expense_id,
            user_id.to_string(),
            amount,
            normalize_optional_text(note),
        )?;

        with_tx!(self, |db_tx| {
            self.require_expense(&db_tx, expense_id, user_id).await?;
            payments::ActiveModel::try_from(&payment)?
                .insert(&db_tx)
                .await?;
            tracing::info!(
                expense_id = %expense_id,
                payment_id = %payment.id,
                from_user = user_id,
                "payment recorded"
            );
            Ok(payment)
        })
    }

    /// Marks a pending payment as verified. Only the expense payer may do it.
    pub async fn verify_payment(
        &self,
        expense_id: Uuid,
        payment_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Payment> {
        self.transition_payment(expense_id, payment_id, PaymentStatus::Verified, user_id)
            .await
    }

    /// Marks a pending payment as rejected. Only the expense payer may do it.
    pub async fn reject_payment(
        &self,
        expense_id: Uuid,
        payment_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Payment> {
        self.transition_payment(expense_id, payment_id, PaymentStatus::Rejected, user_id)
            .await
    }

    async fn transition_payment(
        &self,
        expense_id: Uuid,
        payment_id: Uuid,
        status: PaymentStatus,
        user_id: &str,
    ) -> ResultEngine<Payment> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id, user_id).await?;
            let model = self
                .require_payment_in_expense(&db_tx, expense_id, payment_id)
                .await?;
            if expense.payer_id != user_id {
                return Err(EngineError::Forbidden(
                    "only the expense payer can review payments".to_string(),
                ));
            }

            let mut payment = Payment::try_from(model)?;
            if payment.status != PaymentStatus::Pending {
                return Err(EngineError::InvalidAmount(format!(
                    "payment is already {}",
                    payment.status.as_str()
                )));
            }
            payment.status = status;
            payments::ActiveModel {
                id: ActiveValue::Unchanged(payment.id.to_string()),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            self.refresh_expense_status(&db_tx, &expense).await?;
            tracing::info!(
                expense_id = %expense_id,
                payment_id = %payment_id,
                status = status.as_str(),
                "payment reviewed"
            );
            Ok(payment)
        })
    }

    /// Deletes a payment and its receipt. Allowed to the sender and to the
    /// expense payer.
    pub async fn delete_payment(
        &self,
        expense_id: Uuid,
        payment_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id, user_id).await?;
            let payment = self
                .require_payment_in_expense(&db_tx, expense_id, payment_id)
                .await?;
            require_sender_or_payer(&expense, &payment, user_id)?;

            receipts::Entity::delete_many()
                .filter(receipts::Column::PaymentId.eq(payment.id.clone()))
                .exec(&db_tx)
                .await?;
            payments::Entity::delete_by_id(payment.id).exec(&db_tx).await?;
            self.refresh_expense_status(&db_tx, &expense).await?;
            Ok(())
        })
    }

    /// Payments of an expense, oldest first.
    ///
    /// Rows with a status outside the known set are logged and left out.
    pub async fn list_payments(
        &self,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<Payment>> {
        with_tx!(self, |db_tx| {
            self.require_expense(&db_tx, expense_id, user_id).await?;
            let rows = payments::Entity::find()
                .filter(payments::Column::ExpenseId.eq(expense_id.to_string()))
                .order_by_asc(payments::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                if PaymentStatus::try_from(row.status.as_str()).is_err() {
                    tracing::warn!(payment_id = %row.id, status = %row.status, "skipping payment with unknown status");
                    continue;
                }
                out.push(Payment::try_from(row)?);
            }
            Ok(out)
        })
    }

    /// Attaches receipt metadata to a payment. A payment has at most one
    /// receipt.
    pub async fn attach_receipt(
        &self,
        expense_id: Uuid,
        payment_id: Uuid,
        new: NewReceipt,
        user_id: &str,
    ) -> ResultEngine<Receipt> {
        let file_name = normalize_required_name(&new.file_name, "receipt file")?;
        let storage_key = normalize_required_name(&new.storage_key, "receipt storage")?;
        let content_type = normalize_optional_text(Some(&new.content_type))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id, user_id).await?;
            let payment = self
                .require_payment_in_expense(&db_tx, expense_id, payment_id)
                .await?;
            require_sender_or_payer(&expense, &payment, user_id)?;

            let exists = receipts::Entity::find()
                .filter(receipts::Column::PaymentId.eq(payment.id.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(format!(
                    "receipt of payment {payment_id}"
                )));
            }

            let receipt = Receipt {
                id: Uuid::new_v4(),
                payment_id,
                file_name,
                content_type,
                storage_key,
                created_at: Utc::now(),
            };
            receipts::ActiveModel::from(&receipt).insert(&db_tx).await?;
            Ok(receipt)
        })
    }

    pub async fn receipt(
        &self,
        expense_id: Uuid,
        payment_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Receipt> {
        with_tx!(self, |db_tx| {
            self.require_expense(&db_tx, expense_id, user_id).await?;
            let payment = self
                .require_payment_in_expense(&db_tx, expense_id, payment_id)
                .await?;
            let model = receipts::Entity::find()
                .filter(receipts::Column::PaymentId.eq(payment.id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("receipt not exists".to_string()))?;
            Receipt::try_from(model)
        })
    }
}

fn require_sender_or_payer(
    expense: &expenses::Model,
    payment: &payments::Model,
    user_id: &str,
) -> ResultEngine<()> {
    if payment.from_user != user_id && expense.payer_id != user_id {
        return Err(EngineError::Forbidden(
            "only the sender or the expense payer can change this payment".to_string(),
        ));
    }
    Ok(())
}
