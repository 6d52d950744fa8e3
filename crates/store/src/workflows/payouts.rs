//! Withdrawal requests, admin decisions and bank details.

use chrono::Utc;
use leadboard_core::affiliate::normalize_username;
use leadboard_core::withdrawal::{
    BankDetails, Decision, WithdrawalError, WithdrawalRequest, WithdrawalService, WithdrawalStatus,
};
use leadboard_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::Workbook;

/// An affiliate's withdrawal request.
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalInput {
    /// Amount to withdraw.
    pub amount: Decimal,
    /// Bank account to pay into. Replaces the stored details once the
    /// request is accepted.
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
}

impl Workbook {
    /// Files a pending withdrawal for an affiliate.
    ///
    /// # Errors
    ///
    /// - `Validation` when the amount is not positive or bank details are
    ///   missing or malformed
    /// - `NotFound` when `username` has no credential
    /// - `Conflict` when another request is still pending
    /// - `BusinessRule` when the amount exceeds the available balance or the
    ///   stored withdrawal totals are out of range
    /// - `ExternalService` when a spreadsheet call fails
    pub async fn request_withdrawal(
        &self,
        username: &str,
        input: WithdrawalInput,
    ) -> AppResult<WithdrawalRequest> {
        let username = normalize_username(username);
        if input.amount <= Decimal::ZERO {
            return Err(WithdrawalError::NonPositiveAmount.into());
        }

        let _guard = self.lock().await;

        let credential = self.approved(&username).await?;

        let (bank, replaces_stored) = match input.bank_details {
            Some(inline) => (inline.validated()?, true),
            None => (
                self.bank_details
                    .find(&credential.username)
                    .await?
                    .ok_or(WithdrawalError::MissingBankDetails)?
                    .validated()?,
                false,
            ),
        };

        let snapshot = self.snapshot_for(&credential).await?;
        let has_pending = self.has_pending(&credential.username).await?;
        WithdrawalService::validate_request(input.amount, snapshot.balance.available, has_pending)?;

        if replaces_stored {
            self.bank_details.upsert(&credential.username, &bank).await?;
        }

        let request = WithdrawalRequest {
            id: Uuid::new_v4(),
            username: credential.username,
            amount: input.amount,
            bank,
            status: WithdrawalStatus::Pending,
            requested_at: Utc::now(),
            decided_at: None,
        };
        self.withdrawals.create(&request).await?;

        info!(
            withdrawal_id = %request.id,
            username = %request.username,
            amount = %request.amount,
            "Withdrawal requested"
        );
        Ok(request)
    }

    async fn has_pending(&self, username: &str) -> AppResult<bool> {
        Ok(self
            .withdrawals
            .list_for_user(username)
            .await?
            .iter()
            .any(|r| r.status == WithdrawalStatus::Pending))
    }

    /// Approves or rejects a pending withdrawal.
    ///
    /// Approval also deletes the affiliate's credential and registration
    /// rows; stored bank details are kept.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no request has this ID
    /// - `BusinessRule` when the request was already decided
    /// - `ExternalService` when a spreadsheet call fails
    pub async fn decide(&self, id: Uuid, decision: Decision) -> AppResult<WithdrawalRequest> {
        let _guard = self.lock().await;

        let not_found = || AppError::NotFound(format!("No withdrawal request {id}"));
        let current = self.withdrawals.find(id).await?.ok_or_else(not_found)?;
        let status = WithdrawalService::decide(current.status, decision)?;

        let decided = self
            .withdrawals
            .set_status(id, status, Some(Utc::now()))
            .await?
            .ok_or_else(not_found)?;

        if status == WithdrawalStatus::Approved {
            let removed_credential = self.credentials.delete_by_username(&decided.username).await?;
            let removed_registration = self
                .registrations
                .delete_by_username(&decided.username)
                .await?;
            info!(
                withdrawal_id = %id,
                username = %decided.username,
                removed_credential,
                removed_registration,
                "Withdrawal approved, affiliate access removed"
            );
        } else {
            info!(withdrawal_id = %id, username = %decided.username, "Withdrawal rejected");
        }

        Ok(decided)
    }

    /// Stored bank details of an affiliate, if any.
    ///
    /// # Errors
    ///
    /// Returns `ExternalService` when a spreadsheet call fails.
    pub async fn bank_details_for(&self, username: &str) -> AppResult<Option<BankDetails>> {
        Ok(self
            .bank_details
            .find(&normalize_username(username))
            .await?)
    }

    /// Validates and stores an affiliate's bank details.
    ///
    /// # Errors
    ///
    /// - `Validation` when a field is malformed
    /// - `NotFound` when `username` has no credential
    /// - `ExternalService` when a spreadsheet call fails
    pub async fn update_bank_details(
        &self,
        username: &str,
        bank: &BankDetails,
    ) -> AppResult<BankDetails> {
        let bank = bank.validated()?;
        let _guard = self.lock().await;

        let credential = self.approved(&normalize_username(username)).await?;
        self.bank_details.upsert(&credential.username, &bank).await?;

        info!(username = %credential.username, "Bank details updated");
        Ok(bank)
    }
}
