//! Submit-and-confirm for signed venue operations.
//!
//! A submission being accepted says nothing about whether the instruction
//! ran. Every signed operation goes through [`SubmissionVerifier`], which
//! fetches the receipt and turns an embedded instruction error into
//! [`WorkflowError::SilentFailure`].

use std::time::Duration;

use crate::domain::foundation::Address;
use crate::ports::{Receipt, SessionOperation, SessionVenue};

use super::retry::{BoundedRetry, Probe, RetryOutcome};
use super::WorkflowError;

#[derive(Debug, Clone, Copy)]
pub struct SubmissionVerifier {
    receipts: BoundedRetry,
}

impl SubmissionVerifier {
    pub fn new(receipts: BoundedRetry) -> Self {
        Self { receipts }
    }

    /// Submits `operation` and waits for a successful receipt.
    ///
    /// Submission is never retried; only the receipt lookup is.
    pub async fn submit(
        &self,
        venue: &dyn SessionVenue,
        session: &Address,
        operation: SessionOperation,
        signer: &Address,
    ) -> Result<Receipt, WorkflowError> {
        let name = operation.name();
        let signature = venue.submit(session, operation, signer).await?;
        tracing::debug!(
            venue = %venue.kind(),
            operation = name,
            signature = %signature,
            "Submitted"
        );

        let pending = &signature;
        let outcome = self
            .receipts
            .run(|_| async move {
                match venue.receipt(pending).await {
                    Ok(Some(receipt)) => Probe::Ready(receipt),
                    Ok(None) => Probe::NotYet,
                    Err(err) => Probe::Abort(err),
                }
            })
            .await;

        let receipt = match outcome {
            RetryOutcome::Succeeded { value, .. } => value,
            RetryOutcome::Aborted { error, .. } => return Err(error.into()),
            RetryOutcome::Exhausted { attempts } => {
                return Err(WorkflowError::ReceiptUnavailable {
                    signature,
                    attempts,
                })
            }
        };

        if let Some(reason) = receipt.instruction_error.clone() {
            tracing::warn!(
                venue = %venue.kind(),
                operation = name,
                signature = %signature,
                reason = %reason,
                "Transaction landed but instruction failed"
            );
            return Err(WorkflowError::SilentFailure {
                operation: name,
                signature,
                reason,
            });
        }

        Ok(receipt)
    }
}

impl Default for SubmissionVerifier {
    fn default() -> Self {
        Self::new(BoundedRetry::new(Duration::from_millis(250), 20))
    }
}
