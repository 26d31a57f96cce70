//! Supporter-facing readiness check.
//!
//! Informational only: it combines three booleans for display in the
//! supporter flow and never touches ticket state. The gate decision in
//! [`super::AccessEngine::decide`] is the only authority that marks tickets
//! USED.

use serde::Serialize;

use super::AccessEngine;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SelfCheckReport {
    pub has_ticket: bool,
    pub has_qr: bool,
    pub has_biometric: bool,
    pub granted: bool,
}

impl<S: Store> AccessEngine<S> {
    /// `qr_generated` is session state held by the caller (whether a QR was
    /// rendered in the current supporter session); it is not persisted.
    pub async fn self_check(
        &self,
        user_id: i32,
        qr_generated: bool,
    ) -> Result<SelfCheckReport, StoreError> {
        let has_ticket = self.store().user_has_valid_ticket(user_id).await?;
        let has_biometric = self.store().has_biometric(user_id).await?;

        Ok(SelfCheckReport {
            has_ticket,
            has_qr: qr_generated,
            has_biometric,
            granted: has_ticket && qr_generated && has_biometric,
        })
    }
}
