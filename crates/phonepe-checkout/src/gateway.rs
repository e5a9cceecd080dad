//! The gateway seam and the initiate-payment flow built on it.

use crate::checksum;
use crate::constants::PAY_API_PATH;
use crate::error::CheckoutError;
use crate::payment::{build_payment_request, EncodedPayload, MerchantConfig, TransactionId};
use crate::response::RedirectResult;

/// Submits a signed pay request to the gateway.
///
/// [`crate::PhonePeClient`] is the HTTP implementation; tests supply stubs.
/// Implementations make exactly one attempt.
pub trait PaymentGateway: Send + Sync {
    fn submit_payment(
        &self,
        payload: &EncodedPayload,
        checksum: &str,
    ) -> impl std::future::Future<Output = Result<RedirectResult, CheckoutError>> + Send;
}

/// A payment accepted by the gateway.
#[derive(Debug, Clone)]
pub struct Initiated {
    pub transaction_id: TransactionId,
    pub amount: u64,
    pub result: RedirectResult,
}

/// Build, encode, sign and submit a payment of `amount` rupees.
///
/// An invalid amount fails before anything is signed or sent.
pub async fn initiate_payment<G: PaymentGateway>(
    gateway: &G,
    merchant: &MerchantConfig,
    amount: f64,
) -> Result<Initiated, CheckoutError> {
    let (request, transaction_id) = build_payment_request(amount, merchant)?;
    let encoded = request.encode()?;
    let checksum = checksum::sign(
        encoded.as_str(),
        PAY_API_PATH,
        &merchant.salt_key,
        &merchant.salt_index,
    );

    tracing::info!(
        transaction_id = %transaction_id,
        amount = request.amount,
        "submitting payment to gateway"
    );

    let result = gateway
        .submit_payment(&encoded, &checksum)
        .await
        .inspect_err(|e| {
            tracing::warn!(transaction_id = %transaction_id, error = %e, "payment initiation failed");
        })?;

    if result.redirect_url.is_none() {
        tracing::warn!(
            transaction_id = %transaction_id,
            "gateway accepted payment but returned no redirect URL"
        );
    }

    Ok(Initiated {
        transaction_id,
        amount: request.amount,
        result,
    })
}
