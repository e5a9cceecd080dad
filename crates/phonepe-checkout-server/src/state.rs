use std::sync::Arc;

use checkout::{CheckoutError, MerchantConfig, PaymentGateway, PhonePeClient};

use crate::config::CheckoutConfig;

/// Shared application state, read-only after startup.
pub struct AppState<G> {
    pub config: Arc<CheckoutConfig>,
    /// Credentials injected into the payment builder and signer
    pub merchant: Arc<MerchantConfig>,
    pub gateway: Arc<G>,
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            merchant: Arc::clone(&self.merchant),
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G: PaymentGateway> AppState<G> {
    pub fn new(config: CheckoutConfig, gateway: G) -> Self {
        let merchant = config.merchant();
        Self {
            config: Arc::new(config),
            merchant: Arc::new(merchant),
            gateway: Arc::new(gateway),
        }
    }
}

impl AppState<PhonePeClient> {
    /// State backed by the real gateway at `config.phonepe_host`.
    pub fn from_config(config: CheckoutConfig) -> Result<Self, CheckoutError> {
        let gateway = PhonePeClient::new(&config.phonepe_host, config.gateway_timeout)?;
        Ok(Self::new(config, gateway))
    }
}
