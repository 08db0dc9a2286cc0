// src/payment.rs
use crate::domain::Errors;
use crate::money::Amount;

/// Opaque payment gateway. The engine only acts on success; everything about
/// intents, methods and retries lives on the other side of this seam.
pub trait PaymentProcessor: Send + Sync {
    fn charge(&self, reference: &str, amount: &Amount) -> Result<(), Errors>;
}

/// Stand-in gateway matching the storefront's demo checkout: references
/// issued by the demo flow (`demo_`) or cash-on-delivery (`cod_`) clear,
/// anything else is declined.
pub struct DemoGateway;

impl PaymentProcessor for DemoGateway {
    fn charge(&self, reference: &str, _amount: &Amount) -> Result<(), Errors> {
        if reference.is_empty() {
            return Err(Errors::UpstreamUnavailable(
                "payment processor returned no transaction reference".to_string(),
            ));
        }
        if reference.starts_with("demo_") || reference.starts_with("cod_") {
            Ok(())
        } else {
            Err(Errors::PaymentDeclined(format!(
                "transaction {} was not accepted",
                reference
            )))
        }
    }
}
