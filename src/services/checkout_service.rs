use std::env;

use stripe::{
    CheckoutSession, CheckoutSessionMode, CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData, CreateCheckoutSessionLineItemsPriceDataProductData,
    Currency,
};

#[derive(Debug)]
pub enum CheckoutError {
    Stripe(String),
    EnvironmentError(String),
}

impl std::fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutError::Stripe(err) => write!(f, "Checkout provider error: {}", err),
            CheckoutError::EnvironmentError(err) => write!(f, "Environment error: {}", err),
        }
    }
}

impl std::error::Error for CheckoutError {}

#[derive(Debug, Clone)]
pub struct CheckoutSessionInfo {
    pub session_id: String,
    /// Hosted payment page. Stripe can in principle answer without one, in
    /// which case the caller falls back to the internal confirmation page.
    pub url: Option<String>,
}

pub struct CheckoutService {
    client: stripe::Client,
    success_url: String,
    cancel_url: String,
}

impl CheckoutService {
    pub fn new(secret_key: impl Into<String>) -> Result<Self, CheckoutError> {
        let success_url = env::var("CHECKOUT_SUCCESS_URL").map_err(|_| {
            CheckoutError::EnvironmentError("CHECKOUT_SUCCESS_URL not set".to_string())
        })?;
        let cancel_url = env::var("CHECKOUT_CANCEL_URL").map_err(|_| {
            CheckoutError::EnvironmentError("CHECKOUT_CANCEL_URL not set".to_string())
        })?;

        Ok(Self {
            client: stripe::Client::new(secret_key.into()),
            success_url,
            cancel_url,
        })
    }

    /// Open a hosted checkout session for a booking. One line item carrying
    /// the full total; the breakdown stays on our side.
    pub async fn create_session(
        &self,
        booking_id: &str,
        description: &str,
        total_cents: i64,
        customer_email: &str,
    ) -> Result<CheckoutSessionInfo, CheckoutError> {
        let line_items = vec![CreateCheckoutSessionLineItems {
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency: Currency::CAD,
                unit_amount: Some(total_cents),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: description.to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            quantity: Some(1),
            ..Default::default()
        }];

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.success_url = Some(&self.success_url);
        params.cancel_url = Some(&self.cancel_url);
        params.customer_email = Some(customer_email);
        params.client_reference_id = Some(booking_id);
        params.line_items = Some(line_items);

        match CheckoutSession::create(&self.client, params).await {
            Ok(session) => Ok(CheckoutSessionInfo {
                session_id: session.id.to_string(),
                url: session.url,
            }),
            Err(e) => {
                log::error!("Failed to create checkout session: {:?}", e);
                Err(CheckoutError::Stripe(e.to_string()))
            }
        }
    }
}
