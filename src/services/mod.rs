pub mod booking_service;
pub mod checkout_service;
pub mod distance_service;
pub mod draft_store;
pub mod pricing_service;
pub mod upload_service;
pub mod wizard;
