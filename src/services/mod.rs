pub mod checkout;
pub mod reconcile;
pub mod refund;
