pub mod cart;
pub mod checkout;
pub mod contracts;
pub mod fulfillment;
pub mod history;
pub mod supply;
