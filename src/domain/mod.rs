pub mod catalog;
pub mod contract;
pub mod delivery;
pub mod errors;
pub mod order;
pub mod ports;
pub mod pricing;
pub mod session;
pub mod shortage;
pub mod supplier;
