pub mod asset;
pub mod contract;
mod error;
pub mod index;
mod mock;
pub mod msg;
pub mod state;

pub use crate::error::ContractError;
