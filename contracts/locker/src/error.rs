use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Lock amount must be greater than zero")]
    InvalidAmount {},

    #[error("Asset {asset} is not allowed")]
    AssetNotAllowed { asset: String },

    #[error("Lock duration {duration}s is not allowed for {asset}")]
    DurationNotAllowed { asset: String, duration: u64 },

    #[error("Transfer failed: {reason}")]
    TransferFailed { reason: String },

    #[error("Lock {id} does not exist")]
    LockNotFound { id: u64 },

    #[error("Still locked until {release_at}")]
    StillLocked { release_at: u64 },

    #[error("Index {index} out of range, owner has {count} locks")]
    IndexOutOfRange { index: u32, count: u32 },
}
