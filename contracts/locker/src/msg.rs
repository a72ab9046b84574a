use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw20::{Cw20ReceiveMsg, Denom};

#[cw_serde]
pub struct InstantiateMsg {
    /// Administrator of the allow-lists, defaults to the sender
    pub owner: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Only owner. Allow or revoke an asset for new locks
    SetAssetAllowance { asset: Denom, allowed: bool },
    /// Only owner. Allow or revoke a lock duration (seconds) for an asset
    SetLockDuration {
        asset: Denom,
        duration: u64,
        allowed: bool,
    },
    /// Only owner. Hand over the administration
    UpdateOwner { owner: String },
    /// Lock funds for `duration` seconds. Native coins must be sent along,
    /// cw20 tokens need an allowance to this contract.
    Lock {
        asset: Denom,
        amount: Uint128,
        duration: u64,
    },
    /// Release an expired lock to its owner, callable by anyone
    Unlock { id: u64 },
    /// This accepts a properly-encoded ReceiveMsg from a cw20 contract
    Receive(Cw20ReceiveMsg),
}

#[cw_serde]
pub enum ReceiveMsg {
    Lock { duration: u64 },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(bool)]
    IsAssetAllowed { asset: Denom },
    #[returns(bool)]
    IsDurationAllowed { asset: Denom, duration: u64 },
    /// Number of open locks of the owner
    #[returns(LocksCountResponse)]
    LocksCount { owner: String },
    /// Open lock at a position of the owner's list. Positions start at 0 and
    /// may change after any unlock of the same owner.
    #[returns(LockAtResponse)]
    LockAt { owner: String, index: u32 },
    /// Lock by id, released locks are returned with `alive: false`
    #[returns(LockResponse)]
    Lock { id: u64 },
    /// Open locks of the owner by position. Supports pagination.
    #[returns(LocksResponse)]
    Locks {
        owner: String,
        start_after: Option<u32>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: Addr,
    pub last_lock_id: u64,
}

#[cw_serde]
pub struct LocksCountResponse {
    pub count: u32,
}

#[cw_serde]
pub struct LockAtResponse {
    pub index: u32,
    pub id: u64,
    pub asset: Denom,
    pub amount: Uint128,
    pub duration: u64,
    pub release_at: Timestamp,
}

#[cw_serde]
pub struct LockResponse {
    pub id: u64,
    pub owner: Addr,
    pub asset: Denom,
    pub amount: Uint128,
    pub duration: u64,
    pub release_at: Timestamp,
    pub alive: bool,
}

#[cw_serde]
pub struct LocksResponse {
    pub locks: Vec<LockAtResponse>,
}
