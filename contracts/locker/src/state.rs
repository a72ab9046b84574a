use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cosmwasm_std::{Addr, StdResult, Storage, Timestamp, Uint128};
use cw20::Denom;
use cw_storage_plus::{Item, Map};

use crate::asset::asset_key;
use crate::error::ContractError;
use crate::index::OwnerIndex;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct State {
    pub owner: Addr,
    /// Last issued lock id, 0 before the first lock
    pub last_lock_id: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Lock {
    pub id: u64,
    pub owner: Addr,
    pub asset: Denom,
    pub amount: Uint128,
    /// Lock duration in seconds
    pub duration: u64,
    pub release_at: Timestamp,
    /// False once released, the record is kept as a tombstone
    pub alive: bool,
}

pub const STATE: Item<State> = Item::new("state");
pub const LOCKS: Map<u64, Lock> = Map::new("locks");
pub const OWNER_LOCKS: OwnerIndex = OwnerIndex::new("owner_locks", "owner_locks_len", "lock_slot");

pub const ALLOWED_ASSETS: Map<&str, bool> = Map::new("allowed_assets");
pub const LOCK_DURATIONS: Map<(&str, u64), bool> = Map::new("lock_durations");

pub fn is_asset_allowed(store: &dyn Storage, asset: &Denom) -> StdResult<bool> {
    let key = asset_key(asset);
    Ok(ALLOWED_ASSETS.may_load(store, &key)?.unwrap_or(false))
}

pub fn is_duration_allowed(store: &dyn Storage, asset: &Denom, duration: u64) -> StdResult<bool> {
    let key = asset_key(asset);
    Ok(LOCK_DURATIONS
        .may_load(store, (key.as_str(), duration))?
        .unwrap_or(false))
}

pub fn next_lock_id(store: &mut dyn Storage) -> StdResult<u64> {
    let mut id = 0;
    STATE.update(store, |mut state| -> StdResult<_> {
        state.last_lock_id += 1;
        id = state.last_lock_id;
        Ok(state)
    })?;

    Ok(id)
}

/// Stores a new live lock under the next id. The owner index is left alone.
pub fn create_lock(
    store: &mut dyn Storage,
    owner: Addr,
    asset: Denom,
    amount: Uint128,
    duration: u64,
    release_at: Timestamp,
) -> StdResult<Lock> {
    let id = next_lock_id(store)?;
    let lock = Lock {
        id,
        owner,
        asset,
        amount,
        duration,
        release_at,
        alive: true,
    };
    LOCKS.save(store, id, &lock)?;

    Ok(lock)
}

/// Lock by id, `None` for id 0, unknown ids and released locks.
pub fn live_lock(store: &dyn Storage, id: u64) -> StdResult<Option<Lock>> {
    Ok(LOCKS.may_load(store, id)?.filter(|lock| lock.alive))
}

pub fn kill_lock(store: &mut dyn Storage, id: u64) -> Result<Lock, ContractError> {
    let mut lock = live_lock(store, id)?.ok_or(ContractError::LockNotFound { id })?;
    lock.alive = false;
    LOCKS.save(store, id, &lock)?;

    Ok(lock)
}
