#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    from_binary, to_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
    Timestamp, Uint128,
};

use crate::asset::{asset_key, pull_tokens, send_tokens, validate_asset};
use crate::error::ContractError;
use crate::msg::{
    ConfigResponse, ExecuteMsg, InstantiateMsg, LockAtResponse, LockResponse, LocksCountResponse,
    LocksResponse, QueryMsg, ReceiveMsg,
};
use crate::state::{
    create_lock, is_asset_allowed, is_duration_allowed, kill_lock, live_lock, Lock, State,
    ALLOWED_ASSETS, LOCKS, LOCK_DURATIONS, OWNER_LOCKS, STATE,
};

use cw2::set_contract_version;
use cw20::{Cw20ReceiveMsg, Denom};

// version info for migration info
const CONTRACT_NAME: &str = "crates.io:cw-disper-locker";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let owner = match msg.owner {
        Some(owner) => deps.api.addr_validate(&owner)?,
        None => info.sender,
    };
    let state = State {
        owner,
        last_lock_id: 0,
    };
    STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", state.owner))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::SetAssetAllowance { asset, allowed } => {
            execute_set_asset_allowance(deps, info, asset, allowed)
        }
        ExecuteMsg::SetLockDuration {
            asset,
            duration,
            allowed,
        } => execute_set_lock_duration(deps, info, asset, duration, allowed),
        ExecuteMsg::UpdateOwner { owner } => execute_update_owner(deps, info, owner),
        ExecuteMsg::Lock {
            asset,
            amount,
            duration,
        } => execute_lock(deps, env, info, asset, amount, duration),
        ExecuteMsg::Unlock { id } => execute_unlock(deps, env, info, id),
        ExecuteMsg::Receive(msg) => execute_receive(deps, env, info, msg),
    }
}

fn assert_owner(deps: Deps, sender: &Addr) -> Result<(), ContractError> {
    let state = STATE.load(deps.storage)?;
    if *sender != state.owner {
        return Err(ContractError::Unauthorized {});
    }
    Ok(())
}

pub fn execute_set_asset_allowance(
    deps: DepsMut,
    info: MessageInfo,
    asset: Denom,
    allowed: bool,
) -> Result<Response, ContractError> {
    assert_owner(deps.as_ref(), &info.sender)?;

    let key = asset_key(&validate_asset(deps.api, asset)?);
    if allowed {
        ALLOWED_ASSETS.save(deps.storage, &key, &true)?;
    } else {
        ALLOWED_ASSETS.remove(deps.storage, &key);
    }

    let res = Response::new()
        .add_attribute("action", "set_asset_allowance")
        .add_attribute("asset", key)
        .add_attribute("allowed", allowed.to_string());
    Ok(res)
}

pub fn execute_set_lock_duration(
    deps: DepsMut,
    info: MessageInfo,
    asset: Denom,
    duration: u64,
    allowed: bool,
) -> Result<Response, ContractError> {
    assert_owner(deps.as_ref(), &info.sender)?;

    let key = asset_key(&validate_asset(deps.api, asset)?);
    if allowed {
        LOCK_DURATIONS.save(deps.storage, (key.as_str(), duration), &true)?;
    } else {
        LOCK_DURATIONS.remove(deps.storage, (key.as_str(), duration));
    }

    let res = Response::new()
        .add_attribute("action", "set_lock_duration")
        .add_attribute("asset", key)
        .add_attribute("duration", duration.to_string())
        .add_attribute("allowed", allowed.to_string());
    Ok(res)
}

pub fn execute_update_owner(
    deps: DepsMut,
    info: MessageInfo,
    owner: String,
) -> Result<Response, ContractError> {
    let new_owner = deps.api.addr_validate(&owner)?;
    STATE.update(deps.storage, |mut state| -> Result<_, ContractError> {
        if info.sender != state.owner {
            return Err(ContractError::Unauthorized {});
        }
        state.owner = new_owner.clone();
        Ok(state)
    })?;

    let res = Response::new()
        .add_attribute("action", "update_owner")
        .add_attribute("owner", new_owner);
    Ok(res)
}

pub fn execute_lock(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    asset: Denom,
    amount: Uint128,
    duration: u64,
) -> Result<Response, ContractError> {
    let asset = validate_asset(deps.api, asset)?;
    check_lock(deps.as_ref(), &asset, amount, duration)?;

    let pull = pull_tokens(
        deps.as_ref(),
        &env,
        &info.funds,
        &info.sender,
        &asset,
        amount,
    )?;

    let res = open_lock(deps, &env, info.sender, asset, amount, duration)?;
    Ok(res.add_messages(pull))
}

pub fn execute_receive(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    wrapper: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let msg: ReceiveMsg = from_binary(&wrapper.msg)?;
    if !info.funds.is_empty() {
        return Err(ContractError::TransferFailed {
            reason: "native coins sent with a cw20 lock".to_string(),
        });
    }

    // tokens already sit in the contract, sent by the calling cw20 contract
    let asset = Denom::Cw20(info.sender);
    let owner = deps.api.addr_validate(&wrapper.sender)?;
    match msg {
        ReceiveMsg::Lock { duration } => {
            check_lock(deps.as_ref(), &asset, wrapper.amount, duration)?;
            open_lock(deps, &env, owner, asset, wrapper.amount, duration)
        }
    }
}

fn check_lock(
    deps: Deps,
    asset: &Denom,
    amount: Uint128,
    duration: u64,
) -> Result<(), ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }
    if !is_asset_allowed(deps.storage, asset)? {
        return Err(ContractError::AssetNotAllowed {
            asset: asset_key(asset),
        });
    }
    if !is_duration_allowed(deps.storage, asset, duration)? {
        return Err(ContractError::DurationNotAllowed {
            asset: asset_key(asset),
            duration,
        });
    }
    Ok(())
}

fn open_lock(
    deps: DepsMut,
    env: &Env,
    owner: Addr,
    asset: Denom,
    amount: Uint128,
    duration: u64,
) -> Result<Response, ContractError> {
    let release_at =
        release_time(env.block.time, duration).ok_or_else(|| ContractError::DurationNotAllowed {
            asset: asset_key(&asset),
            duration,
        })?;
    let lock = create_lock(deps.storage, owner, asset, amount, duration, release_at)?;
    OWNER_LOCKS.append(deps.storage, &lock.owner, lock.id)?;

    let res = Response::new()
        .set_data(to_binary(&lock.id)?)
        .add_attribute("action", "lock")
        .add_attribute("id", lock.id.to_string())
        .add_attribute("owner", &lock.owner)
        .add_attribute("asset", asset_key(&lock.asset))
        .add_attribute("amount", lock.amount)
        .add_attribute("release_at", lock.release_at.seconds().to_string());
    Ok(res)
}

/// `now + duration`, `None` when it does not fit a nanosecond timestamp.
fn release_time(now: Timestamp, duration: u64) -> Option<Timestamp> {
    let nanos = duration
        .checked_mul(1_000_000_000)
        .and_then(|d| now.nanos().checked_add(d))?;
    Some(Timestamp::from_nanos(nanos))
}

pub fn execute_unlock(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    id: u64,
) -> Result<Response, ContractError> {
    let lock = live_lock(deps.storage, id)?.ok_or(ContractError::LockNotFound { id })?;
    if env.block.time < lock.release_at {
        return Err(ContractError::StillLocked {
            release_at: lock.release_at.seconds(),
        });
    }

    kill_lock(deps.storage, id)?;
    OWNER_LOCKS.remove(deps.storage, &lock.owner, id)?;

    // funds always go back to the owner, whoever calls
    let payout = send_tokens(&lock.owner, &lock.asset, lock.amount)?;

    let res = Response::new()
        .add_message(payout)
        .add_attribute("action", "unlock")
        .add_attribute("id", id.to_string())
        .add_attribute("owner", &lock.owner)
        .add_attribute("asset", asset_key(&lock.asset))
        .add_attribute("amount", lock.amount)
        .add_attribute("sender", info.sender);
    Ok(res)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    let res = match msg {
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::IsAssetAllowed { asset } => to_binary(&is_asset_allowed(deps.storage, &asset)?),
        QueryMsg::IsDurationAllowed { asset, duration } => {
            to_binary(&is_duration_allowed(deps.storage, &asset, duration)?)
        }
        QueryMsg::LocksCount { owner } => to_binary(&query_locks_count(deps, owner)?),
        QueryMsg::LockAt { owner, index } => to_binary(&query_lock_at(deps, owner, index)?),
        QueryMsg::Lock { id } => to_binary(&query_lock(deps, id)?),
        QueryMsg::Locks {
            owner,
            start_after,
            limit,
        } => to_binary(&query_locks(deps, owner, start_after, limit)?),
    }?;
    Ok(res)
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let state = STATE.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: state.owner,
        last_lock_id: state.last_lock_id,
    })
}

fn query_locks_count(deps: Deps, owner: String) -> StdResult<LocksCountResponse> {
    let owner = deps.api.addr_validate(&owner)?;
    let count = OWNER_LOCKS.count(deps.storage, &owner)?;
    Ok(LocksCountResponse { count })
}

fn query_lock_at(deps: Deps, owner: String, index: u32) -> Result<LockAtResponse, ContractError> {
    let owner = deps.api.addr_validate(&owner)?;
    let id = OWNER_LOCKS.get(deps.storage, &owner, index)?;
    let lock = LOCKS.load(deps.storage, id)?;
    Ok(to_lock_at(index, lock))
}

fn query_lock(deps: Deps, id: u64) -> Result<LockResponse, ContractError> {
    let lock = LOCKS
        .may_load(deps.storage, id)?
        .ok_or(ContractError::LockNotFound { id })?;

    Ok(LockResponse {
        id: lock.id,
        owner: lock.owner,
        asset: lock.asset,
        amount: lock.amount,
        duration: lock.duration,
        release_at: lock.release_at,
        alive: lock.alive,
    })
}

fn query_locks(
    deps: Deps,
    owner: String,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<LocksResponse> {
    let owner = deps.api.addr_validate(&owner)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;

    let locks: StdResult<Vec<_>> = OWNER_LOCKS
        .range(deps.storage, &owner, start_after, limit)?
        .into_iter()
        .map(|(index, id)| Ok(to_lock_at(index, LOCKS.load(deps.storage, id)?)))
        .collect();

    Ok(LocksResponse { locks: locks? })
}

fn to_lock_at(index: u32, lock: Lock) -> LockAtResponse {
    LockAtResponse {
        index,
        id: lock.id,
        asset: lock.asset,
        amount: lock.amount,
        duration: lock.duration,
        release_at: lock.release_at,
    }
}
