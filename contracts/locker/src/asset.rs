use cosmwasm_std::{
    to_binary, Addr, Api, BankMsg, Coin, CosmosMsg, Deps, Env, StdError, StdResult, Uint128,
    WasmMsg,
};
use cw20::{AllowanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, Denom};

use crate::error::ContractError;

/// Storage key of an asset in the allow-lists.
pub fn asset_key(asset: &Denom) -> String {
    match asset {
        Denom::Native(denom) => format!("native:{}", denom),
        Denom::Cw20(address) => format!("cw20:{}", address),
    }
}

pub fn validate_asset(api: &dyn Api, asset: Denom) -> StdResult<Denom> {
    match asset {
        Denom::Native(denom) if denom.is_empty() => Err(StdError::generic_err("Empty denom")),
        Denom::Native(denom) => Ok(Denom::Native(denom)),
        Denom::Cw20(address) => Ok(Denom::Cw20(api.addr_validate(address.as_str())?)),
    }
}

/// Checks that `amount` of `asset` can be moved from `owner` into the contract
/// and returns the message that pulls it, if one is needed.
///
/// Native coins must be attached to the call itself. Cw20 tokens are pulled
/// with `TransferFrom`, which needs a prior allowance to this contract.
pub fn pull_tokens(
    deps: Deps,
    env: &Env,
    funds: &[Coin],
    owner: &Addr,
    asset: &Denom,
    amount: Uint128,
) -> Result<Option<CosmosMsg>, ContractError> {
    match asset {
        Denom::Native(denom) => match funds {
            [coin] if coin.denom == *denom && coin.amount == amount => Ok(None),
            _ => Err(ContractError::TransferFailed {
                reason: format!("expected exactly {}{}", amount, denom),
            }),
        },
        Denom::Cw20(token) => {
            if !funds.is_empty() {
                return Err(ContractError::TransferFailed {
                    reason: "native coins sent with a cw20 lock".to_string(),
                });
            }

            let res: AllowanceResponse = deps.querier.query_wasm_smart(
                token,
                &Cw20QueryMsg::Allowance {
                    owner: owner.to_string(),
                    spender: env.contract.address.to_string(),
                },
            )?;
            if res.expires.is_expired(&env.block) {
                return Err(ContractError::TransferFailed {
                    reason: "allowance is expired".to_string(),
                });
            }
            if res.allowance < amount {
                return Err(ContractError::TransferFailed {
                    reason: format!("allowance {} is lower than {}", res.allowance, amount),
                });
            }

            let msg = Cw20ExecuteMsg::TransferFrom {
                owner: owner.to_string(),
                recipient: env.contract.address.to_string(),
                amount,
            };
            let exec = WasmMsg::Execute {
                contract_addr: token.to_string(),
                msg: to_binary(&msg)?,
                funds: vec![],
            };
            Ok(Some(exec.into()))
        }
    }
}

/// Message paying `amount` of `asset` from custody to `to`.
pub fn send_tokens(to: &Addr, asset: &Denom, amount: Uint128) -> StdResult<CosmosMsg> {
    match asset {
        Denom::Native(denom) => Ok(BankMsg::Send {
            to_address: to.into(),
            amount: vec![Coin {
                denom: denom.to_owned(),
                amount,
            }],
        }
        .into()),
        Denom::Cw20(token) => {
            let msg = Cw20ExecuteMsg::Transfer {
                recipient: to.into(),
                amount,
            };
            let exec = WasmMsg::Execute {
                contract_addr: token.to_string(),
                msg: to_binary(&msg)?,
                funds: vec![],
            };
            Ok(exec.into())
        }
    }
}
