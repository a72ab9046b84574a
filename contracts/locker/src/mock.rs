#![cfg(test)]

use std::marker::PhantomData;

use cosmwasm_std::testing::{MockApi, MockStorage};
use cosmwasm_std::{to_binary, OwnedDeps, Querier, QuerierResult, SystemResult, Uint128};
use cw20::{AllowanceResponse, Expiration};

/// Dependencies whose querier answers every query with a cw20 allowance of `allowance`.
pub fn mock_dependencies_allowance(
    allowance: Uint128,
) -> OwnedDeps<MockStorage, MockApi, AllowanceQuerier> {
    OwnedDeps {
        storage: MockStorage::default(),
        api: MockApi::default(),
        querier: AllowanceQuerier {
            amount: allowance,
            expires: Expiration::Never {},
        },
        custom_query_type: PhantomData,
    }
}

pub struct AllowanceQuerier {
    pub amount: Uint128,
    pub expires: Expiration,
}

impl Querier for AllowanceQuerier {
    fn raw_query(&self, _: &[u8]) -> QuerierResult {
        let allowance_res = AllowanceResponse {
            allowance: self.amount,
            expires: self.expires,
        };

        SystemResult::Ok(to_binary(&allowance_res).into())
    }
}
