use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use tracing::{debug, instrument};

use gateway::abi::IToken;
use gateway::{GatewayError, LedgerGateway, PendingTx};

/// Current approval granted by `owner` to `spender`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceRecord {
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

impl AllowanceRecord {
    /// Whether an approval must be submitted before `required` can be
    /// pulled by the spender.
    pub fn covers(&self, required: U256) -> bool {
        self.amount >= required
    }
}

/// Thin typed client for one token contract.
pub struct TokenClient<G> {
    gateway: Arc<G>,
    address: Address,
}

impl<G: LedgerGateway> TokenClient<G> {
    pub fn new(gateway: Arc<G>, address: Address) -> Self {
        Self { gateway, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self), fields(token = %self.address), level = "debug")]
    pub async fn symbol(&self) -> Result<String, GatewayError> {
        let data = IToken::symbolCall {}.abi_encode();
        let raw = self.gateway.call(self.address, data.into()).await?;
        Ok(IToken::symbolCall::abi_decode_returns(&raw, true)?._0)
    }

    #[instrument(skip(self), fields(token = %self.address), level = "debug")]
    pub async fn decimals(&self) -> Result<u8, GatewayError> {
        let data = IToken::decimalsCall {}.abi_encode();
        let raw = self.gateway.call(self.address, data.into()).await?;
        Ok(IToken::decimalsCall::abi_decode_returns(&raw, true)?._0)
    }

    #[instrument(skip(self), fields(token = %self.address, owner = %owner), level = "debug")]
    pub async fn balance_of(&self, owner: Address) -> Result<U256, GatewayError> {
        let data = IToken::balanceOfCall { owner }.abi_encode();
        let raw = self.gateway.call(self.address, data.into()).await?;
        Ok(IToken::balanceOfCall::abi_decode_returns(&raw, true)?._0)
    }

    #[instrument(skip(self), fields(token = %self.address, owner = %owner, spender = %spender), level = "debug")]
    pub async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<AllowanceRecord, GatewayError> {
        let data = IToken::allowanceCall { owner, spender }.abi_encode();
        let raw = self.gateway.call(self.address, data.into()).await?;
        let amount = IToken::allowanceCall::abi_decode_returns(&raw, true)?._0;

        debug!(%amount, "allowance read");
        Ok(AllowanceRecord {
            owner,
            spender,
            amount,
        })
    }

    /// Submit an approval. The returned handle must be confirmed before
    /// any step that relies on the new allowance.
    #[instrument(skip(self), fields(token = %self.address, spender = %spender, %amount))]
    pub async fn approve(
        &self,
        spender: Address,
        amount: U256,
    ) -> Result<PendingTx, GatewayError> {
        let data = IToken::approveCall { spender, amount }.abi_encode();
        self.gateway.submit(self.address, data.into()).await
    }
}
