use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use tracing::{debug, instrument};

use gateway::abi::IPool;
use gateway::{LedgerGateway, PendingTx};

use crate::error::AmmError;
use crate::types::Side;

/// Thin typed client for the pool contract.
///
/// Pricing stays remote: `get_amount_out` is an oracle call against the
/// contract's own constant-product math, not a local reimplementation.
pub struct AmmClient<G> {
    gateway: Arc<G>,
    address: Address,
    token0: Address,
    token1: Address,
}

impl<G: LedgerGateway> AmmClient<G> {
    pub fn new(gateway: Arc<G>, address: Address, token0: Address, token1: Address) -> Self {
        Self {
            gateway,
            address,
            token0,
            token1,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn input_token(&self, side: Side) -> Address {
        match side {
            Side::Token0 => self.token0,
            Side::Token1 => self.token1,
        }
    }

    #[instrument(skip(self), fields(pool = %self.address), level = "debug")]
    pub async fn get_reserves(&self) -> Result<(U256, U256), AmmError> {
        let raw0 = self
            .gateway
            .call(self.address, IPool::reserve0Call {}.abi_encode().into())
            .await?;
        let raw1 = self
            .gateway
            .call(self.address, IPool::reserve1Call {}.abi_encode().into())
            .await?;

        let reserve0 = IPool::reserve0Call::abi_decode_returns(&raw0, true)
            .map_err(gateway::GatewayError::from)?
            ._0;
        let reserve1 = IPool::reserve1Call::abi_decode_returns(&raw1, true)
            .map_err(gateway::GatewayError::from)?
            ._0;

        debug!(%reserve0, %reserve1, "reserves fetched");
        Ok((reserve0, reserve1))
    }

    #[instrument(skip(self), fields(pool = %self.address, %side, %amount_in), level = "debug")]
    pub async fn get_amount_out(&self, side: Side, amount_in: U256) -> Result<U256, AmmError> {
        let data = IPool::getAmountOutCall {
            tokenIn: self.input_token(side),
            amountIn: amount_in,
        }
        .abi_encode();

        let raw = self.gateway.call(self.address, data.into()).await?;
        let out = IPool::getAmountOutCall::abi_decode_returns(&raw, true)
            .map_err(gateway::GatewayError::from)?
            ._0;

        Ok(out)
    }

    #[instrument(skip(self), fields(pool = %self.address, %side, %amount_in, %recipient))]
    pub async fn swap_exact_input(
        &self,
        side: Side,
        amount_in: U256,
        min_out: U256,
        recipient: Address,
    ) -> Result<PendingTx, AmmError> {
        let data = IPool::swapExactInputCall {
            tokenIn: self.input_token(side),
            amountIn: amount_in,
            minOut: min_out,
            to: recipient,
        }
        .abi_encode();

        Ok(self.gateway.submit(self.address, data.into()).await?)
    }

    /// Check the deployed pair against the configured token addresses.
    ///
    /// Advisory: configuration is trusted at runtime; embedders and
    /// deployment checks call this explicitly.
    #[instrument(skip(self), fields(pool = %self.address), level = "debug")]
    pub async fn verify_pair(&self) -> Result<(), AmmError> {
        let raw0 = self
            .gateway
            .call(self.address, IPool::token0Call {}.abi_encode().into())
            .await?;
        let raw1 = self
            .gateway
            .call(self.address, IPool::token1Call {}.abi_encode().into())
            .await?;

        let actual0 = IPool::token0Call::abi_decode_returns(&raw0, true)
            .map_err(gateway::GatewayError::from)?
            ._0;
        let actual1 = IPool::token1Call::abi_decode_returns(&raw1, true)
            .map_err(gateway::GatewayError::from)?
            ._0;

        if actual0 != self.token0 || actual1 != self.token1 {
            return Err(AmmError::PairMismatch {
                expected0: self.token0,
                expected1: self.token1,
                actual0,
                actual1,
            });
        }

        Ok(())
    }
}
