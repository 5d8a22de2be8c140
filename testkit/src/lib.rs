//! In-memory ledger for the test suites.
//!
//! [`MockLedger`] implements [`LedgerGateway`] against an emulated pair
//! of ERC-20 tokens and one constant-product pool. State-changing calls
//! take effect at confirmation time, like the real chain. Faults
//! (submit failure, revert, timeout, wrong chain, no accounts) and
//! per-amount quote latency are scripted per test.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::{SolCall, SolInterface};
use async_trait::async_trait;

use gateway::abi::{IPool, IToken};
use gateway::{Confirmation, GatewayError, LedgerGateway, PendingTx};

/// Constant-product output with the 0.30% input-side fee, expressed in
/// basis points of 1000 (997 kept of every 1000 units in).
pub fn constant_product_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> U256 {
    let amount_with_fee = amount_in * U256::from(997);
    let numerator = amount_with_fee * reserve_out;
    let denominator = reserve_in * U256::from(1000) + amount_with_fee;
    if denominator.is_zero() {
        return U256::ZERO;
    }
    numerator / denominator
}

/// A decoded state-changing call, recorded at submission for test
/// inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmittedCall {
    Approve {
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    },
    Swap {
        token_in: Address,
        amount_in: U256,
        min_out: U256,
        to: Address,
    },
}

#[derive(Debug, Clone)]
struct TokenState {
    symbol: String,
    decimals: u8,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

#[derive(Debug, Clone)]
struct PoolEmulation {
    address: Address,
    token0: Address,
    token1: Address,
    reserve0: U256,
    reserve1: U256,
}

#[derive(Debug, Default)]
struct Faults {
    fail_next_submit: bool,
    revert_next_confirmation: bool,
    timeout_next_confirmation: bool,
}

#[derive(Default)]
struct Inner {
    chain_id: u64,
    accounts: Vec<Address>,
    tokens: HashMap<Address, TokenState>,
    pool: Option<PoolEmulation>,
    block_number: u64,
    next_tx: u64,
    pending: HashMap<B256, SubmittedCall>,
    submitted: Vec<SubmittedCall>,
    quote_reads: u64,
    quote_latency: HashMap<U256, Duration>,
    confirm_latency: Option<Duration>,
    faults: Faults,
}

pub struct MockLedger {
    inner: Mutex<Inner>,
}

impl MockLedger {
    pub fn new(chain_id: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                chain_id,
                block_number: 1,
                ..Inner::default()
            }),
        }
    }

    // ---- world setup -------------------------------------------------

    pub fn with_account(self, account: Address) -> Self {
        self.inner.lock().unwrap().accounts.push(account);
        self
    }

    pub fn with_token(self, address: Address, symbol: &str, decimals: u8) -> Self {
        self.inner.lock().unwrap().tokens.insert(
            address,
            TokenState {
                symbol: symbol.to_string(),
                decimals,
                balances: HashMap::new(),
                allowances: HashMap::new(),
            },
        );
        self
    }

    pub fn with_pool(
        self,
        address: Address,
        token0: Address,
        token1: Address,
        reserve0: U256,
        reserve1: U256,
    ) -> Self {
        self.inner.lock().unwrap().pool = Some(PoolEmulation {
            address,
            token0,
            token1,
            reserve0,
            reserve1,
        });
        self
    }

    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        let mut g = self.inner.lock().unwrap();
        g.tokens
            .get_mut(&token)
            .expect("unknown token")
            .balances
            .insert(owner, amount);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        let mut g = self.inner.lock().unwrap();
        g.tokens
            .get_mut(&token)
            .expect("unknown token")
            .allowances
            .insert((owner, spender), amount);
    }

    // ---- fault / latency scripting -----------------------------------

    pub fn set_chain_id(&self, chain_id: u64) {
        self.inner.lock().unwrap().chain_id = chain_id;
    }

    pub fn clear_accounts(&self) {
        self.inner.lock().unwrap().accounts.clear();
    }

    pub fn fail_next_submit(&self) {
        self.inner.lock().unwrap().faults.fail_next_submit = true;
    }

    pub fn revert_next_confirmation(&self) {
        self.inner.lock().unwrap().faults.revert_next_confirmation = true;
    }

    pub fn timeout_next_confirmation(&self) {
        self.inner.lock().unwrap().faults.timeout_next_confirmation = true;
    }

    /// Delay `getAmountOut` responses for this exact input amount.
    /// Lets tests invert completion order between two quote requests.
    pub fn set_quote_latency(&self, amount_in: U256, latency: Duration) {
        self.inner
            .lock()
            .unwrap()
            .quote_latency
            .insert(amount_in, latency);
    }

    /// Delay every confirmation. Used to hold a swap in flight.
    pub fn set_confirm_latency(&self, latency: Duration) {
        self.inner.lock().unwrap().confirm_latency = Some(latency);
    }

    // ---- inspection --------------------------------------------------

    pub fn submitted(&self) -> Vec<SubmittedCall> {
        self.inner.lock().unwrap().submitted.clone()
    }

    pub fn quote_reads(&self) -> u64 {
        self.inner.lock().unwrap().quote_reads
    }

    pub fn balance(&self, token: Address, owner: Address) -> U256 {
        let g = self.inner.lock().unwrap();
        g.tokens[&token]
            .balances
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        let g = self.inner.lock().unwrap();
        g.tokens[&token]
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn reserves(&self) -> (U256, U256) {
        let g = self.inner.lock().unwrap();
        let pool = g.pool.as_ref().expect("no pool configured");
        (pool.reserve0, pool.reserve1)
    }

    // ---- call handling -----------------------------------------------

    fn handle_token_call(
        token: &TokenState,
        call: IToken::ITokenCalls,
    ) -> Result<Bytes, GatewayError> {
        let ret = match call {
            IToken::ITokenCalls::symbol(_) => {
                IToken::symbolCall::abi_encode_returns(&(token.symbol.clone(),))
            }
            IToken::ITokenCalls::decimals(_) => {
                IToken::decimalsCall::abi_encode_returns(&(token.decimals,))
            }
            IToken::ITokenCalls::balanceOf(c) => {
                let balance = token.balances.get(&c.owner).copied().unwrap_or_default();
                IToken::balanceOfCall::abi_encode_returns(&(balance,))
            }
            IToken::ITokenCalls::allowance(c) => {
                let amount = token
                    .allowances
                    .get(&(c.owner, c.spender))
                    .copied()
                    .unwrap_or_default();
                IToken::allowanceCall::abi_encode_returns(&(amount,))
            }
            IToken::ITokenCalls::approve(_) => {
                return Err(GatewayError::Call("approve is not a read".into()));
            }
        };
        Ok(ret.into())
    }

    fn swap_effect(inner: &mut Inner, call: &SubmittedCall, from: Address) -> Result<(), ()> {
        match call {
            SubmittedCall::Approve {
                token,
                owner,
                spender,
                amount,
            } => {
                let token = inner.tokens.get_mut(token).ok_or(())?;
                token.allowances.insert((*owner, *spender), *amount);
                Ok(())
            }
            SubmittedCall::Swap {
                token_in,
                amount_in,
                min_out,
                to,
            } => {
                let pool = inner.pool.clone().ok_or(())?;
                let (reserve_in, reserve_out, token_out) = if *token_in == pool.token0 {
                    (pool.reserve0, pool.reserve1, pool.token1)
                } else if *token_in == pool.token1 {
                    (pool.reserve1, pool.reserve0, pool.token0)
                } else {
                    return Err(());
                };

                let out = constant_product_out(*amount_in, reserve_in, reserve_out);
                if out < *min_out {
                    return Err(());
                }

                // Pull the input: requires balance and allowance, like
                // the real contract.
                {
                    let token = inner.tokens.get_mut(token_in).ok_or(())?;
                    let allowance = token
                        .allowances
                        .get_mut(&(from, pool.address))
                        .ok_or(())?;
                    *allowance = allowance.checked_sub(*amount_in).ok_or(())?;
                    let balance = token.balances.get_mut(&from).ok_or(())?;
                    *balance = balance.checked_sub(*amount_in).ok_or(())?;
                }

                // Pay the output.
                {
                    let token = inner.tokens.get_mut(&token_out).ok_or(())?;
                    let balance = token.balances.entry(*to).or_default();
                    *balance += out;
                }

                let pool = inner.pool.as_mut().expect("pool vanished");
                if *token_in == pool.token0 {
                    pool.reserve0 += *amount_in;
                    pool.reserve1 -= out;
                } else {
                    pool.reserve1 += *amount_in;
                    pool.reserve0 -= out;
                }
                Ok(())
            }
        }
    }
}

#[async_trait]
impl LedgerGateway for MockLedger {
    async fn chain_id(&self) -> Result<u64, GatewayError> {
        tokio::task::yield_now().await;
        Ok(self.inner.lock().unwrap().chain_id)
    }

    async fn signer_account(&self) -> Result<Address, GatewayError> {
        tokio::task::yield_now().await;
        self.inner
            .lock()
            .unwrap()
            .accounts
            .first()
            .copied()
            .ok_or_else(|| GatewayError::Call("no unlocked accounts".into()))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, GatewayError> {
        tokio::task::yield_now().await;

        let is_pool = {
            let g = self.inner.lock().unwrap();
            g.pool.as_ref().map(|p| p.address) == Some(to)
        };

        if is_pool {
            let call = IPool::IPoolCalls::abi_decode(&data, true)?;

            // Quote latency applies before the response is computed, as
            // if the node evaluated the call when it got around to it.
            if let IPool::IPoolCalls::getAmountOut(c) = &call {
                let latency = {
                    let mut g = self.inner.lock().unwrap();
                    g.quote_reads += 1;
                    g.quote_latency.get(&c.amountIn).copied()
                };
                if let Some(latency) = latency {
                    tokio::time::sleep(latency).await;
                }
            }

            let g = self.inner.lock().unwrap();
            let pool = g.pool.as_ref().expect("pool vanished");
            let ret = match call {
                IPool::IPoolCalls::token0(_) => {
                    IPool::token0Call::abi_encode_returns(&(pool.token0,))
                }
                IPool::IPoolCalls::token1(_) => {
                    IPool::token1Call::abi_encode_returns(&(pool.token1,))
                }
                IPool::IPoolCalls::reserve0(_) => {
                    IPool::reserve0Call::abi_encode_returns(&(pool.reserve0,))
                }
                IPool::IPoolCalls::reserve1(_) => {
                    IPool::reserve1Call::abi_encode_returns(&(pool.reserve1,))
                }
                IPool::IPoolCalls::getAmountOut(c) => {
                    let (reserve_in, reserve_out) = if c.tokenIn == pool.token0 {
                        (pool.reserve0, pool.reserve1)
                    } else {
                        (pool.reserve1, pool.reserve0)
                    };
                    let out = constant_product_out(c.amountIn, reserve_in, reserve_out);
                    IPool::getAmountOutCall::abi_encode_returns(&(out,))
                }
                IPool::IPoolCalls::swapExactInput(_) => {
                    return Err(GatewayError::Call("swapExactInput is not a read".into()));
                }
            };
            return Ok(ret.into());
        }

        let g = self.inner.lock().unwrap();
        let token = g
            .tokens
            .get(&to)
            .ok_or_else(|| GatewayError::Call(format!("no contract at {to}")))?;
        Self::handle_token_call(token, IToken::ITokenCalls::abi_decode(&data, true)?)
    }

    async fn submit(&self, to: Address, data: Bytes) -> Result<PendingTx, GatewayError> {
        tokio::task::yield_now().await;

        let mut g = self.inner.lock().unwrap();
        if g.faults.fail_next_submit {
            g.faults.fail_next_submit = false;
            return Err(GatewayError::Submit("node rejected transaction".into()));
        }

        let from = g
            .accounts
            .first()
            .copied()
            .ok_or_else(|| GatewayError::Submit("no unlocked accounts".into()))?;

        let decoded = if g.pool.as_ref().map(|p| p.address) == Some(to) {
            match IPool::IPoolCalls::abi_decode(&data, true)? {
                IPool::IPoolCalls::swapExactInput(c) => SubmittedCall::Swap {
                    token_in: c.tokenIn,
                    amount_in: c.amountIn,
                    min_out: c.minOut,
                    to: c.to,
                },
                _ => return Err(GatewayError::Submit("read submitted as transaction".into())),
            }
        } else if g.tokens.contains_key(&to) {
            match IToken::ITokenCalls::abi_decode(&data, true)? {
                IToken::ITokenCalls::approve(c) => SubmittedCall::Approve {
                    token: to,
                    owner: from,
                    spender: c.spender,
                    amount: c.amount,
                },
                _ => return Err(GatewayError::Submit("read submitted as transaction".into())),
            }
        } else {
            return Err(GatewayError::Submit(format!("no contract at {to}")));
        };

        g.next_tx += 1;
        let tx_hash = B256::from(U256::from(g.next_tx));
        g.submitted.push(decoded.clone());
        g.pending.insert(tx_hash, decoded);

        Ok(PendingTx { tx_hash })
    }

    async fn await_confirmation(&self, tx: &PendingTx) -> Result<Confirmation, GatewayError> {
        tokio::task::yield_now().await;

        let latency = self.inner.lock().unwrap().confirm_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut g = self.inner.lock().unwrap();

        if g.faults.timeout_next_confirmation {
            g.faults.timeout_next_confirmation = false;
            return Err(GatewayError::TransactionTimedOut {
                tx_hash: tx.tx_hash,
                waited_ms: 90_000,
            });
        }

        let call = g
            .pending
            .remove(&tx.tx_hash)
            .ok_or_else(|| GatewayError::Call(format!("unknown tx {}", tx.tx_hash)))?;

        let from = g.accounts.first().copied().unwrap_or_default();

        if g.faults.revert_next_confirmation {
            g.faults.revert_next_confirmation = false;
            return Err(GatewayError::TransactionReverted {
                tx_hash: tx.tx_hash,
            });
        }

        if Self::swap_effect(&mut g, &call, from).is_err() {
            return Err(GatewayError::TransactionReverted {
                tx_hash: tx.tx_hash,
            });
        }

        g.block_number += 1;
        Ok(Confirmation {
            tx_hash: tx.tx_hash,
            block_number: g.block_number,
        })
    }
}
