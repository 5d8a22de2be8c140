//! JSON-RPC reference gateway for nodes with unlocked accounts.
//!
//! Suitable for dev/test nodes (anvil, hardhat): `eth_sendTransaction`
//! delegates signing to the node, so no key material lives here.
//! Production embedders supply their own [`LedgerGateway`] backed by an
//! injected wallet provider.

use std::time::Duration;

use alloy_primitives::{Address, B256, Bytes, hex};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, instrument};

use crate::error::GatewayError;
use crate::ledger::LedgerGateway;
use crate::types::{Confirmation, PendingTx};

pub struct HttpRpcGateway {
    http: Client,
    url: String,
    confirm_poll: Duration,
    confirm_timeout: Duration,
}

impl HttpRpcGateway {
    pub fn new(
        url: String,
        confirm_poll: Duration,
        confirm_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url,
            confirm_poll,
            confirm_timeout,
        })
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, GatewayError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp: Value = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = resp.get("error") {
            let msg = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown node error");
            return Err(GatewayError::Call(format!("{method}: {msg}")));
        }

        resp.get("result")
            .cloned()
            .ok_or_else(|| GatewayError::Call(format!("{method}: response has no result")))
    }
}

#[async_trait]
impl LedgerGateway for HttpRpcGateway {
    #[instrument(skip(self), level = "debug")]
    async fn chain_id(&self) -> Result<u64, GatewayError> {
        let result = self.rpc("eth_chainId", json!([])).await?;
        parse_hex_u64(&result).ok_or_else(|| GatewayError::Call("eth_chainId: bad hex".into()))
    }

    #[instrument(skip(self), level = "debug")]
    async fn signer_account(&self) -> Result<Address, GatewayError> {
        let result = self.rpc("eth_accounts", json!([])).await?;
        let first = result
            .as_array()
            .and_then(|a| a.first())
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::Call("eth_accounts: no unlocked accounts".into()))?;

        first
            .parse()
            .map_err(|_| GatewayError::Call(format!("eth_accounts: bad address {first}")))
    }

    #[instrument(skip(self, data), fields(to = %to), level = "debug")]
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, GatewayError> {
        let params = json!([{"to": to.to_string(), "data": hex::encode_prefixed(&data)}, "latest"]);
        let result = self.rpc("eth_call", params).await?;

        let raw = result
            .as_str()
            .ok_or_else(|| GatewayError::Call("eth_call: non-string result".into()))?;
        let bytes =
            hex::decode(raw).map_err(|e| GatewayError::Call(format!("eth_call: {e}")))?;

        Ok(bytes.into())
    }

    #[instrument(skip(self, data), fields(to = %to), level = "debug")]
    async fn submit(&self, to: Address, data: Bytes) -> Result<PendingTx, GatewayError> {
        let from = self.signer_account().await?;
        let params = json!([{
            "from": from.to_string(),
            "to": to.to_string(),
            "data": hex::encode_prefixed(&data),
        }]);

        let result = self
            .rpc("eth_sendTransaction", params)
            .await
            .map_err(|e| match e {
                GatewayError::Call(msg) => GatewayError::Submit(msg),
                other => other,
            })?;

        let tx_hash = result
            .as_str()
            .and_then(|s| s.parse::<B256>().ok())
            .ok_or_else(|| GatewayError::Submit("eth_sendTransaction: bad tx hash".into()))?;

        debug!(%tx_hash, "transaction submitted");
        Ok(PendingTx { tx_hash })
    }

    #[instrument(skip(self), fields(tx_hash = %tx.tx_hash), level = "debug")]
    async fn await_confirmation(&self, tx: &PendingTx) -> Result<Confirmation, GatewayError> {
        let deadline = Instant::now() + self.confirm_timeout;
        let mut ticker = interval(self.confirm_poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if Instant::now() >= deadline {
                return Err(GatewayError::TransactionTimedOut {
                    tx_hash: tx.tx_hash,
                    waited_ms: self.confirm_timeout.as_millis() as u64,
                });
            }

            let receipt = self
                .rpc(
                    "eth_getTransactionReceipt",
                    json!([tx.tx_hash.to_string()]),
                )
                .await?;

            match receipt_outcome(&receipt) {
                Some(ReceiptOutcome::Success { block_number }) => {
                    return Ok(Confirmation {
                        tx_hash: tx.tx_hash,
                        block_number,
                    });
                }
                Some(ReceiptOutcome::Reverted) => {
                    return Err(GatewayError::TransactionReverted {
                        tx_hash: tx.tx_hash,
                    });
                }
                None => continue, // not mined yet
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ReceiptOutcome {
    Success { block_number: u64 },
    Reverted,
}

/// Interpret an `eth_getTransactionReceipt` result. `None` means the
/// transaction is not mined yet (null receipt or missing fields).
fn receipt_outcome(receipt: &Value) -> Option<ReceiptOutcome> {
    if receipt.is_null() {
        return None;
    }

    match receipt.get("status").and_then(parse_hex_u64)? {
        1 => Some(ReceiptOutcome::Success {
            block_number: receipt.get("blockNumber").and_then(parse_hex_u64)?,
        }),
        _ => Some(ReceiptOutcome::Reverted),
    }
}

/// Parse a JSON `"0x..."` quantity into a u64.
fn parse_hex_u64(v: &Value) -> Option<u64> {
    let s = v.as_str()?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16).ok()
}
