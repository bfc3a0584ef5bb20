use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{SignedTransaction, UnsignedTransaction};
use crate::address::Address;

/// Signs by posting the unsigned transaction to a signing service over
/// JSON-RPC (`sign_transaction`). The service holds the key for
/// `address` and answers with `{"pubKey": .., "signature": ..}`.
pub struct RemoteSigner {
	url: String,
	address: Address,
	http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureParts {
	pub_key: String,
	signature: String,
}

impl RemoteSigner {
	pub fn new(url: &str, address: Address) -> Self {
		Self {
			url: url.to_owned(),
			address,
			http: reqwest::Client::new(),
		}
	}
}

/// `sign_transaction` request: the account whose key should sign, and
/// the transaction itself.
fn sign_request(account: &Address, tx: &UnsignedTransaction) -> Result<Value> {
	Ok(json!({
		"id": 1,
		"jsonrpc": "2.0",
		"method": "sign_transaction",
		"params": [{
			"account": account.to_bech32()?,
			"tx": tx,
		}]
	}))
}

#[async_trait::async_trait]
impl super::Signer for RemoteSigner {
	fn address(&self) -> Address {
		self.address
	}

	async fn sign_transaction(&self, tx: UnsignedTransaction) -> Result<SignedTransaction> {
		let body = sign_request(&self.address, &tx)?;
		tracing::debug!(url = %self.url, nonce = tx.nonce, "requesting signature");

		let resp: Value = self.http.post(&self.url).json(&body).send().await?.json().await?;
		let parts = signature_from_response(resp)?;

		Ok(SignedTransaction {
			tx,
			pub_key: parts.pub_key,
			signature: parts.signature,
		})
	}
}

fn signature_from_response(resp: Value) -> Result<SignatureParts> {
	let result = resp.get("result").cloned().ok_or_else(|| {
		let err = resp.get("error").cloned().unwrap_or(Value::Null);
		anyhow!("signing service error: {err}")
	})?;
	Ok(serde_json::from_value(result)?)
}
