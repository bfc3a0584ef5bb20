use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::address::Address;
use crate::receipt::Transaction;
use crate::signer::SignedTransaction;

/// Failure talking to the node's JSON-RPC API.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
	/// The node answered with a JSON-RPC error object.
	#[error("{method} rejected by node ({code}): {message}")]
	Node {
		method: String,
		code: i64,
		message: String,
	},

	#[error("{method}: response has neither result nor error")]
	EmptyResponse { method: String },

	#[error("{method}: unexpected result shape: {source}")]
	Decode {
		method: String,
		#[source]
		source: serde_json::Error,
	},

	#[error(transparent)]
	Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
	#[serde(deserialize_with = "de_u128_string")]
	pub balance: u128,
	pub nonce: u64,
}

/// Response of `CreateTransaction`.
#[derive(Debug, Clone, Deserialize)]
pub struct TxSubmission {
	#[serde(rename = "TranID")]
	pub tran_id: String,
	#[serde(rename = "Info", default)]
	pub info: String,
	/// Present only for deployments.
	#[serde(rename = "ContractAddress", default)]
	pub contract_address: Option<String>,
}

/// Thin JSON-RPC 2.0 client for a Zilliqa node (or the isolated server).
pub struct RpcClient {
	url: String,
	http: reqwest::Client,
}

impl RpcClient {
	pub fn new(url: &str) -> Self {
		Self {
			url: url.to_owned(),
			http: reqwest::Client::new(),
		}
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	/// Issue one JSON-RPC request and decode its `result`.
	pub async fn request<T: DeserializeOwned>(
		&self,
		method: &str,
		params: Value,
	) -> Result<T, RpcError> {
		let body = json!({
			"id": "1",
			"jsonrpc": "2.0",
			"method": method,
			"params": params,
		});
		tracing::debug!(method, url = %self.url, "rpc request");

		let resp: Value = self.http.post(&self.url).json(&body).send().await?.json().await?;
		decode_response(method, resp)
	}

	// -- Node queries --

	pub async fn get_network_id(&self) -> Result<String, RpcError> {
		self.request("GetNetworkId", json!([""])).await
	}

	pub async fn get_balance(&self, address: &Address) -> Result<Balance, RpcError> {
		self.request("GetBalance", json!([address.to_bare_hex()])).await
	}

	pub async fn get_minimum_gas_price(&self) -> Result<String, RpcError> {
		self.request("GetMinimumGasPrice", json!([""])).await
	}

	pub async fn get_transaction(&self, tx_id: &str) -> Result<Transaction, RpcError> {
		self.request("GetTransaction", json!([tx_id])).await
	}

	pub async fn create_transaction(
		&self,
		tx: &SignedTransaction,
	) -> Result<TxSubmission, RpcError> {
		let payload = serde_json::to_value(tx).map_err(|source| RpcError::Decode {
			method: "CreateTransaction".into(),
			source,
		})?;
		self.request("CreateTransaction", json!([payload])).await
	}

	// -- Contract queries --

	/// `GetSmartContractSubState`; the node answers `null` when the field
	/// (or map key) does not exist.
	pub async fn get_sub_state(
		&self,
		contract: &Address,
		field: &str,
		indices: &[String],
	) -> Result<Option<Value>, RpcError> {
		self.request(
			"GetSmartContractSubState",
			json!([contract.to_bare_hex(), field, indices]),
		)
		.await
	}

	pub async fn get_state(&self, contract: &Address) -> Result<Value, RpcError> {
		self.request("GetSmartContractState", json!([contract.to_bare_hex()]))
			.await
	}
}

// -- Private helpers --

fn decode_response<T: DeserializeOwned>(method: &str, mut resp: Value) -> Result<T, RpcError> {
	if let Some(err) = resp.get("error").filter(|e| !e.is_null()) {
		return Err(RpcError::Node {
			method: method.to_owned(),
			code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
			message: err
				.get("message")
				.and_then(Value::as_str)
				.unwrap_or_default()
				.to_owned(),
		});
	}

	let result = match resp.get_mut("result") {
		Some(r) => r.take(),
		None => {
			return Err(RpcError::EmptyResponse {
				method: method.to_owned(),
			})
		}
	};

	serde_json::from_value(result).map_err(|source| RpcError::Decode {
		method: method.to_owned(),
		source,
	})
}

fn de_u128_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
	let s = String::deserialize(deserializer)?;
	s.parse().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_error_is_surfaced() {
		let resp = json!({
			"id": "1",
			"jsonrpc": "2.0",
			"error": {"code": -5, "message": "Account is not created"}
		});
		let err = decode_response::<Balance>("GetBalance", resp).unwrap_err();
		assert!(matches!(err, RpcError::Node { code: -5, .. }));
		assert_eq!(
			err.to_string(),
			"GetBalance rejected by node (-5): Account is not created"
		);
	}

	#[test]
	fn balance_result_decodes() {
		let resp = json!({
			"id": "1",
			"jsonrpc": "2.0",
			"result": {"balance": "18446744073709551616000", "nonce": 7}
		});
		let bal: Balance = decode_response("GetBalance", resp).unwrap();
		assert_eq!(bal.balance, 18_446_744_073_709_551_616_000);
		assert_eq!(bal.nonce, 7);
	}

	#[test]
	fn null_sub_state_is_none() {
		let resp = json!({"id": "1", "jsonrpc": "2.0", "result": null});
		let v: Option<Value> = decode_response("GetSmartContractSubState", resp).unwrap();
		assert!(v.is_none());
	}

	#[test]
	fn missing_result_is_an_error() {
		let resp = json!({"id": "1", "jsonrpc": "2.0"});
		let err = decode_response::<String>("GetNetworkId", resp).unwrap_err();
		assert!(matches!(err, RpcError::EmptyResponse { .. }));
	}

	#[test]
	fn submission_decodes_contract_address() {
		let resp = json!({
			"id": "1",
			"jsonrpc": "2.0",
			"result": {
				"Info": "Contract Creation txn, sent to shard",
				"TranID": "deadbeef",
				"ContractAddress": "7bb3b0e8a59f3f61d9bff038f4aeb42cae2ecce8"
			}
		});
		let sub: TxSubmission = decode_response("CreateTransaction", resp).unwrap();
		assert_eq!(sub.tran_id, "deadbeef");
		assert!(sub.contract_address.is_some());
	}
}
