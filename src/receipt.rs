use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A confirmed transaction as returned by `GetTransaction`.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
	#[serde(rename = "ID")]
	pub id: String,
	pub receipt: Receipt,
}

/// Outcome of a transaction. `success` plus `exceptions` is the only
/// contract-level signal; a failed receipt is not an error locally.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Receipt {
	pub success: bool,
	#[serde(default, deserialize_with = "lenient_u64")]
	pub cumulative_gas: u64,
	#[serde(default, deserialize_with = "lenient_u64")]
	pub epoch_num: u64,
	#[serde(default)]
	pub event_logs: Vec<EventLog>,
	#[serde(default)]
	pub exceptions: Vec<ContractException>,
	#[serde(default)]
	pub errors: Value,
	#[serde(default)]
	pub transitions: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventLog {
	#[serde(rename = "_eventname")]
	pub name: String,
	#[serde(default)]
	pub address: Option<String>,
	#[serde(default)]
	pub params: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContractException {
	#[serde(default)]
	pub line: u32,
	pub message: String,
}

impl Receipt {
	/// Whether any exception carries the given `Int32` error code, e.g.
	/// `(code : (Int32 -1))` in a message thrown by the contract.
	pub fn has_exception_code(&self, code: i32) -> bool {
		let needle = format!("(Int32 {code})");
		self.exceptions.iter().any(|e| e.message.contains(&needle))
	}

	pub fn event_names(&self) -> Vec<&str> {
		self.event_logs.iter().map(|e| e.name.as_str()).collect()
	}
}

/// The node encodes most counters as decimal strings but older
/// versions send plain numbers.
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
	match Value::deserialize(deserializer)? {
		Value::Null => Ok(0),
		Value::Number(n) => n
			.as_u64()
			.ok_or_else(|| serde::de::Error::custom(format!("not a u64: {n}"))),
		Value::String(s) => s.parse().map_err(serde::de::Error::custom),
		other => Err(serde::de::Error::custom(format!("expected number, got {other}"))),
	}
}
