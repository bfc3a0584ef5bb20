use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::Address;

/// Message version combined with the chain id into the tx version tag.
pub const MSG_VERSION: u32 = 1;

/// Gas price used by every transaction: 1000 Li.
pub const DEFAULT_GAS_PRICE: u128 = 1000 * QA_PER_LI;

/// Gas limit for transition calls.
pub const DEFAULT_GAS_LIMIT: u64 = 8000;

/// Gas limit for contract deployments.
pub const DEPLOY_GAS_LIMIT: u64 = 15000;

pub const QA_PER_LI: u128 = 1_000_000;
pub const QA_PER_ZIL: u128 = 1_000_000_000_000;

/// Pack a chain id and message version into the 32-bit version tag:
/// chain id in the upper 16 bits, message version in the lower 16.
/// Both must fit in 16 bits.
pub fn pack_version(chain_id: u32, msg_version: u32) -> Result<u32> {
	if chain_id > 0xffff {
		bail!("chain id {chain_id} does not fit in 16 bits");
	}
	if msg_version > 0xffff {
		bail!("message version {msg_version} does not fit in 16 bits");
	}
	Ok((chain_id << 16) | msg_version)
}

pub fn zil_to_qa(zil: u128) -> Result<u128> {
	zil.checked_mul(QA_PER_ZIL)
		.ok_or_else(|| anyhow!("{zil} ZIL overflows a Qa amount"))
}

/// Transaction parameters attached to every deploy or call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
	pub version: u32,
	/// Qa transferred with the transaction.
	pub amount: u128,
	/// Qa per unit of gas.
	pub gas_price: u128,
	pub gas_limit: u64,
}

impl TxParams {
	/// Defaults for transition calls on the given chain.
	pub fn for_chain(chain_id: u32) -> Result<Self> {
		Ok(Self {
			version: pack_version(chain_id, MSG_VERSION)?,
			amount: 0,
			gas_price: DEFAULT_GAS_PRICE,
			gas_limit: DEFAULT_GAS_LIMIT,
		})
	}

	pub fn with_amount(self, amount: u128) -> Self {
		Self { amount, ..self }
	}

	pub fn with_gas_limit(self, gas_limit: u64) -> Self {
		Self { gas_limit, ..self }
	}
}

/// One named, typed value in a transition argument list or an init list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
	pub vname: String,
	#[serde(rename = "type")]
	pub ty: String,
	pub value: Value,
}

impl Param {
	pub fn new(vname: &str, ty: &str, value: impl Into<Value>) -> Self {
		Self {
			vname: vname.to_owned(),
			ty: ty.to_owned(),
			value: value.into(),
		}
	}

	pub fn by_str20(vname: &str, address: &Address) -> Self {
		Self::new(vname, "ByStr20", address.to_string())
	}

	pub fn uint32(vname: &str, value: u32) -> Self {
		Self::new(vname, "Uint32", value.to_string())
	}

	/// `Uint256` values are passed as decimal strings; u128 covers every
	/// amount this client produces.
	pub fn uint256(vname: &str, value: u128) -> Self {
		Self::new(vname, "Uint256", value.to_string())
	}
}

/// The `data` payload of a transition call: `{"_tag": .., "params": [..]}`.
pub fn call_data(tag: &str, args: &[Param]) -> Value {
	serde_json::json!({
		"_tag": tag,
		"params": args,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_packs_chain_id_high() {
		assert_eq!(pack_version(1, 1).unwrap(), 65537);
		assert_eq!(pack_version(333, 1).unwrap(), 21823489);
		assert_eq!(pack_version(0xffff, MSG_VERSION).unwrap() >> 16, 0xffff);
	}

	#[test]
	fn version_rejects_values_wider_than_16_bits() {
		// 65537 would otherwise alias chain id 1.
		let err = pack_version(65537, 1).unwrap_err();
		assert!(err.to_string().contains("chain id 65537"));
		assert!(pack_version(1, 0x1_0000).is_err());
		assert!(TxParams::for_chain(70_000).is_err());
	}

	#[test]
	fn default_gas_price_is_1000_li() {
		assert_eq!(DEFAULT_GAS_PRICE, 1_000_000_000);
		assert_eq!(DEFAULT_GAS_PRICE, 1000 * QA_PER_LI);
		assert_eq!(zil_to_qa(10).unwrap(), 10_000_000_000_000);
	}

	#[test]
	fn zil_conversion_reports_overflow() {
		assert!(zil_to_qa(u128::MAX / QA_PER_ZIL).is_ok());
		let err = zil_to_qa(340_282_366_920_938_463_463_374_608).unwrap_err();
		assert!(err.to_string().contains("overflows"));
	}

	#[test]
	fn defaults_for_chain() {
		let p = TxParams::for_chain(333).unwrap();
		assert_eq!(p.version, pack_version(333, 1).unwrap());
		assert_eq!(p.amount, 0);
		assert_eq!(p.gas_limit, 8000);

		let paid = p.with_amount(42);
		assert_eq!(paid.amount, 42);
		assert_eq!(paid.gas_price, p.gas_price);
	}

	#[test]
	fn param_serializes_with_type_key() {
		let p = Param::uint256("tokens", 500);
		let json = serde_json::to_value(&p).unwrap();
		assert_eq!(
			json,
			serde_json::json!({"vname": "tokens", "type": "Uint256", "value": "500"})
		);
	}

	#[test]
	fn call_data_shape() {
		let data = call_data("Pause", &[]);
		assert_eq!(data["_tag"], "Pause");
		assert_eq!(data["params"], serde_json::json!([]));
	}
}
