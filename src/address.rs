use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

const ZIL_HRP: &str = "zil";

/// A 20-byte Zilliqa account or contract address.
///
/// Addresses show up in three spellings: lowercase `0x` hex (contract
/// state, RPC results), mixed-case checksum hex (`toAddr` of a
/// transaction) and bech32 with the `zil` prefix (wallets, config).
/// All three parse to the same value, so comparing parsed addresses
/// is enough to check two spellings name the same account.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
	/// Target of contract deployments.
	pub const ZERO: Address = Address([0u8; 20]);

	pub fn from_bytes(bytes: [u8; 20]) -> Self {
		Self(bytes)
	}

	pub fn as_bytes(&self) -> &[u8; 20] {
		&self.0
	}

	/// Lowercase hex without the `0x` prefix, as the RPC API expects for
	/// account queries.
	pub fn to_bare_hex(&self) -> String {
		hex::encode(self.0)
	}

	/// Mixed-case checksum form, `0x`-prefixed.
	pub fn to_checksum(&self) -> String {
		let lower = self.to_bare_hex();
		let hash: [u8; 32] = Sha256::digest(self.0).into();

		let mut out = String::with_capacity(42);
		out.push_str("0x");
		for (i, c) in lower.chars().enumerate() {
			if c.is_ascii_digit() {
				out.push(c);
				continue;
			}
			// Bit (255 - 6i) of the hash, counted from the least
			// significant end of the big-endian digest.
			let bit = 255 - 6 * i;
			let byte = hash[31 - bit / 8];
			if byte & (1 << (bit % 8)) != 0 {
				out.push(c.to_ascii_uppercase());
			} else {
				out.push(c);
			}
		}
		out
	}

	/// Bech32 form with the `zil` human-readable part.
	pub fn to_bech32(&self) -> Result<String> {
		let hrp = Hrp::parse(ZIL_HRP)?;
		Ok(bech32::encode::<Bech32>(hrp, &self.0)?)
	}

	fn from_hex(s: &str) -> Result<Self> {
		let clean = s
			.strip_prefix("0x")
			.or_else(|| s.strip_prefix("0X"))
			.unwrap_or(s);
		if clean.len() != 40 {
			bail!("invalid address length: expected 40 hex chars, got {}", clean.len());
		}
		let raw = hex::decode(clean).map_err(|e| anyhow!("invalid address hex: {e}"))?;
		let mut bytes = [0u8; 20];
		bytes.copy_from_slice(&raw);
		Ok(Self(bytes))
	}

	fn from_bech32(s: &str) -> Result<Self> {
		let (hrp, data) = bech32::decode(s).map_err(|e| anyhow!("invalid bech32 address: {e}"))?;
		// Bech32 allows an all-uppercase spelling; the prefix keeps its case.
		if !hrp.as_str().eq_ignore_ascii_case(ZIL_HRP) {
			bail!("unexpected bech32 prefix {:?}, expected {ZIL_HRP:?}", hrp.as_str());
		}
		let bytes: [u8; 20] = data
			.try_into()
			.map_err(|v: Vec<u8>| anyhow!("bech32 address decodes to {} bytes, expected 20", v.len()))?;
		Ok(Self(bytes))
	}
}

impl FromStr for Address {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		let s = s.trim();
		if s.to_ascii_lowercase().starts_with("zil1") {
			Self::from_bech32(s)
		} else {
			Self::from_hex(s)
		}
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", self.to_bare_hex())
	}
}

impl fmt::Debug for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Address({self})")
	}
}

impl Serialize for Address {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Address {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}
