use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::address::Address;

/// Environment variable selecting the network profile.
pub const NETWORK_ENV: &str = "TREASURY_NETWORK";

/// Profile used when `TREASURY_NETWORK` is unset.
pub const DEFAULT_NETWORK: &str = "sim";

/// Connection details and test account for one network.
#[derive(Debug)]
pub struct NetworkProfile {
	pub name: &'static str,
	pub endpoint: &'static str,
	pub chain_id: u32,
	/// Bech32 address of the test account.
	pub account: &'static str,
	/// Signing service holding the test account's key.
	pub signer_url: &'static str,
	pub timeout_deploy: Duration,
	pub timeout_transition: Duration,
}

impl NetworkProfile {
	pub fn account_address(&self) -> Result<Address> {
		self.account.parse()
	}
}

/// All known networks, keyed by name.
pub static NETWORKS: [NetworkProfile; 2] = [
	NetworkProfile {
		name: "dev",
		endpoint: "https://dev-api.zilliqa.com",
		chain_id: 333,
		account: "zil1pw587sm57lvlu0wlwkc3gw2sddy35au6esw589",
		signer_url: "http://localhost:5556",
		timeout_deploy: Duration::from_secs(300),
		timeout_transition: Duration::from_secs(300),
	},
	NetworkProfile {
		name: "sim",
		endpoint: "http://localhost:5555",
		chain_id: 1,
		account: "zil10wemp699nulkrkdl7qu0ft459jhzan8g6r5lh7",
		signer_url: "http://localhost:5556",
		timeout_deploy: Duration::from_secs(300),
		timeout_transition: Duration::from_secs(300),
	},
];

/// Look up a profile by name, ignoring case.
pub fn lookup(name: &str) -> Result<&'static NetworkProfile> {
	NETWORKS
		.iter()
		.find(|n| n.name.eq_ignore_ascii_case(name))
		.ok_or_else(|| anyhow!("unknown blockchain network: {name}"))
}

/// Resolve the profile named by `TREASURY_NETWORK`, defaulting to `sim`.
pub fn from_env() -> Result<&'static NetworkProfile> {
	let name = std::env::var(NETWORK_ENV).unwrap_or_else(|_| DEFAULT_NETWORK.into());
	let profile = lookup(&name)?;
	tracing::debug!(network = profile.name, endpoint = profile.endpoint, "network selected");
	Ok(profile)
}
