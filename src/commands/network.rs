use anyhow::Result;

use crate::address::Address;
use crate::chain::Chain;
use crate::cli::{Cli, NetworkCommand};
use crate::commands::{resolve_chain, resolve_network};
use crate::config::Config;
use crate::networks::NetworkProfile;
use crate::params::zil_to_qa;

/// Minimum balance the test account needs to pay for a deploy plus a
/// handful of transitions.
const MIN_BALANCE_ZIL: u128 = 10;

pub async fn run(cli: &Cli, cmd: &NetworkCommand) -> Result<()> {
	let config = Config::load()?;
	match cmd {
		NetworkCommand::Check => check(cli, &config).await,
	}
}

async fn check(cli: &Cli, config: &Config) -> Result<()> {
	let profile = resolve_network(cli, config)?;
	let chain = resolve_chain(cli, config, profile)?;

	println!("Network:  {} ({})", profile.name, chain.rpc().url());

	let id = chain.network_id().await?;
	if id != profile.chain_id {
		anyhow::bail!("chain id mismatch: node reports {id}, profile expects {}", profile.chain_id);
	}
	println!("Chain id: {id}");

	let account = chain
		.signer_address()
		.ok_or_else(|| anyhow::anyhow!("no signing account configured"))?;
	ensure_profile_account(profile, &account)?;
	println!("Account:  {} ({account})", account.to_bech32()?);

	let balance = chain.balance(&account).await?;
	println!("Balance:  {} Qa (nonce {})", balance.balance, balance.nonce);
	if balance.balance < zil_to_qa(MIN_BALANCE_ZIL)? {
		anyhow::bail!("account holds less than {MIN_BALANCE_ZIL} ZIL");
	}

	let min_gas = chain.minimum_gas_price().await?;
	println!("Min gas:  {min_gas} Qa");
	println!("OK");
	Ok(())
}

fn ensure_profile_account(profile: &NetworkProfile, account: &Address) -> Result<()> {
	let expected = profile.account_address()?;
	if *account != expected {
		anyhow::bail!(
			"signing account {account} does not match the {} test account {expected}",
			profile.name
		);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::networks;

	#[test]
	fn profile_account_in_any_spelling_passes() {
		let p = networks::lookup("sim").unwrap();
		let account: Address = p.account.to_uppercase().parse().unwrap();
		assert!(ensure_profile_account(p, &account).is_ok());
	}

	#[test]
	fn foreign_account_fails_the_check() {
		let p = networks::lookup("dev").unwrap();
		let err = ensure_profile_account(p, &Address::from_bytes([0x11; 20])).unwrap_err();
		assert!(err.to_string().contains("does not match the dev test account"));
	}
}
