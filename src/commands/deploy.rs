use std::path::Path;

use anyhow::{Context, Result};

use crate::address::Address;
use crate::cli::Cli;
use crate::commands::{resolve_account, resolve_chain, resolve_network};
use crate::config::Config;
use crate::treasury::{TreasuryApi, TreasuryInit};

pub struct DeployArgs<'a> {
	pub code: &'a Path,
	pub base_value: u128,
	pub admin: Option<&'a str>,
	pub company: Option<&'a str>,
	pub proxy: Option<&'a str>,
	pub token: Option<&'a str>,
}

pub async fn run(cli: &Cli, args: DeployArgs<'_>) -> Result<()> {
	let config = Config::load()?;
	let profile = resolve_network(cli, &config)?;
	let account = resolve_account(cli, &config, profile)?;
	let chain = resolve_chain(cli, &config, profile)?;

	let code = std::fs::read_to_string(args.code)
		.with_context(|| format!("reading contract source {}", args.code.display()))?;

	let init = TreasuryInit {
		admin: or_account(args.admin, account)?,
		company: or_account(args.company, account)?,
		proxy: or_account(args.proxy, account)?,
		token: or_account(args.token, account)?,
		base_value: args.base_value,
	};

	println!("Deploying to {} (chain {})...", profile.name, profile.chain_id);
	let (tx, treasury) = TreasuryApi::deploy(chain, profile.chain_id, &code, &init).await?;

	println!("TX:       {}", tx.id);
	println!("Contract: {}", treasury.address());
	if !tx.receipt.success {
		tracing::warn!(tx = %tx.id, "deploy receipt reports failure");
		anyhow::bail!("deployment failed: {:?}", tx.receipt.exceptions);
	}

	let mut stored = Config::load_file()?;
	stored.contract.address = Some(treasury.address().to_string());
	stored.save()?;
	println!("Contract address saved to config.");
	Ok(())
}

fn or_account(arg: Option<&str>, account: Address) -> Result<Address> {
	match arg {
		Some(a) => a.parse(),
		None => Ok(account),
	}
}
