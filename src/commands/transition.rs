use anyhow::Result;

use crate::address::Address;
use crate::cli::Cli;
use crate::commands::resolve_treasury;
use crate::config::Config;
use crate::receipt::Receipt;

/// A state-changing call requested from the command line.
pub enum Transition {
	Pause,
	Unpause,
	ChangeAdmin(Address),
	ChangeCompany(Address),
	BuyTokens { qa: u128 },
	SellTokens { tokens: u128 },
	CreateDebt { debtor: Address, amount: u128 },
}

pub async fn run(cli: &Cli, transition: Transition) -> Result<()> {
	let config = Config::load()?;
	let treasury = resolve_treasury(cli, &config)?;
	println!("Contract: {}", treasury.address());

	let receipt = match transition {
		Transition::Pause => treasury.pause().await?,
		Transition::Unpause => treasury.unpause().await?,
		Transition::ChangeAdmin(a) => treasury.change_admin(&a).await?,
		Transition::ChangeCompany(a) => treasury.change_company(&a).await?,
		Transition::BuyTokens { qa } => treasury.buy_tokens(qa).await?,
		Transition::SellTokens { tokens } => treasury.sell_tokens(tokens).await?,
		Transition::CreateDebt { debtor, amount } => treasury.create_debt(&debtor, amount).await?,
	};

	print_receipt(&receipt);
	if !receipt.success {
		tracing::warn!("transition rejected by contract");
		anyhow::bail!("transition failed");
	}
	Ok(())
}

fn print_receipt(receipt: &Receipt) {
	println!("Success:  {}", receipt.success);
	println!("Gas used: {}", receipt.cumulative_gas);
	println!("Epoch:    {}", receipt.epoch_num);
	for name in receipt.event_names() {
		println!("Event:    {name}");
	}
	for e in &receipt.exceptions {
		println!("Exception (line {}): {}", e.line, e.message);
	}
}
