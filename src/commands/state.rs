use anyhow::Result;

use crate::cli::{Cli, StateField};
use crate::commands::resolve_treasury;
use crate::config::Config;

pub async fn run(cli: &Cli, field: Option<StateField>) -> Result<()> {
	let config = Config::load()?;
	let treasury = resolve_treasury(cli, &config)?;

	let Some(field) = field else {
		let state = treasury.get_state().await?;
		println!("{}", serde_json::to_string_pretty(&state)?);
		return Ok(());
	};

	match field {
		StateField::Balance => println!("{} Qa", treasury.get_zil_balance().await?),
		StateField::TokenBalance => println!("{}", treasury.get_token_balance().await?),
		StateField::ZilPrice => println!("{}", treasury.get_zil_price().await?),
		StateField::TokenPrice => println!("{}", treasury.get_token_price().await?),
		StateField::Admin => println!("{}", treasury.get_admin().await?),
		StateField::Company => println!("{}", treasury.get_company().await?),
		StateField::Paused => println!("{}", treasury.is_paused().await?),
		StateField::UnderFunded => println!("{}", treasury.is_under_funded().await?),
	}
	Ok(())
}
