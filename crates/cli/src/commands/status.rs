//! `wt status`

use anyhow::Result;
use colored::Colorize as _;
use wt::Client;

pub async fn show(client: &Client, json: bool) -> Result<()> {
	let status = client.auth().status().await?;
	if json {
		println!("{}", serde_json::to_string_pretty(&status)?);
		return Ok(());
	}

	println!("{} {}", "server date:".bold(), status.date.format("%d-%m-%Y"));
	println!("{} {} ({})", "warehouse:".bold(), status.warehouse.name, status.warehouse.code);
	println!("{} {} ({})", "user:".bold(), status.user.login, status.user.code);
	println!("{} {}", "version:".bold(), status.version);
	Ok(())
}
