//! `wt staff ...`

use anyhow::Result;
use colored::Colorize as _;
use wt::Client;

use super::ticket::print_tickets;
use crate::cli::StaffCommands;

pub async fn dispatch(client: &Client, command: &StaffCommands, json: bool) -> Result<()> {
	match command {
		StaffCommands::List => list(client, json).await,
		StaffCommands::Tickets { staff_unid } => tickets(client, *staff_unid, json).await,
	}
}

async fn list(client: &Client, json: bool) -> Result<()> {
	let listing = client.staff().list().await?;
	if json {
		println!("{}", serde_json::to_string_pretty(&listing)?);
		return Ok(());
	}

	for member in &listing.staff {
		let tasks = member.tasks.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
		println!("{:>8}  {:<6} {:<32} {:>5}", member.unid, member.staff_code.bold(), member.name, tasks);
	}
	println!("{} {}", "open tasks total:".bold(), listing.total_tasks);
	Ok(())
}

async fn tickets(client: &Client, staff_unid: u64, json: bool) -> Result<()> {
	let tickets = client.staff().list_tickets(staff_unid).await?;
	if json {
		println!("{}", serde_json::to_string_pretty(&tickets)?);
		return Ok(());
	}
	print_tickets(&tickets);
	Ok(())
}
