//! WTicket CLI: ticket queries and updates from the command line.

pub mod cli;
pub mod commands;
pub mod logging;
