//! Entity services: thin consumers of the protocol capabilities.
//!
//! Each service borrows the query engine and the form channel from the
//! client; the per-entity knowledge here is limited to query ids, column
//! positions, and form field ids.

mod staff;
mod ticket;

pub use staff::{StaffList, StaffMember, StaffService};
pub use ticket::{
    MessageColor, MessageKind, NewMessage, SearchColumn, Ticket, TicketMessage, TicketService,
};
