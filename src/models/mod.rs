pub mod access_log;
pub mod gate_device;
pub mod match_event;
pub mod ticket;
pub mod user;

pub use access_log::{AccessLog, AccessOutcome, AccessType, NewAccessLog};
pub use gate_device::{GateDevice, GateType, NewGateDevice};
pub use match_event::{MatchEvent, MatchStatus, NewMatchEvent};
pub use ticket::{NewTicket, Ticket, TicketStatus};
pub use user::{NewUser, Role, User};
