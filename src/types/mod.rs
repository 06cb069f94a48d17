mod input;
mod models;
mod stats;

pub use input::{Fields, PortalImport, PortalRecord, new_id, now, parse_timestamp};
pub use models::*;
pub use stats::{StatKey, Stats, coerce_number};
