mod account;
pub mod dto;
pub mod extract;
mod portal;
pub mod response;
mod router;

pub use account::account_router;
pub use portal::{Collection, portal_router};
pub use router::{AppState, create_router};
