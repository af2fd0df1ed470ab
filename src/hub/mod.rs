pub mod connection;
pub mod types;

pub use connection::{ConnectionManager, HubSender};
pub use types::HubMessage;
