pub mod auction;
pub mod bidding;
pub mod broadcast;
pub mod chat;
pub mod handlers;
pub mod query;
pub mod scheduler;
pub mod store;
