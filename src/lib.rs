pub mod auth;
pub mod client;
pub mod db;
pub mod dto;
pub mod error;
pub mod hub;
pub mod mentorship;
pub mod middleware;
pub mod notification;
pub mod response;
pub mod routes;
pub mod schedule;
pub mod state;
pub mod timestamp;
pub mod user;
