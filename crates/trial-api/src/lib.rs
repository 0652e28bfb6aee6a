pub mod auth;
pub mod campaigns;
pub mod error;
pub mod flash;
pub mod forms;
pub mod middleware;
pub mod proposals;
pub mod render;
pub mod routes;
pub mod services;
pub mod state;
