pub mod api;
pub mod config;
pub mod controller;
pub mod entities;
pub mod error;
pub mod external;
mod helpers;
pub mod platform;
