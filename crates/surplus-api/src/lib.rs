pub mod auth;
pub mod contact;
pub mod error;
pub mod filter;
pub mod listings;
pub mod middleware;
pub mod pages;
pub mod render;
pub mod routes;
pub mod seed;
pub mod state;
pub mod sync;
