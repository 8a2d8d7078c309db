//! Core types, trait definitions, and the ticket service for the help desk.
//!
//! This crate has no database dependencies. Storage backends
//! implement [`store::TicketStore`]; front ends drive
//! [`service::TicketService`] and render what it returns.

// Native `async fn` in trait impls; the trait declarations spell out `Send`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod lifecycle;
pub mod reference;
pub mod service;
pub mod store;
pub mod ticket;

pub use error::{Error, Result};
