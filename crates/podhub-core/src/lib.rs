//! Core types and trait definitions for podhub.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the domain model, the [`store::PodcastStore`] abstraction, approximate name
//! search ([`matcher`]), and follower fan-out ([`notifier`]).

pub mod error;
pub mod matcher;
pub mod notification;
pub mod notifier;
pub mod podcast;
pub mod social;
pub mod store;
pub mod user;

pub use error::{Classify, Error, ErrorKind, Result};
