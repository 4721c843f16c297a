//! Remote global notes source.
//!
//! This module provides the contract the rest of the crate fetches global
//! notes through, and a blocking HTTP implementation of it.

mod client;

pub use client::{HttpNoteSource, HttpNoteSourceBuilder, RemoteError, RemoteNoteSource};
