//! Ethereum JSON-RPC side of w3deploy.
//!
//! [`ChainConnection`] owns a wallet-backed HTTP provider for one network
//! and one sending account. From it:
//!
//! - [`ChainConnection::resolve`] turns a domain or literal address into a
//!   flat directory address,
//! - [`ChainConnection::directory`] binds a [`DirectoryClient`], the
//!   [`ChainClient`](w3deploy_upload::ChainClient) the upload pipeline runs on,
//! - [`admin`] holds the one-shot management calls (`create`, `refund`,
//!   `setDefault`).

pub mod admin;
pub mod client;
pub mod contracts;
pub mod error;
pub mod resolve;

pub use client::{ChainConnection, DirectoryClient};
pub use error::ChainClientError;
pub use resolve::namehash;
