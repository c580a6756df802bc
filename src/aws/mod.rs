//! Minimal AWS plumbing: credentials, request signing and a JSON client.
//!
//! Session and credential setup happen before enumeration starts;
//! sources only see an `AwsJsonClient`.

pub mod client;
pub mod credentials;
pub mod sigv4;

pub use client::AwsJsonClient;
pub use credentials::Credentials;
