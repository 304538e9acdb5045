//! Wire Protocol Module
//!
//! Minimal RESP-style framing (arrays of bulk strings in, simple string /
//! bulk string / error replies out) and the TCP server speaking it.

pub mod frame;
mod server;

pub use server::TcpServer;
