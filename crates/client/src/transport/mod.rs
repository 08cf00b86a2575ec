//! Transport layer for the Luskad client.

pub mod http;

pub use http::HttpTransport;
