//! # Luskad client
//!
//! Read-only HTTP client for the Luskad project-management API.
//!
//! ```rust,no_run
//! use luskad_client::{LuskadClient, ProjectApi, Resource, ResourceRequest};
//!
//! # async fn example() -> luskad_client::LuskadResult<()> {
//! let client = LuskadClient::builder()
//!     .base_url("https://app.luskad.com/api/v1")
//!     .api_key("sk-your-api-key")
//!     .build()?;
//!
//! let request = ResourceRequest::project("42", Resource::Tasks).search(Some("urgent"));
//! match client.fetch(&request).await {
//!     Some(tasks) => println!("{}", tasks),
//!     None => println!("Failed to retrieve tasks"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use api::{ProjectApi, Resource, ResourceRequest};
pub use client::{LuskadClient, LuskadClientBuilder};
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::{LuskadError, LuskadResult};
