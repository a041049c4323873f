//! Request pipeline and typed client for the Stock Manager API.
//!
//! Outbound requests are described by `RequestDescriptor` and stamped by
//! `RequestPipeline`; responses come back through `ResponseInterceptor`,
//! which handles expired-token renewal transparently. `ApiClient` is the
//! typed facade consumers actually call.

pub mod client;
pub mod error;
pub mod interceptor;
pub mod request;

pub use client::{ApiClient, Overview};
pub use error::ApiError;
pub use interceptor::ResponseInterceptor;
pub use request::{RequestDescriptor, RequestPipeline};
