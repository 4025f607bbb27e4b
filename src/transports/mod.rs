//! HTTP transport implementations

pub mod http;

pub use http::ReqwestTransport;
