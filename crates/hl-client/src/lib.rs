pub mod endpoints;
pub mod http;
pub mod response;

pub use crate::http::{HttpApi, HttpConfig};
