pub mod http;
pub mod request;
