mod http;
mod traits;
mod worker;

pub use http::HttpTransport;
pub use traits::{Method, PageFragment, Transport, UNSET_TIMESTAMP, WireRequest, WireResponse};
pub use worker::{GatewayResult, RequestGateway, RequestId};
