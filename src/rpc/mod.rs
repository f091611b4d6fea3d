// Public API - what other modules can use
pub use handler::handle_rpc;
pub use messages::{RpcCode, RpcMethod, RpcRequest, RpcResponse};

mod handler;
pub mod messages;
