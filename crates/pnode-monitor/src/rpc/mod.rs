mod envelope;
mod transport;

pub use envelope::{JsonRpcRequest, JsonRpcResponse, RpcErrorObject, JSONRPC_VERSION};
pub use transport::{HttpTransport, RpcTransport};

pub const METHOD_GOSSIP_NODES: &str = "pn_gossip_getNodes";
pub const METHOD_GET_STATS: &str = "get-stats";
pub const METHOD_GET_VERSION: &str = "get-version";
