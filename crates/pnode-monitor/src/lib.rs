#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod geo;
pub mod gossip;
pub mod logging;
pub mod normalize;
pub mod poller;
pub mod rpc;
pub mod store;
pub mod view;

pub use config::{GeoConfig, LogLevel, LoggingConfig, MonitorConfig};
pub use geo::{GeoCache, GeoLocation};
pub use gossip::{GossipFetcher, SeedHost};
pub use logging::{init_logging, LogSettings};
pub use normalize::{normalize_batch, NormalizeContext, RawNode, RawRecord};
pub use poller::{CycleOutcome, Poller};
pub use rpc::{HttpTransport, JsonRpcRequest, RpcTransport};
pub use store::{FetchState, PnodeStore, DEFAULT_FETCH_ERROR};
pub use view::{
    locate_text, resource_series, trend_series, windowed_history, ChartMode, NodeRow,
    OverviewStats, ResourcePoint, SortKey, SortOrder, StatusFilter, ViewQuery,
};
