pub const DEFAULT_SEED_RPC_PORT: u16 = 6000;
pub const DEFAULT_SEED_RPC_PATH: &str = "/rpc";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_GEO_ENDPOINT: &str = "http://ip-api.com/json";

pub const DEFAULT_SEEDS: &[&str] = &[
    "173.212.203.145",
    "173.212.220.65",
    "161.97.97.41",
    "192.190.136.36",
    "192.190.136.37",
    "192.190.136.38",
    "192.190.136.28",
    "192.190.136.29",
    "207.244.255.1",
];
