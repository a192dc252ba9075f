//! Parameters default values

#![allow(missing_docs)]

pub mod chain {
    use synapse_data_model::extrinsic::NetUid;

    pub const DEFAULT_NETWORK: &str = "prometheus";
    pub const DEFAULT_NETUID: NetUid = NetUid(1);
}

pub mod submission {
    use std::time::Duration;

    pub const DEFAULT_VERSION_KEY: u64 = 0;
    pub const DEFAULT_WAIT_FOR_INCLUSION: bool = false;
    pub const DEFAULT_WAIT_FOR_FINALIZATION: bool = false;
    pub const DEFAULT_PROMPT: bool = false;
    // Applied when a caller asks for a guarded submission without a ttl of its own.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(100);
}
