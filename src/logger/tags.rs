/// Log tags identify the subsystem a message comes from
///
/// Tags drive both the colored console column and per-tag debug filtering
/// (`--debug rpc`, `--debug store`, ...).

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Rpc,
    Holders,
    Store,
    World,
    Webserver,
}

impl LogTag {
    /// Key used by `--debug <key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Rpc => "rpc".to_string(),
            LogTag::Holders => "holders".to_string(),
            LogTag::Store => "store".to_string(),
            LogTag::World => "world".to_string(),
            LogTag::Webserver => "webserver".to_string(),
        }
    }

    /// Uncolored label used in log files
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::System => "SYSTEM".to_string(),
            LogTag::Config => "CONFIG".to_string(),
            LogTag::Rpc => "RPC".to_string(),
            LogTag::Holders => "HOLDERS".to_string(),
            LogTag::Store => "STORE".to_string(),
            LogTag::World => "WORLD".to_string(),
            LogTag::Webserver => "WEBSERVER".to_string(),
        }
    }
}
