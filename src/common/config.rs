/// Application configuration constants
pub struct AppConfig;

impl AppConfig {
    // SNMP endpoint defaults
    pub const SNMP_PORT: u16 = 161;
    pub const DEFAULT_COMMUNITY: &'static str = "public";
    pub const REQUEST_TIMEOUT_SECS: u64 = 5;

    // Walk and ping defaults
    pub const DEFAULT_START_OID: &'static str = "1.3.6.1.2.1";
    pub const DEFAULT_PING_OID: &'static str = "1.3.6.1.2.1.1.1.0";

    // Polling and series retention
    pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
    pub const DEFAULT_RETENTION_SECS: u64 = 1800;
    pub const POLL_EVENT_QUEUE_DEPTH: usize = 64;

    // Where MIB definition files are conventionally installed
    pub const MIB_DIRS: &'static [&'static str] = &[
        "/etc/sma/snmp/mibs",
        "/usr/share/snmp/mibs",
        "/opt/Net-SNMP/share/snmp/mibs",
    ];
}
