// ── Paths ──────────────────────────────────────────────────────────

pub const DEFAULT_CONFIG_PATH: &str = "/etc/findings-worker/config.yaml";
pub const DEFAULT_LINK_STORE_PATH: &str = "/var/lib/findings-worker/links.redb";

// ── External endpoints ─────────────────────────────────────────────

pub const DEFAULT_VENDOR_API_URL: &str = "https://api.github.com";
pub const DEFAULT_INDEX_URL: &str = "http://127.0.0.1:9200";

// ── Channel capacities ─────────────────────────────────────────────

pub const JOB_CHANNEL_CAPACITY: usize = 1_024;
