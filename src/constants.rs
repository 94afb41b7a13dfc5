pub const DEFAULT_WINDOW_MS: u64 = 5_000;
pub const DEFAULT_TICK_RATE_MS: u64 = 1_000;

// Storage key holding the best rate as a base-10 string
pub const HIGH_SCORE_KEY: &str = "highScore";
pub const DEFAULT_STORE_PATH: &str = "./speed_clicker.json";

// Presentation only
pub const MAX_HISTORY: usize = 60;
pub const RIPPLE_TTL_MS: u64 = 600;
pub const RECORD_FLASH_MS: u64 = 1_500;
