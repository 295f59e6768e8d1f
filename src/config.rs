use clap::Parser;
use tracing::Level;

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

/// Server settings, read from the command line with environment fallbacks.
#[derive(Parser, Debug, Clone)]
#[command(name = "keyvald", version, about)]
pub struct Config {
    /// The address to bind the listener to
    #[arg(short, long, env = "KEYVALD_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// The port to listen on
    #[arg(short, long, env = "KEYVALD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The largest frame, in bytes, a client may send
    #[arg(long, env = "KEYVALD_MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,

    /// Maximum level of the emitted logs (trace, debug, info, warn, error)
    #[arg(long, env = "KEYVALD_LOG_LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            log_level: Level::INFO,
        }
    }
}
