mod client;

pub use client::config::{Config, ConfigBuilder};
pub use client::consts::DEFAULT_URL;
pub use client::stats::Stats;
pub use client::{Client, connect, connect_with_config};
