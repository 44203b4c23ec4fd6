use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    pub data_dir: String,
    /// Entries packed into one on-disk node; also the cursor batch size
    pub entries_per_node: usize,
    /// Idle time (ms) a paused merge waits for a step before hibernating
    pub hibernate_after_ms: u64,
    /// Capacity of each merge unit's control mailbox
    pub mailbox_capacity: usize,
    /// zstd level applied to hibernation snapshots
    pub snapshot_compression_level: i32,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("SEGFORGE_CONFIG").unwrap_or_else(|_| "config".to_string());

    let settings: Settings = config::Config::builder()
        .set_default("engine.data_dir", "data")?
        .set_default("engine.entries_per_node", 512)?
        .set_default("engine.hibernate_after_ms", 5_000)?
        .set_default("engine.mailbox_capacity", 16)?
        .set_default("engine.snapshot_compression_level", 3)?
        .set_default("logging.log_dir", "logs")?
        .set_default("logging.stdout_level", "info")?
        .set_default("logging.file_level", "debug")?
        .add_source(config::File::with_name(&config_path).required(false))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
