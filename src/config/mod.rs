mod settings;

pub use settings::{CollectorConfig, OtelConfig, Settings};
