mod settings;

pub use settings::{init_app_config, AppConfig, DEFAULT_API_BASE, DEFAULT_HTTP_TIMEOUT};
