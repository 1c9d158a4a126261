pub mod env;
pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use env::{collect_environment, load_dotenv, parse_dotenv};
pub use error::ConfigError;
pub use load::load_settings_from;
pub use paths::{
    default_global_config_path, default_state_root, dotenv_path, GLOBAL_SETTINGS_FILE_NAME,
    GLOBAL_STATE_DIR,
};
pub use settings::Settings;
