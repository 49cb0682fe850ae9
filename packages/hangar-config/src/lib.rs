pub mod catalog;
pub mod error;
pub mod settings;
pub mod utils;

pub use catalog::{Addon, AddonTrack, Catalog, ReleaseModel};
pub use error::{ConfigError, ConfigResult};
pub use settings::HangarConfig;
pub use utils::{data_dir, default_data_dir, get_data_path};
