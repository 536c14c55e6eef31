mod settings;

pub use settings::{
    CacheBackend, CacheConfig, SalesforceConfig, Settings, load_settings, settings_from_lookup,
};
