//! Settings version migration.

use crate::SettingsError;
use crate::schema::Settings;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut settings: Settings) -> Result<Settings, SettingsError> {
    while settings.version < LATEST_VERSION {
        settings = migrate_one_version(settings)?;
    }
    Ok(settings)
}

fn migrate_one_version(settings: Settings) -> Result<Settings, SettingsError> {
    match settings.version {
        0 => migrate_v0_to_v1(settings),
        v => Err(SettingsError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 files predate the explicit version key; their shape is the same.
fn migrate_v0_to_v1(mut settings: Settings) -> Result<Settings, SettingsError> {
    settings.version = 1;
    Ok(settings)
}
