//! Well-known top-level asset directories.
//!
//! Mods rename the base game's directories (`unitsE` becomes `unitsTAESC`,
//! and so on) while keeping the prefix. Tools that classify store entries
//! take a [`DirectoryLayout`] instead of hard-coding names.

use crate::ArchiveStore;

/// Role prefixes, matched case-insensitively against top-level directories.
const UNITS_PREFIX: &str = "units";
const WEAPONS_PREFIX: &str = "weapon";
const UNITPICS_PREFIX: &str = "unitpic";
const DOWNLOADS_PREFIX: &str = "downloads";

/// Names of the top-level directories holding each kind of asset.
///
/// Names are lowercase to match [`ArchiveStore`] keys. `None` means the
/// archive has no directory for that role.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DirectoryLayout {
    /// Unit definitions (`.fbi`)
    pub units: Option<String>,
    /// Weapon definitions (`.tdf`)
    pub weapons: Option<String>,
    /// Unit pictures (`.pcx`)
    pub unitpics: Option<String>,
    /// Build menu assignments (`.tdf`)
    pub downloads: Option<String>,
}

impl Default for DirectoryLayout {
    /// The base game's directory names.
    fn default() -> Self {
        Self {
            units: Some("unitse".to_string()),
            weapons: Some("weapone".to_string()),
            unitpics: Some("unitpice".to_string()),
            downloads: Some("downloadse".to_string()),
        }
    }
}

impl DirectoryLayout {
    /// A layout with no directories assigned.
    pub fn empty() -> Self {
        Self {
            units: None,
            weapons: None,
            unitpics: None,
            downloads: None,
        }
    }

    /// Detect the layout of `store` from its top-level directory names.
    pub fn detect(store: &ArchiveStore) -> Self {
        Self::detect_from_paths(store.paths())
    }

    /// Detect a layout from normalized virtual paths.
    ///
    /// For each role the first directory whose name starts with the role's
    /// prefix is chosen. `unitpic` directories are matched before `units` so
    /// `unitpicE` is never taken for unit definitions.
    pub fn detect_from_paths<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut layout = Self::empty();

        for path in paths {
            // Only entries inside a directory carry a role
            let Some((top, _)) = path.trim_start_matches('/').split_once('/') else {
                continue;
            };

            let slot = if top.starts_with(UNITPICS_PREFIX) {
                &mut layout.unitpics
            } else if top.starts_with(UNITS_PREFIX) {
                &mut layout.units
            } else if top.starts_with(WEAPONS_PREFIX) {
                &mut layout.weapons
            } else if top.starts_with(DOWNLOADS_PREFIX) {
                &mut layout.downloads
            } else {
                continue;
            };
            slot.get_or_insert_with(|| top.to_string());

            if layout.is_complete() {
                break;
            }
        }

        layout
    }

    /// Check if every role has a directory.
    pub fn is_complete(&self) -> bool {
        self.units.is_some()
            && self.weapons.is_some()
            && self.unitpics.is_some()
            && self.downloads.is_some()
    }

    /// Unit definition files.
    pub fn unit_files<'a>(&self, store: &'a ArchiveStore) -> Vec<(&'a str, &'a [u8])> {
        role_files(store, self.units.as_deref(), "fbi")
    }

    /// Weapon definition files.
    pub fn weapon_files<'a>(&self, store: &'a ArchiveStore) -> Vec<(&'a str, &'a [u8])> {
        role_files(store, self.weapons.as_deref(), "tdf")
    }

    /// Unit picture files.
    pub fn unitpic_files<'a>(&self, store: &'a ArchiveStore) -> Vec<(&'a str, &'a [u8])> {
        role_files(store, self.unitpics.as_deref(), "pcx")
    }

    /// Build menu files.
    pub fn download_files<'a>(&self, store: &'a ArchiveStore) -> Vec<(&'a str, &'a [u8])> {
        role_files(store, self.downloads.as_deref(), "tdf")
    }
}

fn role_files<'a>(
    store: &'a ArchiveStore,
    dir: Option<&str>,
    extension: &'static str,
) -> Vec<(&'a str, &'a [u8])> {
    match dir {
        Some(dir) => store.files_in(dir, Some(extension)).collect(),
        None => Vec::new(),
    }
}
