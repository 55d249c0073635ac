//! Chip descriptor lookup.
//!
//! The kernel numbers every GPIO line in one flat space; each controller
//! (`gpiochip<base>` under the GPIO root) owns the range starting at its
//! `base`. A device-relative pin number becomes a sysfs number by adding the
//! base of the chip that owns it.

use std::{fs, path::Path};

use log::{debug, warn};

use crate::{
    config::SysfsConfig,
    error::{Error, Result},
    sysfs,
};

/// Which chip descriptor to resolve a base from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChipSelector {
    /// The last descriptor in enumeration order, i.e. the name that sorts
    /// first. Only meaningful on systems with a single GPIO controller.
    #[default]
    Last,
    /// A descriptor by directory name, e.g. `gpiochip400`.
    Named(String),
}

/// What sysfs reports about one chip descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipInfo {
    pub name: String,
    pub base: u32,
    /// Number of lines, when the `ngpio` file is present and readable.
    pub ngpio: Option<u32>,
    /// Controller label, when present and readable.
    pub label: Option<String>,
}

/// Lists the entries of the GPIO root whose name contains the chip prefix.
///
/// Descriptors come back in reverse name order, so the result does not
/// depend on how the filesystem happens to enumerate the directory.
pub fn list_chip_descriptors(config: &SysfsConfig) -> Result<Vec<String>> {
    let root = &config.gpio_root;
    let entries = fs::read_dir(root).map_err(|e| Error::io(root, e))?;

    let mut descriptors = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(root, e))?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.contains(config.chip_prefix.as_str()) {
            descriptors.push(name);
        }
    }

    descriptors.sort_unstable_by(|a, b| b.cmp(a));
    Ok(descriptors)
}

/// Reads and parses `<gpio-root>/<descriptor>/base`.
pub fn resolve_base(config: &SysfsConfig, descriptor: &str) -> Result<u32> {
    read_number(&config.gpio_root.join(descriptor).join("base"))
}

/// Base of the last chip descriptor enumerated.
///
/// Enumeration runs in reverse name order, so with several controllers this
/// is the base of the descriptor whose name sorts first (`gpiochip100`
/// before `gpiochip512`), whether or not that is the chip the pin lives on.
/// Use [`resolve_chip`] with [`ChipSelector::Named`] on such systems.
pub fn get_gpio_base(config: &SysfsConfig) -> Result<u32> {
    let descriptors = list_chip_descriptors(config)?;
    let last = last_descriptor(config, &descriptors)?;
    resolve_base(config, last)
}

/// Reads `base`, `ngpio` and `label` of one descriptor.
///
/// Only `base` is required; an `ngpio` or `label` that is missing or cannot
/// be read comes back as `None`.
pub fn chip_info(config: &SysfsConfig, descriptor: &str) -> Result<ChipInfo> {
    let dir = config.gpio_root.join(descriptor);

    let base = resolve_base(config, descriptor)?;
    let ngpio = optional(&dir.join("ngpio"), read_number);
    let label = optional(&dir.join("label"), |path| sysfs::read_control(path));

    Ok(ChipInfo {
        name: descriptor.to_string(),
        base,
        ngpio,
        label,
    })
}

/// Picks a chip descriptor according to `selector` and reads its info.
pub fn resolve_chip(config: &SysfsConfig, selector: &ChipSelector) -> Result<ChipInfo> {
    let descriptors = list_chip_descriptors(config)?;

    let name = match selector {
        ChipSelector::Last => last_descriptor(config, &descriptors)?,
        ChipSelector::Named(name) => descriptors
            .iter()
            .find(|d| *d == name)
            .ok_or_else(|| Error::NoChipFound {
                root: config.gpio_root.clone(),
            })?,
    };

    let info = chip_info(config, name)?;
    debug!("resolved {:?} to {} (base {})", selector, info.name, info.base);
    Ok(info)
}

fn last_descriptor<'a>(config: &SysfsConfig, descriptors: &'a [String]) -> Result<&'a String> {
    let Some(last) = descriptors.last() else {
        return Err(Error::NoChipFound {
            root: config.gpio_root.clone(),
        });
    };

    if descriptors.len() > 1 {
        warn!(
            "Found {} GPIO chips under {}, using {}",
            descriptors.len(),
            config.gpio_root.display(),
            last
        );
    }
    Ok(last)
}

fn optional<T>(path: &Path, read: impl FnOnce(&Path) -> Result<T>) -> Option<T> {
    if !sysfs::exists(path) {
        return None;
    }
    match read(path) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

fn read_number(path: &Path) -> Result<u32> {
    let content = sysfs::read_control(path)?;
    content
        .trim()
        .parse::<u32>()
        .map_err(|_| Error::parse(path, content))
}
