use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::{
    chip::{self, ChipSelector},
    config::SysfsConfig,
    error::{Error, Result},
    sysfs,
};

/// Specifies the GPIO pin direction.
///
/// * `In` - Input, value writes are rejected
/// * `Out` - Output
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// The string the kernel expects in the `direction` file.
    pub fn to_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }

    fn from_sysfs(s: &str) -> Option<Direction> {
        match s {
            "in" => Some(Direction::In),
            "out" => Some(Direction::Out),
            _ => None,
        }
    }
}

fn bool_to_sysfs(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn sysfs_to_bool(s: &str) -> Option<bool> {
    match s {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// One exported GPIO line.
///
/// Creating a pin exports it (unless it already is), waits for the kernel to
/// create the `gpio<N>` node, then writes the active-low setting and the
/// direction. On a node that was already exported, a setting is only written
/// when it differs from what the kernel reports.
///
/// The pin stays exported until [`GpioPin::unexport`] is called; dropping the
/// value leaves it exported.
///
/// # Example
///
/// ```no_run
/// use linux_gpio::{Direction, GpioPin, SysfsConfig};
///
/// let config = SysfsConfig::default();
/// let led = GpioPin::create(&config, 17, Direction::Out, false)?;
/// led.set_value(true)?;
/// led.unexport()?;
/// # Ok::<(), linux_gpio::Error>(())
/// ```
#[derive(Debug)]
pub struct GpioPin {
    logical_number: u32,
    sysfs_number: u32,
    direction: Direction,
    active_low: bool,
    gpio_root: PathBuf,
    gpio_dir: PathBuf,
}

impl GpioPin {
    /// Exports and configures `logical_number` on the last enumerated chip.
    ///
    /// See [`GpioPin::create_on_chip`] for what is left behind on failure.
    pub fn create(
        config: &SysfsConfig,
        logical_number: u32,
        direction: Direction,
        active_low: bool,
    ) -> Result<GpioPin> {
        Self::create_on_chip(
            config,
            &ChipSelector::Last,
            logical_number,
            direction,
            active_low,
        )
    }

    /// Exports and configures `logical_number` on the chip picked by
    /// `selector`.
    ///
    /// When the chip reports `ngpio`, a logical number past its last line is
    /// rejected before anything is written.
    ///
    /// If this fails after the export write (a [`Error::Timeout`], or a
    /// failed active_low or direction write), the line is left exported and
    /// no `GpioPin` is returned to unexport it. Calling `create` again picks
    /// the existing node up without exporting twice.
    pub fn create_on_chip(
        config: &SysfsConfig,
        selector: &ChipSelector,
        logical_number: u32,
        direction: Direction,
        active_low: bool,
    ) -> Result<GpioPin> {
        let chip = chip::resolve_chip(config, selector)?;

        let out_of_range = || Error::PinOutOfRange {
            logical: logical_number,
            chip: chip.name.clone(),
        };
        if matches!(chip.ngpio, Some(ngpio) if logical_number >= ngpio) {
            return Err(out_of_range());
        }
        let sysfs_number = chip
            .base
            .checked_add(logical_number)
            .ok_or_else(out_of_range)?;

        let pin = GpioPin {
            logical_number,
            sysfs_number,
            direction,
            active_low,
            gpio_root: config.gpio_root.clone(),
            gpio_dir: config.gpio_root.join(format!("gpio{}", sysfs_number)),
        };

        // a node exported earlier keeps its settings unless they differ
        let fresh = pin.export(config)?;
        if fresh || pin.read_active_low()? != active_low {
            pin.write_active_low()?;
        }
        if fresh || pin.read_direction()? != direction {
            pin.write_direction()?;
        }

        Ok(pin)
    }

    // true if this call wrote the export file
    fn export(&self, config: &SysfsConfig) -> Result<bool> {
        let fresh = !sysfs::exists(&self.gpio_dir);
        if fresh {
            let export = self.gpio_root.join("export");
            sysfs::check_write_access(&[&export, &self.gpio_root.join("unexport")])?;

            debug!(
                "exporting gpio{} (logical pin {})",
                self.sysfs_number, self.logical_number
            );
            sysfs::write_control(export, &self.sysfs_number.to_string())?;
        } else {
            warn!(
                "gpio{} is already exported, continuing anyway",
                self.sysfs_number
            );
        }

        sysfs::wait_for(
            self.gpio_dir.join("value"),
            config.settle_timeout,
            config.poll_interval,
        )?;
        Ok(fresh)
    }

    fn read_active_low(&self) -> Result<bool> {
        let path = self.gpio_dir.join("active_low");
        let active_low = sysfs::read_control(&path)?;
        sysfs_to_bool(&active_low).ok_or_else(|| Error::parse(path, active_low))
    }

    fn write_active_low(&self) -> Result<()> {
        sysfs::write_control(
            self.gpio_dir.join("active_low"),
            bool_to_sysfs(self.active_low),
        )
    }

    fn write_direction(&self) -> Result<()> {
        sysfs::write_control(self.gpio_dir.join("direction"), self.direction.to_str())
    }

    /// Drives the pin high (`true`) or low (`false`).
    ///
    /// Fails with [`Error::Direction`] without touching the value file if the
    /// pin was created as an input.
    pub fn set_value(&self, value: bool) -> Result<()> {
        if self.direction == Direction::In {
            return Err(Error::Direction {
                pin: self.sysfs_number,
            });
        }

        sysfs::write_control(self.gpio_dir.join("value"), bool_to_sysfs(value))
    }

    /// Reads the current level. Anything but `0` or `1` is a parse error.
    pub fn read_value(&self) -> Result<bool> {
        let path = self.gpio_dir.join("value");
        let value = sysfs::read_control(&path)?;
        sysfs_to_bool(&value).ok_or_else(|| Error::parse(path, value))
    }

    /// Reads back the direction the kernel currently reports.
    pub fn read_direction(&self) -> Result<Direction> {
        let path = self.gpio_dir.join("direction");
        let direction = sysfs::read_control(&path)?;
        Direction::from_sysfs(&direction).ok_or_else(|| Error::parse(path, direction))
    }

    /// Releases the pin back to the kernel.
    pub fn unexport(self) -> Result<()> {
        debug!("unexporting gpio{}", self.sysfs_number);
        sysfs::write_control(
            self.gpio_root.join("unexport"),
            &self.sysfs_number.to_string(),
        )
    }

    pub fn logical_number(&self) -> u32 {
        self.logical_number
    }

    /// `chip base + logical number`, the number the kernel knows the pin by.
    pub fn sysfs_number(&self) -> u32 {
        self.sysfs_number
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn active_low(&self) -> bool {
        self.active_low
    }

    /// The `gpio<N>` directory of this pin.
    pub fn path(&self) -> &Path {
        &self.gpio_dir
    }
}
