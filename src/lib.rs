//! GPIO lines and PWM outputs on embedded Linux, through sysfs.
//!
//! A [`GpioPin`] is addressed by its device-relative number; the chip base
//! read from `gpiochip*/base` turns it into the kernel's global number. A
//! [`PwmChannel`] is addressed by controller and channel name. Both are
//! exported on creation and released with an explicit `unexport`.
//!
//! All paths come from a [`SysfsConfig`], so the whole crate can run
//! against a directory tree that only imitates sysfs.

pub mod chip;
pub mod config;
pub mod error;
pub mod gpio;
pub mod pwm;
pub mod sysfs;

pub use chip::{ChipInfo, ChipSelector};
pub use config::SysfsConfig;
pub use error::{Error, Result};
pub use gpio::{Direction, GpioPin};
pub use pwm::{Polarity, PwmChannel};
