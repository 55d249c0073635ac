use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::{
    config::SysfsConfig,
    error::{Error, Result},
    sysfs,
};

/// Output polarity of a PWM channel.
///
/// * `Normal` - high for the duty cycle, low for the rest of the period
/// * `Inversed` - low for the duty cycle, high for the rest
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Polarity {
    #[default]
    Normal,
    Inversed,
}

impl Polarity {
    /// The string the kernel expects in the `polarity` file.
    pub fn to_str(self) -> &'static str {
        match self {
            Polarity::Normal => "normal",
            Polarity::Inversed => "inversed",
        }
    }
}

// "pwm12" -> 12
fn channel_number(channel: &str) -> Result<u32> {
    let prefix_len = channel
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .len();

    channel[prefix_len..]
        .parse::<u32>()
        .map_err(|_| Error::InvalidChannel {
            channel: channel.to_string(),
        })
}

/// One exported PWM channel, e.g. `pwm1` of controller `pwmchip0`.
///
/// The period is fixed at creation. Duty cycle, polarity and the enable
/// state can be changed as often as needed; the last value written is kept
/// so it can be queried without a read. Like [`crate::GpioPin`], the channel
/// stays exported until [`PwmChannel::unexport`] is called.
///
/// # Example
///
/// ```no_run
/// use linux_gpio::{Polarity, PwmChannel, SysfsConfig};
///
/// let config = SysfsConfig::default();
/// let mut servo = PwmChannel::create(&config, "pwmchip0", "pwm1", 20_000_000, Polarity::Normal)?;
/// servo.set_polarity()?;
/// servo.set_duty_cycle(1_500_000)?;
/// servo.enable(true)?;
/// # Ok::<(), linux_gpio::Error>(())
/// ```
#[derive(Debug)]
pub struct PwmChannel {
    controller: String,
    channel: String,
    number: u32,
    period: u64,
    duty_cycle: u64,
    polarity: Polarity,
    enabled: bool,
    controller_dir: PathBuf,
    channel_dir: PathBuf,
}

impl PwmChannel {
    /// Exports `channel` on `controller` (unless it already is), waits for
    /// its node and writes the period in nanoseconds.
    ///
    /// The polarity is only stored; call [`PwmChannel::set_polarity`] to
    /// write it.
    ///
    /// If this fails after the export write (a [`Error::Timeout`] or a failed
    /// period write), the channel is left exported with no `PwmChannel` to
    /// unexport it. Calling `create` again picks the existing node up
    /// without exporting twice.
    pub fn create(
        config: &SysfsConfig,
        controller: &str,
        channel: &str,
        period: u64,
        polarity: Polarity,
    ) -> Result<PwmChannel> {
        let number = channel_number(channel)?;
        let controller_dir = config.pwm_root.join(controller);

        let pwm = PwmChannel {
            controller: controller.to_string(),
            channel: channel.to_string(),
            number,
            period,
            duty_cycle: 0,
            polarity,
            enabled: false,
            channel_dir: controller_dir.join(channel),
            controller_dir,
        };

        pwm.export(config)?;
        sysfs::write_control(pwm.channel_dir.join("period"), &period.to_string())?;

        Ok(pwm)
    }

    fn export(&self, config: &SysfsConfig) -> Result<()> {
        if sysfs::exists(&self.channel_dir) {
            warn!(
                "{}/{} is already exported, continuing anyway",
                self.controller, self.channel
            );
        } else {
            let export = self.controller_dir.join("export");
            sysfs::check_write_access(&[&export, &self.controller_dir.join("unexport")])?;

            debug!("exporting {}/{}", self.controller, self.channel);
            sysfs::write_control(export, &self.number.to_string())?;
        }

        sysfs::wait_for(
            self.channel_dir.join("period"),
            config.settle_timeout,
            config.poll_interval,
        )
    }

    /// Writes the stored polarity.
    ///
    /// Most drivers refuse a polarity change while the channel is enabled;
    /// that refusal comes back as [`Error::Io`].
    pub fn set_polarity(&self) -> Result<()> {
        sysfs::write_control(self.channel_dir.join("polarity"), self.polarity.to_str())
    }

    /// Writes `polarity` and keeps it as the stored polarity.
    pub fn change_polarity(&mut self, polarity: Polarity) -> Result<()> {
        sysfs::write_control(self.channel_dir.join("polarity"), polarity.to_str())?;
        self.polarity = polarity;
        Ok(())
    }

    /// Sets the active time per period in nanoseconds.
    ///
    /// Values above the period fail with [`Error::Range`] and are not
    /// forwarded to the kernel.
    pub fn set_duty_cycle(&mut self, duty_cycle: u64) -> Result<()> {
        if duty_cycle > self.period {
            return Err(Error::Range {
                duty_cycle,
                period: self.period,
            });
        }

        sysfs::write_control(
            self.channel_dir.join("duty_cycle"),
            &duty_cycle.to_string(),
        )?;
        self.duty_cycle = duty_cycle;
        Ok(())
    }

    pub fn enable(&mut self, on: bool) -> Result<()> {
        sysfs::write_control(self.channel_dir.join("enable"), if on { "1" } else { "0" })?;
        self.enabled = on;
        Ok(())
    }

    /// Releases the channel back to the kernel.
    pub fn unexport(self) -> Result<()> {
        debug!("unexporting {}/{}", self.controller, self.channel);
        sysfs::write_control(
            self.controller_dir.join("unexport"),
            &self.number.to_string(),
        )
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Numeric suffix of the channel name, as written to `export`.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    /// Last duty cycle written through this instance, 0 before the first.
    pub fn duty_cycle(&self) -> u64 {
        self.duty_cycle
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Last enable state written through this instance.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The channel's directory under the controller.
    pub fn path(&self) -> &Path {
        &self.channel_dir
    }
}
