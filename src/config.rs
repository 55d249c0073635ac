use std::{env, path::PathBuf, time::Duration};

use log::warn;

static GPIO_ROOT: &str = "/sys/class/gpio";
static PWM_ROOT: &str = "/sys/class/pwm";
static CHIP_PREFIX: &str = "gpiochip";

static GPIO_ROOT_VAR: &str = "LINUX_GPIO_SYSFS_ROOT";
static PWM_ROOT_VAR: &str = "LINUX_GPIO_PWM_ROOT";

/// Where the sysfs control files live and how long to wait for the kernel.
///
/// The defaults point at the real sysfs tree. Tests build one pointing at a
/// temporary directory instead:
///
/// ```rust
/// use linux_gpio::SysfsConfig;
///
/// let config = SysfsConfig::default()
///     .with_gpio_root("/tmp/fake/gpio")
///     .with_pwm_root("/tmp/fake/pwm");
/// assert_eq!(config.chip_prefix, "gpiochip");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SysfsConfig {
    /// Directory holding `export`, `unexport`, `gpiochip*` and `gpio<N>`.
    pub gpio_root: PathBuf,
    /// Directory holding one `pwmchip*` directory per controller.
    pub pwm_root: PathBuf,
    /// Substring that marks an entry of `gpio_root` as a chip descriptor.
    pub chip_prefix: String,
    /// Upper bound on the wait for a node to appear after an export write.
    pub settle_timeout: Duration,
    /// Sleep between two checks while waiting.
    pub poll_interval: Duration,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        SysfsConfig {
            gpio_root: PathBuf::from(GPIO_ROOT),
            pwm_root: PathBuf::from(PWM_ROOT),
            chip_prefix: String::from(CHIP_PREFIX),
            settle_timeout: Duration::from_millis(190),
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl SysfsConfig {
    /// Defaults, with the roots overridden by `LINUX_GPIO_SYSFS_ROOT` and
    /// `LINUX_GPIO_PWM_ROOT` when set (useful inside containers that mount
    /// sysfs elsewhere).
    pub fn from_env() -> Self {
        let mut config = SysfsConfig::default();
        if let Some(root) = root_from_env(GPIO_ROOT_VAR) {
            config.gpio_root = root;
        }
        if let Some(root) = root_from_env(PWM_ROOT_VAR) {
            config.pwm_root = root;
        }
        config
    }

    pub fn with_gpio_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.gpio_root = root.into();
        self
    }

    pub fn with_pwm_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.pwm_root = root.into();
        self
    }

    pub fn with_chip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.chip_prefix = prefix.into();
        self
    }

    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

fn root_from_env(var: &str) -> Option<PathBuf> {
    let value = env::var(var).ok()?;
    let value = value.trim();
    if value.is_empty() {
        warn!("Environment variable '{}' is empty, using the default.", var);
        return None;
    }
    Some(PathBuf::from(value))
}
