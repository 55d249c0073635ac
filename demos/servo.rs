//! Sweeps a hobby servo on pwmchip0/pwm0 between its end stops.
use std::{thread, time::Duration};

use linux_gpio::{Polarity, PwmChannel, SysfsConfig};

// 50 Hz, 1 ms to 2 ms pulses
const PERIOD_NS: u64 = 20_000_000;
const MIN_PULSE_NS: u64 = 1_000_000;
const MAX_PULSE_NS: u64 = 2_000_000;

fn main() -> anyhow::Result<()> {
    let config = SysfsConfig::from_env();
    let mut servo = PwmChannel::create(&config, "pwmchip0", "pwm0", PERIOD_NS, Polarity::Normal)?;

    servo.set_polarity()?;
    servo.set_duty_cycle(MIN_PULSE_NS)?;
    servo.enable(true)?;

    for step in 0..=10 {
        let pulse = MIN_PULSE_NS + (MAX_PULSE_NS - MIN_PULSE_NS) * step / 10;
        servo.set_duty_cycle(pulse)?;
        thread::sleep(Duration::from_millis(200));
    }

    servo.enable(false)?;
    servo.unexport()?;
    Ok(())
}
