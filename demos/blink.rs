//! Blinks an LED on a device-relative pin: `cargo run --example blink -- 17`
use std::{env, thread, time::Duration};

use anyhow::Context;
use linux_gpio::{Direction, GpioPin, SysfsConfig};

fn main() -> anyhow::Result<()> {
    let pin: u32 = env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("17"))
        .parse()
        .context("pin must be a number")?;

    let config = SysfsConfig::from_env();
    let led = GpioPin::create(&config, pin, Direction::Out, false)
        .with_context(|| format!("could not set up pin {}", pin))?;
    println!("blinking gpio{} (pin {})", led.sysfs_number(), pin);

    for _ in 0..5 {
        led.set_value(true)?;
        thread::sleep(Duration::from_millis(500));
        led.set_value(false)?;
        thread::sleep(Duration::from_millis(500));
    }

    led.unexport()?;
    Ok(())
}
