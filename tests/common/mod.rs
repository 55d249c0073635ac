#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use linux_gpio::SysfsConfig;
use tempfile::TempDir;

/// Export/unexport writes the simulated kernel has consumed, in order.
#[derive(Debug, Default, Clone)]
pub struct Writes {
    pub gpio_exports: Vec<String>,
    pub gpio_unexports: Vec<String>,
    /// (controller, channel number)
    pub pwm_exports: Vec<(String, String)>,
    pub pwm_unexports: Vec<(String, String)>,
}

/// A temporary directory laid out like `/sys/class/{gpio,pwm}`.
///
/// With a kernel thread running, writes to `export` make the matching
/// `gpio<N>` or `pwm<N>` node appear after `node_delay`, and writes to
/// `unexport` remove it again.
pub struct SimulatedSysfs {
    pub config: SysfsConfig,
    writes: Arc<Mutex<Writes>>,
    stop: Arc<AtomicBool>,
    kernel: Option<JoinHandle<()>>,
    dir: TempDir,
}

impl SimulatedSysfs {
    pub fn new(chip_base: u32) -> Self {
        Self::build(chip_base, Some(Duration::from_millis(30)))
    }

    /// Nothing reacts to export writes; nodes never appear on their own.
    pub fn without_kernel(chip_base: u32) -> Self {
        Self::build(chip_base, None)
    }

    fn build(chip_base: u32, node_delay: Option<Duration>) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let gpio_root = dir.path().join("gpio");
        let pwm_root = dir.path().join("pwm");

        let chip = gpio_root.join(format!("gpiochip{}", chip_base));
        fs::create_dir_all(&chip).unwrap();
        fs::write(chip.join("base"), format!("{}\n", chip_base)).unwrap();
        fs::write(chip.join("ngpio"), "32\n").unwrap();
        fs::write(chip.join("label"), "simulated\n").unwrap();
        fs::write(gpio_root.join("export"), "").unwrap();
        fs::write(gpio_root.join("unexport"), "").unwrap();

        let controller = pwm_root.join("pwmchip0");
        fs::create_dir_all(&controller).unwrap();
        fs::write(controller.join("export"), "").unwrap();
        fs::write(controller.join("unexport"), "").unwrap();
        fs::write(controller.join("npwm"), "4\n").unwrap();

        let config = SysfsConfig::default()
            .with_gpio_root(&gpio_root)
            .with_pwm_root(&pwm_root)
            .with_settle_timeout(Duration::from_secs(2))
            .with_poll_interval(Duration::from_millis(5));

        let writes = Arc::new(Mutex::new(Writes::default()));
        let stop = Arc::new(AtomicBool::new(false));
        let kernel = node_delay.map(|delay| {
            let root = dir.path().to_path_buf();
            let writes = writes.clone();
            let stop = stop.clone();
            thread::spawn(move || run_kernel(root, delay, writes, stop))
        });

        SimulatedSysfs {
            config,
            writes,
            stop,
            kernel,
            dir,
        }
    }

    pub fn gpio_root(&self) -> &Path {
        &self.config.gpio_root
    }

    pub fn pwm_root(&self) -> &Path {
        &self.config.pwm_root
    }

    pub fn read(&self, path: impl AsRef<Path>) -> String {
        fs::read_to_string(self.dir.path().join(path)).unwrap()
    }

    pub fn write(&self, path: impl AsRef<Path>, content: &str) {
        fs::write(self.dir.path().join(path), content).unwrap()
    }

    pub fn writes(&self) -> Writes {
        self.writes.lock().unwrap().clone()
    }

    /// Creates a node as if someone else had exported it earlier.
    pub fn pre_export_gpio(&self, sysfs_number: u32) {
        make_gpio_node(&self.gpio_root().join(format!("gpio{}", sysfs_number)));
    }

    pub fn pre_export_pwm(&self, controller: &str, channel: &str) {
        make_pwm_node(&self.pwm_root().join(controller).join(channel));
    }

    /// Blocks until `path` (relative to the simulated root) is gone.
    pub fn wait_removed(&self, path: impl AsRef<Path>) -> bool {
        let path = self.dir.path().join(path);
        let deadline = Instant::now() + Duration::from_secs(2);
        while path.exists() {
            if Instant::now() > deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }
}

impl Drop for SimulatedSysfs {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(kernel) = self.kernel.take() {
            let _ = kernel.join();
        }
    }
}

fn run_kernel(root: PathBuf, delay: Duration, writes: Arc<Mutex<Writes>>, stop: Arc<AtomicBool>) {
    let gpio_root = root.join("gpio");
    let pwm_root = root.join("pwm");

    while !stop.load(Ordering::Relaxed) {
        if let Some(n) = take(&gpio_root.join("export")) {
            writes.lock().unwrap().gpio_exports.push(n.clone());
            thread::sleep(delay);
            make_gpio_node(&gpio_root.join(format!("gpio{}", n)));
        }
        if let Some(n) = take(&gpio_root.join("unexport")) {
            writes.lock().unwrap().gpio_unexports.push(n.clone());
            let _ = fs::remove_dir_all(gpio_root.join(format!("gpio{}", n)));
        }

        if let Ok(entries) = fs::read_dir(&pwm_root) {
            for entry in entries.flatten() {
                let controller = entry.file_name().to_string_lossy().into_owned();
                let dir = entry.path();
                if let Some(n) = take(&dir.join("export")) {
                    writes
                        .lock()
                        .unwrap()
                        .pwm_exports
                        .push((controller.clone(), n.clone()));
                    thread::sleep(delay);
                    make_pwm_node(&dir.join(format!("pwm{}", n)));
                }
                if let Some(n) = take(&dir.join("unexport")) {
                    writes
                        .lock()
                        .unwrap()
                        .pwm_unexports
                        .push((controller, n.clone()));
                    let _ = fs::remove_dir_all(dir.join(format!("pwm{}", n)));
                }
            }
        }

        thread::sleep(Duration::from_millis(2));
    }
}

// Reads and clears a control file; None while it is empty.
fn take(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    fs::write(path, "").ok()?;
    Some(content.to_string())
}

// `value` last, that is what the library waits for
fn make_gpio_node(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("direction"), "in\n").unwrap();
    fs::write(dir.join("active_low"), "0\n").unwrap();
    fs::write(dir.join("value"), "0\n").unwrap();
}

// `period` last, same reason
fn make_pwm_node(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("duty_cycle"), "0\n").unwrap();
    fs::write(dir.join("polarity"), "normal\n").unwrap();
    fs::write(dir.join("enable"), "0\n").unwrap();
    fs::write(dir.join("period"), "0\n").unwrap();
}
