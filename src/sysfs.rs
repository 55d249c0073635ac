//! Single reads and writes of sysfs control files.
//!
//! This is the only module that touches the filesystem. Each call opens the
//! file, performs exactly one read or write and closes it again; nothing is
//! cached and nothing is retried, except [`wait_for`] which exists to bridge
//! the delay between an export write and the kernel (or udev) creating the
//! new device node.

use std::{
    fs,
    io::{Read, Write},
    path::Path,
    thread,
    time::{Duration, Instant},
};

use log::trace;

use crate::error::{Error, Result};

/// Writes `content` to the control file at `path`.
///
/// The file must already exist: sysfs attributes are created by the kernel,
/// never by user space.
pub fn write_control(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    trace!("write {:?} -> {}", content, path.display());

    let mut file = fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::io(path, e))
}

/// Reads the control file at `path`, dropping one trailing newline.
pub fn read_control(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    let mut file = fs::File::open(path).map_err(|e| Error::io(path, e))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::io(path, e))?;

    if content.ends_with('\n') {
        content.pop();
    }
    trace!("read {:?} <- {}", content, path.display());
    Ok(content)
}

pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Polls until `path` exists, sleeping `interval` between checks.
///
/// Gives up with [`Error::Timeout`] once `timeout` has elapsed.
pub fn wait_for(path: impl AsRef<Path>, timeout: Duration, interval: Duration) -> Result<()> {
    let path = path.as_ref();
    let start = Instant::now();

    loop {
        if path.exists() {
            return Ok(());
        }

        let waited = start.elapsed();
        if waited >= timeout {
            return Err(Error::Timeout {
                path: path.to_path_buf(),
                waited,
            });
        }
        thread::sleep(interval.min(timeout - waited));
    }
}

/// Fails with [`Error::NotWritable`] if any of `paths` is read-only.
pub fn check_write_access<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        if metadata.permissions().readonly() {
            return Err(Error::NotWritable {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}
