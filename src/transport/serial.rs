//! # Serial Transport
//!
//! This module provides communication with the Erika interface board over a
//! serial tty (typically a USB serial adapter such as `/dev/ttyUSB0`).
//!
//! ## Line Settings
//!
//! The interface runs at a fixed **1200 baud**, 8 data bits, no parity,
//! one stop bit. The device is opened in raw mode so binary command bytes
//! pass through unmodified:
//!
//! - **No input processing**: Disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No output processing**: Disable OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8 (8 data bits, no parity)
//! - **No echo**: Disable ECHO, ECHONL
//! - **Non-canonical mode**: Disable ICANON, reads return after one byte
//!
//! ## Timing
//!
//! The typewriter is electromechanical and has no input buffer worth the
//! name. Without flow control every write is followed by a settle delay
//! (0.5s by default). With RTS/CTS flow control the kernel holds output
//! until the device is ready, so the delay is replaced by draining the
//! output queue.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;

use super::Transport;
use crate::error::{ErikaError, Result};
use crate::printer::ErikaConfig;

/// Default serial device path
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// # Serial Typewriter Transport
///
/// Owns the open tty. The file descriptor is closed when the transport is
/// dropped, on every exit path.
///
/// ## Example
///
/// ```no_run
/// use erika::printer::ErikaConfig;
/// use erika::transport::{SerialTransport, Transport};
///
/// let mut transport = SerialTransport::open("/dev/ttyUSB0", &ErikaConfig::ERIKA_3004)?;
/// transport.write_all(&[0x75, 0x75])?;
///
/// # Ok::<(), erika::error::ErikaError>(())
/// ```
#[derive(Debug)]
pub struct SerialTransport {
    file: File,
    flow_control: bool,
    settle_delay: Duration,
}

impl SerialTransport {
    /// Open the serial device and configure the line.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout group)
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P, config: &ErikaConfig) -> Result<Self> {
        let path = device.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                ErikaError::Transport(format!("Failed to open {}: {}", path.display(), e))
            })?;

        configure_tty_raw(file.as_raw_fd(), config.baud_rate, config.flow_control)?;

        tracing::info!(
            "opened {} at {} baud (flow control {})",
            path.display(),
            config.baud_rate,
            if config.flow_control { "on" } else { "off" }
        );

        Ok(Self {
            file,
            flow_control: config.flow_control,
            settle_delay: config.settle_delay(),
        })
    }

    /// Open the default device path (/dev/ttyUSB0).
    pub fn open_default(config: &ErikaConfig) -> Result<Self> {
        Self::open(DEFAULT_DEVICE, config)
    }

    /// Set the delay after each write when running without flow control.
    pub fn set_settle_delay(&mut self, delay: Duration) {
        self.settle_delay = delay;
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        self.file
            .write_all(data)
            .map_err(|e| ErikaError::Transport(format!("Write failed: {}", e)))?;
        self.file
            .flush()
            .map_err(|e| ErikaError::Transport(format!("Flush failed: {}", e)))?;

        if self.flow_control {
            drain(self.file.as_raw_fd())?;
        } else if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }

        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buffer = [0u8; 1];
        self.file
            .read_exact(&mut buffer)
            .map_err(|e| ErikaError::Transport(format!("Read failed: {}", e)))?;
        Ok(buffer[0])
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        tracing::info!("closing serial connection");
    }
}

/// Block until all queued output has been transmitted.
#[cfg(unix)]
fn drain(fd: i32) -> Result<()> {
    let result = unsafe { libc::tcdrain(fd) };
    if result != 0 {
        return Err(ErikaError::Transport(format!(
            "tcdrain failed: {}",
            io::Error::last_os_error()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn drain(_fd: i32) -> Result<()> {
    Ok(())
}

/// Map a numeric baud rate to its termios speed constant.
#[cfg(unix)]
fn speed_for(baud_rate: u32) -> Result<libc::speed_t> {
    let speed = match baud_rate {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        _ => {
            return Err(ErikaError::Config(format!(
                "Unsupported baud rate {}",
                baud_rate
            )));
        }
    };
    Ok(speed)
}

/// Configure a file descriptor for raw 8N1 serial communication.
///
/// ## What Gets Disabled
///
/// - **Input flags**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR, ICRNL, IXON, IXOFF, IXANY
/// - **Output flags**: OPOST
/// - **Local flags**: ECHO, ECHONL, ICANON, ISIG, IEXTEN
/// - **Control flags**: CSIZE, PARENB, CSTOPB (then CS8 | CREAD | CLOCAL is set)
///
/// XON/XOFF must stay off: 0x11 and 0x13 are ordinary key codes.
#[cfg(unix)]
fn configure_tty_raw(fd: i32, baud_rate: u32, flow_control: bool) -> Result<()> {
    use std::mem::MaybeUninit;

    let speed = speed_for(baud_rate)?;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(ErikaError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB);
    termios.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;
    if flow_control {
        termios.c_cflag |= libc::CRTSCTS;
    } else {
        termios.c_cflag &= !libc::CRTSCTS;
    }

    // Reads block until at least one byte is available
    termios.c_cc[libc::VMIN] = 1;
    termios.c_cc[libc::VTIME] = 0;

    let result = unsafe {
        libc::cfsetispeed(&mut termios, speed) | libc::cfsetospeed(&mut termios, speed)
    };
    if result != 0 {
        return Err(ErikaError::Transport(format!(
            "cfsetspeed failed: {}",
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(ErikaError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_fd: i32, _baud_rate: u32, _flow_control: bool) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device_path() {
        assert_eq!(DEFAULT_DEVICE, "/dev/ttyUSB0");
    }

    #[test]
    fn test_supported_baud_rates() {
        assert_eq!(speed_for(1200).unwrap(), libc::B1200);
        assert_eq!(speed_for(9600).unwrap(), libc::B9600);
        assert!(matches!(speed_for(1234), Err(ErikaError::Config(_))));
    }

    #[test]
    fn test_open_missing_device_fails() {
        let err = SerialTransport::open("/dev/does-not-exist-erika", &ErikaConfig::ERIKA_3004)
            .unwrap_err();
        assert!(matches!(err, ErikaError::Transport(_)));
    }

    // Note: Writing and reading require actual hardware.
}
