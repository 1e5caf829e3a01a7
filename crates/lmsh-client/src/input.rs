//! Raw terminal input handling.
//!
//! Provides:
//! - Raw mode setup/restore
//! - A blocking stdin reader bridged to the event loop
//! - Control-key dispatch for the session-level actions

use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};

use tracing::{debug, error};

use lmsh_core::error::{Error, Result};

use crate::manager::{ManagerHandle, UserAction};

/// Ends the session.
const CTRL_C: u8 = 0x03;
/// Clears the display.
const CTRL_L: u8 = 0x0c;
/// Restarts the session program.
const CTRL_R: u8 = 0x12;

/// Guard that restores terminal settings on drop.
pub struct RawModeGuard {
    fd: RawFd,
    original: libc::termios,
}

impl RawModeGuard {
    /// Enter raw terminal mode on stdin.
    pub fn enter() -> Result<Self> {
        let fd = io::stdin().as_raw_fd();

        let mut termios = std::mem::MaybeUninit::<libc::termios>::uninit();
        if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
            return Err(Error::Io(io::Error::last_os_error()));
        }
        let original = unsafe { termios.assume_init() };

        let mut raw = original;
        // Input: no break signal, CR->NL mapping, parity checks, bit
        // stripping, or flow control.
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        // Output: no post-processing.
        raw.c_oflag &= !libc::OPOST;
        // 8-bit characters.
        raw.c_cflag |= libc::CS8;
        // Local: no echo, canonical mode, signals, or extended input.
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        // Reads return after one byte, no timeout.
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw) } != 0 {
            return Err(Error::Io(io::Error::last_os_error()));
        }

        debug!("entered raw terminal mode");
        Ok(Self { fd, original })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSAFLUSH, &self.original);
        }
        debug!("restored terminal settings");
    }
}

/// What one chunk of raw bytes turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyDispatch {
    Input(Vec<u8>),
    Action(UserAction),
    Shutdown,
}

/// Split a raw byte chunk into line input and session-level actions.
fn classify(bytes: &[u8]) -> Vec<KeyDispatch> {
    let mut out = Vec::new();
    let mut pending: Vec<u8> = Vec::new();

    let flush = |pending: &mut Vec<u8>, out: &mut Vec<KeyDispatch>| {
        if !pending.is_empty() {
            out.push(KeyDispatch::Input(std::mem::take(pending)));
        }
    };

    for &b in bytes {
        match b {
            CTRL_C => {
                flush(&mut pending, &mut out);
                out.push(KeyDispatch::Shutdown);
                return out;
            }
            CTRL_L => {
                flush(&mut pending, &mut out);
                out.push(KeyDispatch::Action(UserAction::ClearDisplay));
            }
            CTRL_R => {
                flush(&mut pending, &mut out);
                out.push(KeyDispatch::Action(UserAction::RestartSession));
            }
            _ => pending.push(b),
        }
    }

    flush(&mut pending, &mut out);
    out
}

/// Spawn the blocking stdin reader thread.
///
/// Bytes are dispatched into the manager loop; the thread exits on EOF,
/// read error, or Ctrl-C.
pub fn spawn_stdin_reader(handle: ManagerHandle) {
    std::thread::spawn(move || {
        let mut stdin = io::stdin().lock();
        let mut buf = [0u8; 1024];

        loop {
            match stdin.read(&mut buf) {
                Ok(0) => {
                    debug!("stdin EOF");
                    handle.shutdown();
                    break;
                }
                Ok(n) => {
                    for dispatch in classify(&buf[..n]) {
                        match dispatch {
                            KeyDispatch::Input(bytes) => handle.input(&bytes),
                            KeyDispatch::Action(action) => handle.action(action),
                            KeyDispatch::Shutdown => {
                                handle.shutdown();
                                return;
                            }
                        }
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!(error = %e, "stdin read error");
                    handle.shutdown();
                    break;
                }
            }
        }
    });
}

// =============================================================================
// Tests
// =============================================================================
