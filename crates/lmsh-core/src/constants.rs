//! Protocol and timing constants for lmsh.

use std::time::Duration;

// =============================================================================
// Protocol Constants
// =============================================================================

/// Command sent to the host to launch the library session program.
pub const START_COMMAND: &str = "./library_system";

/// Maximum accepted wire frame size in bytes.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

// =============================================================================
// Timing Constants
// =============================================================================

/// Delay before the reconnection attempt after the channel closes.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// How long a connect attempt may remain unanswered before the local
/// simulated session takes over.
pub const FALLBACK_GRACE: Duration = Duration::from_secs(3);

/// Settle time between interrupting the remote program and restarting it.
pub const RESTART_SETTLE: Duration = Duration::from_millis(500);

/// Display delay before a screen redraw (after login, logout, and rejected
/// credentials).
pub const REDRAW_DELAY: Duration = Duration::from_secs(1);

// =============================================================================
// Line Editing
// =============================================================================

/// Record terminator: completes the in-progress line.
pub const KEY_ENTER: char = '\r';

/// Erase control character (DEL, what terminals send for backspace).
pub const KEY_ERASE: char = '\u{7f}';
