//! Display-surface and status-indicator collaborator traits.
//!
//! Rendering lives outside the session core; these are the narrow seams the
//! core writes through. Implementations must tolerate any text, including
//! styling escape sequences forwarded verbatim from the host.

/// The terminal surface output is rendered on.
pub trait DisplaySurface: Send {
    /// Write text without a line break.
    fn write(&mut self, text: &str);

    /// Write text followed by a line break.
    fn writeln(&mut self, text: &str);

    /// Clear the surface.
    fn clear(&mut self);
}

/// Consumer of connection state changes, e.g. a status indicator.
pub trait StatusSink: Send {
    /// Called whenever the link to the session host comes up or goes down.
    fn connection_changed(&mut self, connected: bool);
}
