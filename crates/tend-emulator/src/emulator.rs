//! Emulator trait.

use tend_core::Dimensions;

/// A terminal emulator instance bound to one session pane.
///
/// Keystrokes flow the other way: the embedding UI hands what the emulator
/// captured to the session view, which forwards it to the host.
pub trait Emulator {
    /// Render process output.
    fn write(&mut self, data: &str);

    /// Change the pane size in cells.
    fn resize(&mut self, dimensions: Dimensions);

    /// Give keyboard focus to the emulator.
    fn focus(&mut self);

    /// Release the emulator; no further calls are made after this.
    fn dispose(&mut self);

    /// Current pane size.
    fn dimensions(&self) -> Dimensions;
}
