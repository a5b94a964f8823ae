//! Host signalling abstraction for Black Hole modules.

/// Outputs from a module back to the game that hosts it.
///
/// ```text
/// Module                      Host
///   |                           |
///   |-- report_strike(text) --->|  invalid gesture or wrong digit
///   |-- show_progress(n) ------>|  query gesture answered
///   |-- report_pass() --------->|  exactly once, on solve
/// ```
///
/// The host never gets structured error detail: a strike carries only a
/// human-readable diagnostic.
pub trait ModuleHost: Send + Sync + 'static {
    /// Signals a strike against the bomb.
    ///
    /// # Arguments
    /// * `diagnostic` - Advisory text for logs; never parsed
    fn report_strike(&self, diagnostic: &str);

    /// Signals that the module is solved.
    fn report_pass(&self);

    /// Displays how many digits have been entered across the whole bomb.
    fn show_progress(&self, entered: usize);
}
