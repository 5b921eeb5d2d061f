//! The registration protocol implemented by application modules.

use crate::app::App;
use crate::error::Result;

/// A unit of an application that contributes flags, hooks and commands.
///
/// Every method defaults to doing nothing, so a module only implements the
/// phases it takes part in. The [`App`] calls them in three passes (global
/// flags, then shared flags, then commands) over the modules it is given.
pub trait Module {
    /// Adds application-wide flags, usually through [`App::global_flags`].
    /// After-parse hooks are typically registered here too.
    fn global_flags(&self, _app: &mut App) -> Result<()> {
        Ok(())
    }

    /// Creates flag groups other modules may inherit, through
    /// [`App::new_shared_parser`].
    fn shared_flags(&self, _app: &mut App) -> Result<()> {
        Ok(())
    }

    /// Registers commands through [`App::register_command`].
    fn commands(&self, _app: &mut App) -> Result<()> {
        Ok(())
    }
}
