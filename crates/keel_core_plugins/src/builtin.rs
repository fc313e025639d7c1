//! The table of plugins shipped with Keel.

use keel_plugin::builtin::BuiltinPluginResolver;

use crate::lifecycle::{CORE_PLUGIN, CorePlugin};

/// Returns a resolver that knows every builtin plugin.
///
/// # Example
///
/// ```
/// use keel_core_plugins::builtin_plugins;
///
/// assert!(builtin_plugins().contains("core"));
/// ```
#[must_use]
pub fn builtin_plugins() -> BuiltinPluginResolver {
    BuiltinPluginResolver::new().with_plugin(CORE_PLUGIN, CorePlugin)
}
