//! Plugin lifecycle states and the legal transitions between them.
//!
//! ```text
//! Registered ─install─▶ Installed ─activate─▶ Active ◀─activate─┐
//!                           │                   │ deactivate     │
//!                           │                   ▼                │
//!                           │               Inactive ────────────┘
//!                           └──── uninstall ────┴──▶ Uninstalled (terminal)
//! ```

use serde::{Deserialize, Serialize};

/// Lifecycle state of one registered plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Definition added to the manager.
    Registered,
    /// Context created, install and on_install completed.
    Installed,
    /// on_activate completed.
    Active,
    /// on_deactivate completed; may be activated again.
    Inactive,
    /// on_uninstall completed and the context cleaned up. Terminal.
    Uninstalled,
}

impl PluginState {
    /// Returns whether moving from `self` to `next` is a legal transition.
    ///
    /// `Active → Uninstalled` is legal; the manager runs `on_deactivate`
    /// first.
    pub fn can_transition_to(self, next: PluginState) -> bool {
        use PluginState::*;
        matches!(
            (self, next),
            (Registered, Installed)
                | (Installed, Active)
                | (Installed, Uninstalled)
                | (Active, Inactive)
                | (Active, Uninstalled)
                | (Inactive, Active)
                | (Inactive, Uninstalled)
        )
    }

    /// Returns `true` for `Uninstalled`.
    pub fn is_terminal(self) -> bool {
        self == PluginState::Uninstalled
    }

    /// Returns `true` once install has completed and until uninstall.
    pub fn is_installed(self) -> bool {
        matches!(
            self,
            PluginState::Installed | PluginState::Active | PluginState::Inactive
        )
    }

    /// Returns the state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Installed => "installed",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Uninstalled => "uninstalled",
        }
    }
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A manager-level lifecycle command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleCommand {
    Install,
    Activate,
    Deactivate,
    Uninstall,
}

impl LifecycleCommand {
    /// The state a successful command leaves the plugin in.
    pub fn target(self) -> PluginState {
        match self {
            Self::Install => PluginState::Installed,
            Self::Activate => PluginState::Active,
            Self::Deactivate => PluginState::Inactive,
            Self::Uninstall => PluginState::Uninstalled,
        }
    }

    /// Returns the command name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Uninstall => "uninstall",
        }
    }
}

impl std::fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
