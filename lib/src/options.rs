//! Store configuration

use std::{fmt, rc::Rc};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostics, NoopDiagnostics};

/// How values yielded before the terminal state are validated
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Validation {
    /// Every yielded value before the state must be a side effect
    #[default]
    Strict,
    /// Plain actions may be yielded; they are dispatched when flushed
    Permissive,
}

/// Options applied to an [`crate::store::EffectStore`]
#[derive(Clone, Builder)]
pub struct StoreOptions {
    /// Validation mode for yielded values
    #[builder(default)]
    pub validation: Validation,
    /// Sink for advisory warnings
    #[builder(default = "Rc::new(NoopDiagnostics)")]
    pub diagnostics: Rc<dyn Diagnostics>,
}

impl StoreOptions {
    /// Returns builder for StoreOptions
    pub fn builder() -> StoreOptionsBuilder {
        StoreOptionsBuilder::default()
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            validation: Validation::default(),
            diagnostics: Rc::new(NoopDiagnostics),
        }
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "./options_tests.rs"]
mod tests;
