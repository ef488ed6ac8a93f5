//! Injectable sink for advisory, non-fatal warnings raised by the enhancer

use std::{cell::RefCell, collections::HashSet, fmt, rc::Rc};

#[cfg(test)]
use mockall::automock;

/// Advisory conditions that do not fail a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Advisory {
    /// A reducer returned a plain state instead of a lazy sequence, so the
    /// enhancer is installed but unused
    PlainReduction,
    /// A reducer yielded a plain action where a side effect was expected
    CascadingAction,
    /// A side effect produced further side effects while being flushed
    EffectsDuringFlush,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::PlainReduction => write!(
                f,
                "side effect enhancer is in use, yet the provided reducer \
                 does not return a lazy sequence"
            ),
            Advisory::CascadingAction => write!(
                f,
                "reducer yielded a plain action; wrap it in a side effect \
                 instead of cascading actions"
            ),
            Advisory::EffectsDuringFlush => write!(
                f,
                "side effects triggering side effects is discouraged; the \
                 new effects will run in the next flush"
            ),
        }
    }
}

/// Receives advisory warnings
#[cfg_attr(test, automock)]
pub trait Diagnostics {
    /// Called with each advisory raised
    fn warn(&self, advisory: Advisory);
}

/// Discards every advisory
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn warn(&self, _advisory: Advisory) {}
}

/// Forwards advisories to the `log` facade at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&self, advisory: Advisory) {
        log::warn!("{advisory}");
    }
}

/// Wraps a [`Diagnostics`] sink so each advisory kind is reported at most
/// once for the lifetime of a store
pub(crate) struct Advisor {
    sink: Rc<dyn Diagnostics>,
    reported: RefCell<HashSet<Advisory>>,
}

impl Advisor {
    pub(crate) fn new(sink: Rc<dyn Diagnostics>) -> Self {
        Self {
            sink,
            reported: RefCell::new(HashSet::new()),
        }
    }

    pub(crate) fn warn_once(&self, advisory: Advisory) {
        if self.reported.borrow_mut().insert(advisory) {
            self.sink.warn(advisory);
        }
    }
}

#[cfg(test)]
#[path = "./diagnostics_tests.rs"]
mod tests;
