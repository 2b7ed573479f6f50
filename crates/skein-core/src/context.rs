//! Explicit store context passed into every engine call.

use crate::store::{FragmentStore, GraphStore, LexicalIndex};
use std::sync::Arc;

/// Handles to the stores backing one vault.
///
/// Cloning is cheap; clones share the same stores.
#[derive(Clone)]
pub struct StoreContext {
    pub graph: Arc<dyn GraphStore>,
    pub lexical: Arc<dyn LexicalIndex>,
    pub fragments: Arc<dyn FragmentStore>,
}

impl StoreContext {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        lexical: Arc<dyn LexicalIndex>,
        fragments: Arc<dyn FragmentStore>,
    ) -> Self {
        Self {
            graph,
            lexical,
            fragments,
        }
    }

    /// Build a context from one text index serving both text contracts.
    pub fn with_text_index<T>(graph: Arc<dyn GraphStore>, index: Arc<T>) -> Self
    where
        T: LexicalIndex + FragmentStore + 'static,
    {
        Self {
            graph,
            lexical: index.clone(),
            fragments: index,
        }
    }
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext").finish_non_exhaustive()
    }
}
