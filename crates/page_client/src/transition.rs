//! What happens to a card once its submission succeeded: it fades and sinks
//! to the bottom of its list.

use crate::{
    config::ClientSettings,
    dom::{Document, DomError, NodeId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTransition {
    pub row_class: String,
    pub opacity: String,
}

impl Default for RowTransition {
    fn default() -> Self {
        Self::from_settings(&ClientSettings::default())
    }
}

impl RowTransition {
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            row_class: settings.row_class.clone(),
            opacity: settings.done_opacity.clone(),
        }
    }

    /// The nearest inclusive ancestor of `form` carrying the row class, or the
    /// form's parent when no ancestor does.
    pub fn locate_row(&self, doc: &Document, form: NodeId) -> Result<NodeId, DomError> {
        if !doc.contains(form) {
            return Err(DomError::UnknownNode(form));
        }
        doc.closest(form, |d, node| d.has_class(node, &self.row_class))
            .or_else(|| doc.parent(form))
            .ok_or(DomError::Detached(form))
    }

    /// Fades the row and makes it the last child of its container. Nothing is
    /// mutated when the row cannot be moved.
    pub fn apply(&self, doc: &mut Document, form: NodeId) -> Result<NodeId, DomError> {
        let row = self.locate_row(doc, form)?;
        let container = doc.parent(row).ok_or(DomError::Detached(row))?;

        doc.set_style(row, "opacity", &self.opacity)?;
        doc.append_child(container, row)?;
        Ok(row)
    }
}
