use std::rc::Rc;

use crate::dom::{Document, WeakDocument};
use crate::error::Result;
use crate::model::{ChangeSet, Model, WeakModel};
use crate::session::BoundElement;

/// Pushes model changes into the elements bound to the changed names.
///
/// Matching is on the raw property name: a change to `pets` does not reach
/// an element bound to `pets[0].name`. Elements that already show the new
/// value are left untouched, so a change that came from an element does not
/// write back into it.
pub struct ChangePropagator {
    doc: WeakDocument,
    model: WeakModel,
    elements: Rc<[BoundElement]>,
}

impl ChangePropagator {
    pub fn new(doc: &Document, model: &Model, elements: Rc<[BoundElement]>) -> Self {
        Self { doc: doc.downgrade(), model: model.downgrade(), elements }
    }

    /// Apply one change set: names in model order, elements in document
    /// order.
    pub fn apply(&self, changes: &ChangeSet) -> Result<()> {
        let (Some(doc), Some(model)) = (self.doc.upgrade(), self.model.upgrade()) else {
            return Ok(());
        };

        for (name, value) in changes.iter() {
            for bound in self.elements.iter().filter(|b| b.path.as_str() == name) {
                if !doc.is_attached(bound.el) {
                    continue;
                }
                if bound.adapter.shows(&doc, &model, bound.el, &bound.path, value)? {
                    log::trace!("{name}: {:?} already shows {value}", bound.el);
                    continue;
                }
                log::trace!("{name}: {:?} <- {value}", bound.el);
                bound.adapter.set(&doc, &model, bound.el, value)?;
            }
        }
        Ok(())
    }
}
