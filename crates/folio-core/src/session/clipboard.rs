//! Single-slot object clipboard.

use crate::objects::Object;
use kurbo::Vec2;

/// Holds at most one copied object.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<Object>,
    pastes: u32,
}

impl Clipboard {
    /// Replace the slot with a copy of `object`.
    pub fn copy(&mut self, object: Object) {
        self.slot = Some(object);
        self.pastes = 0;
    }

    /// A fresh copy ready to insert. Each paste gets a new id and cascades
    /// by another `offset` so repeated pastes do not stack exactly.
    pub fn paste(&mut self, offset: Vec2) -> Option<Object> {
        let mut object = self.slot.clone()?;
        self.pastes += 1;
        object.regenerate_id();
        object.translate(offset * f64::from(self.pastes));
        object.set_locked(false);
        Some(object)
    }
}
