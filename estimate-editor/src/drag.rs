//! Drag gesture over the line-item rows.
//!
//! The controller only tracks the gesture; the store decides what a valid
//! position is and performs the move on drop.

use crate::error::{EditorError, Result};
use crate::models::ItemId;
use crate::store::{DropTarget, LineItemStore, Placement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The unit moved; carries the renumbered `(id, order)` pairs.
    Moved(Vec<(ItemId, u32)>),
    Rejected,
    NoOp,
}

#[derive(Debug, Clone)]
struct DragSession {
    id: ItemId,
    unit: Vec<ItemId>,
    target: Option<DropTarget>,
    rejected: bool,
}

#[derive(Debug, Default)]
pub struct DragReorderController {
    session: Option<DragSession>,
}

impl DragReorderController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Rows that move with the current drag, in display order.
    pub fn selection(&self) -> &[ItemId] {
        self.session.as_ref().map_or(&[], |s| s.unit.as_slice())
    }

    pub fn target(&self) -> Option<DropTarget> {
        self.session.as_ref().and_then(|s| s.target)
    }

    /// Start dragging `id`. A bundle drags its whole child block.
    pub fn begin(&mut self, store: &LineItemStore, id: ItemId) -> Result<()> {
        let range = store.unit_range(id).ok_or(EditorError::NotFound(id))?;
        let unit = store.all()[range].iter().map(|i| i.id).collect();
        self.session = Some(DragSession {
            id,
            unit,
            target: None,
            rejected: false,
        });
        tracing::debug!(item_id = %id, "Drag started");
        Ok(())
    }

    /// Pointer moved over row `over`. The upper half of the row means
    /// before it, the lower half after it. Returns the accepted target, if
    /// any.
    pub fn hover(
        &mut self,
        store: &LineItemStore,
        over: ItemId,
        pointer_y: f64,
        row_top: f64,
        row_height: f64,
    ) -> Option<DropTarget> {
        let session = self.session.as_mut()?;
        let placement = if pointer_y < row_top + row_height / 2.0 {
            Placement::Before
        } else {
            Placement::After
        };
        let candidate = DropTarget {
            anchor: over,
            placement,
        };

        let valid = store
            .slot_for(candidate)
            .map(|slot| store.validate_move(session.id, slot).is_ok())
            .unwrap_or(false);

        session.target = valid.then_some(candidate);
        session.rejected = !valid;
        session.target
    }

    /// Finish the gesture and apply the move.
    pub fn drop(&mut self, store: &mut LineItemStore) -> DropOutcome {
        let Some(session) = self.session.take() else {
            return DropOutcome::NoOp;
        };
        let Some(target) = session.target else {
            return if session.rejected {
                DropOutcome::Rejected
            } else {
                DropOutcome::NoOp
            };
        };

        match store.move_unit(session.id, target) {
            Ok(true) => {
                tracing::debug!(item_id = %session.id, ?target, "Drag applied");
                DropOutcome::Moved(store.orders())
            }
            Ok(false) => DropOutcome::NoOp,
            Err(e) => {
                tracing::debug!(item_id = %session.id, ?target, error = %e, "Drag rejected");
                DropOutcome::Rejected
            }
        }
    }

    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(item_id = %session.id, "Drag cancelled");
        }
    }
}
