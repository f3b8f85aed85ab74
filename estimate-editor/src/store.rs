//! Ordered, in-memory collection of the line items of one estimate.
//!
//! The store is a flat list in display order. A bundle's children always sit
//! directly after the bundle row; every operation here either keeps that
//! layout or fails without touching the list.

use crate::error::{EditorError, Result};
use crate::models::{ItemId, ItemKind, ItemPatch, LineItem, PriceRefresh};
use crate::utils::coerce::clamp_money;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Where a dragged unit lands relative to the hovered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub anchor: ItemId,
    pub placement: Placement,
}

#[derive(Debug, Clone, Default)]
pub struct LineItemStore {
    items: Vec<LineItem>,
}

impl LineItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from an unordered snapshot.
    ///
    /// Top-level rows are sorted by `order`, each bundle's children follow it
    /// sorted by `order`. Children whose parent is missing or is not a bundle
    /// are dropped.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let bundles: HashSet<ItemId> = items
            .iter()
            .filter(|i| i.is_top_level() && i.is_bundle())
            .map(|i| i.id)
            .collect();

        let mut top_level = Vec::new();
        let mut children: HashMap<ItemId, Vec<LineItem>> = HashMap::new();
        for item in items {
            match item.parent_id {
                None => top_level.push(item),
                Some(parent) if bundles.contains(&parent) => {
                    children.entry(parent).or_default().push(item)
                }
                Some(parent) => {
                    tracing::warn!(
                        item_id = %item.id,
                        parent_id = %parent,
                        "Dropping line item whose bundle is not in the document"
                    );
                }
            }
        }

        top_level.sort_by_key(|i| i.order);
        let mut ordered = Vec::new();
        for item in top_level {
            let block = children.remove(&item.id);
            ordered.push(item);
            if let Some(mut block) = block {
                block.sort_by_key(|c| c.order);
                for mut child in block {
                    child.kind = ItemKind::BundleChild;
                    ordered.push(child);
                }
            }
        }

        let mut store = Self { items: ordered };
        store.renumber();
        store
    }

    /// All items in display order.
    pub fn all(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn children_of(&self, id: ItemId) -> &[LineItem] {
        match self.unit_range(id) {
            Some(range) if self.items[range.start].is_top_level() => {
                &self.items[range.start + 1..range.end]
            }
            _ => &[],
        }
    }

    /// Index range of the rows that move together with `id`: a top-level
    /// row plus its child block, or a single child row.
    pub fn unit_range(&self, id: ItemId) -> Option<Range<usize>> {
        let start = self.position(id)?;
        if !self.items[start].is_top_level() {
            return Some(start..start + 1);
        }
        let end = self.items[start + 1..]
            .iter()
            .position(|i| i.parent_id != Some(id))
            .map_or(self.items.len(), |offset| start + 1 + offset);
        Some(start..end)
    }

    /// Insert one confirmed item.
    ///
    /// A top-level item goes after the unit containing `after` (or at the
    /// end). A child goes after `after` when that row belongs to the same
    /// bundle, otherwise at the end of its bundle's block.
    pub fn insert(&mut self, item: LineItem, after: Option<ItemId>) -> Result<()> {
        if self.contains(item.id) {
            return Err(EditorError::Rejected(format!(
                "line item {} is already in the estimate",
                item.id
            )));
        }

        let index = match item.parent_id {
            None => {
                if item.kind == ItemKind::BundleChild {
                    return Err(EditorError::InvalidReorder(format!(
                        "bundle child {} has no bundle",
                        item.id
                    )));
                }
                match after {
                    None => self.items.len(),
                    Some(anchor) => {
                        let anchor = self.top_level_of(anchor)?;
                        self.unit_end(anchor)?
                    }
                }
            }
            Some(parent) => {
                let block = self.bundle_block(parent)?;
                match after.and_then(|a| self.position(a)) {
                    Some(pos) if block.contains(&pos) => pos + 1,
                    _ => block.end,
                }
            }
        };

        self.items.insert(index, item);
        self.renumber();
        Ok(())
    }

    /// Append a bundle row followed by its children, in the given order.
    pub fn insert_group(&mut self, parent: LineItem, children: Vec<LineItem>) -> Result<()> {
        if !parent.is_top_level() || !parent.is_bundle() {
            return Err(EditorError::InvalidReorder(format!(
                "{} is not a top-level bundle",
                parent.id
            )));
        }
        if self.contains(parent.id) || children.iter().any(|c| self.contains(c.id)) {
            return Err(EditorError::Rejected(format!(
                "bundle {} is already in the estimate",
                parent.id
            )));
        }
        if let Some(stray) = children.iter().find(|c| c.parent_id != Some(parent.id)) {
            return Err(EditorError::InvalidReorder(format!(
                "child {} does not belong to bundle {}",
                stray.id, parent.id
            )));
        }

        self.items.push(parent);
        self.items.extend(children.into_iter().map(|mut c| {
            c.kind = ItemKind::BundleChild;
            c
        }));
        self.renumber();
        Ok(())
    }

    pub fn update(&mut self, id: ItemId, patch: &ItemPatch) -> Result<&LineItem> {
        let pos = self.position(id).ok_or(EditorError::NotFound(id))?;
        let item = &mut self.items[pos];
        item.apply(patch);
        Ok(item)
    }

    /// Overwrite cost and stock from a catalog refresh. Quantity and retail
    /// stay as the user set them. Returns false for unknown ids.
    pub fn apply_refresh(&mut self, refresh: &PriceRefresh) -> bool {
        let Some(pos) = self.position(refresh.id) else {
            return false;
        };
        let item = &mut self.items[pos];
        if let Some(cost) = refresh.unit_cost {
            item.unit_cost = clamp_money(cost);
        }
        if refresh.stock.is_some() {
            item.stock = refresh.stock;
        }
        true
    }

    /// Remove an item; removing a bundle removes its whole child block.
    pub fn remove_cascade(&mut self, id: ItemId) -> Result<Vec<LineItem>> {
        let range = self.unit_range(id).ok_or(EditorError::NotFound(id))?;
        let removed: Vec<LineItem> = self.items.drain(range).collect();
        self.renumber();
        Ok(removed)
    }

    /// Insertion index (in the current list) for a drop target.
    pub fn slot_for(&self, target: DropTarget) -> Option<usize> {
        let pos = self.position(target.anchor)?;
        Some(match target.placement {
            Placement::Before => pos,
            Placement::After => pos + 1,
        })
    }

    /// Check that moving the unit of `id` to `slot` keeps the grouping
    /// invariant. Returns the unit's current range.
    pub fn validate_move(&self, id: ItemId, slot: usize) -> Result<Range<usize>> {
        let unit = self.unit_range(id).ok_or(EditorError::NotFound(id))?;
        if slot > self.items.len() {
            return Err(EditorError::InvalidReorder(format!(
                "slot {} is past the end of the estimate",
                slot
            )));
        }
        if slot > unit.start && slot < unit.end {
            return Err(EditorError::InvalidReorder(format!(
                "cannot drop {} inside its own block",
                id
            )));
        }

        match self.items[unit.start].parent_id {
            None => {
                if let Some(next) = self.items.get(slot) {
                    if let Some(bundle) = next.parent_id {
                        return Err(EditorError::InvalidReorder(format!(
                            "cannot place {} inside bundle {}",
                            id, bundle
                        )));
                    }
                }
            }
            Some(parent) => {
                let block = self.bundle_block(parent)?;
                if slot <= block.start || slot > block.end {
                    return Err(EditorError::InvalidReorder(format!(
                        "child {} cannot leave bundle {}",
                        id, parent
                    )));
                }
            }
        }
        Ok(unit)
    }

    /// Move the unit of `id` so it is inserted at `slot` (an index in the
    /// current list). Returns whether the order changed.
    pub fn reorder(&mut self, id: ItemId, slot: usize) -> Result<bool> {
        let unit = self.validate_move(id, slot)?;
        if slot == unit.start || slot == unit.end {
            return Ok(false);
        }

        let moving = self.items[unit.clone()].to_vec();
        let mut rest: Vec<LineItem> = Vec::with_capacity(self.items.len());
        rest.extend_from_slice(&self.items[..unit.start]);
        rest.extend_from_slice(&self.items[unit.end..]);
        let target = if slot > unit.start {
            slot - moving.len()
        } else {
            slot
        };

        let mut reordered = Vec::with_capacity(self.items.len());
        reordered.extend_from_slice(&rest[..target]);
        reordered.extend(moving);
        reordered.extend_from_slice(&rest[target..]);

        check_grouping(&reordered)?;
        self.items = reordered;
        self.renumber();
        Ok(true)
    }

    pub fn move_unit(&mut self, id: ItemId, target: DropTarget) -> Result<bool> {
        let slot = self
            .slot_for(target)
            .ok_or(EditorError::NotFound(target.anchor))?;
        self.reorder(id, slot)
    }

    /// Current `(id, order)` pairs in display order.
    pub fn orders(&self) -> Vec<(ItemId, u32)> {
        self.items.iter().map(|i| (i.id, i.order)).collect()
    }

    pub fn check_grouping(&self) -> Result<()> {
        check_grouping(&self.items)
    }

    fn top_level_of(&self, id: ItemId) -> Result<ItemId> {
        let item = self.get(id).ok_or(EditorError::NotFound(id))?;
        Ok(item.parent_id.unwrap_or(item.id))
    }

    fn unit_end(&self, id: ItemId) -> Result<usize> {
        self.unit_range(id)
            .map(|r| r.end)
            .ok_or(EditorError::NotFound(id))
    }

    fn bundle_block(&self, bundle: ItemId) -> Result<Range<usize>> {
        match self.unit_range(bundle) {
            Some(range) if self.items[range.start].is_bundle() => Ok(range),
            Some(_) => Err(EditorError::InvalidReorder(format!(
                "{} is not a bundle",
                bundle
            ))),
            None => Err(EditorError::InvalidReorder(format!(
                "bundle {} is not in the estimate",
                bundle
            ))),
        }
    }

    fn renumber(&mut self) {
        for (order, item) in self.items.iter_mut().enumerate() {
            item.order = order as u32;
        }
    }
}

fn check_grouping(items: &[LineItem]) -> Result<()> {
    let mut open_bundle: Option<ItemId> = None;
    for item in items {
        match item.parent_id {
            None => {
                if item.kind == ItemKind::BundleChild {
                    return Err(EditorError::InvalidReorder(format!(
                        "bundle child {} has no bundle",
                        item.id
                    )));
                }
                open_bundle = item.is_bundle().then_some(item.id);
            }
            Some(parent) if open_bundle == Some(parent) => {}
            Some(parent) => {
                return Err(EditorError::InvalidReorder(format!(
                    "child {} is separated from bundle {}",
                    item.id, parent
                )));
            }
        }
    }
    Ok(())
}
