mod common;

use common::{editor, entry, FakeCatalog, FakeStore};
use estimate_editor::models::{CatalogScope, DocumentHeader, ItemId, ItemKind, PriceRefresh};
use estimate_editor::render::{RowAction, RowEvent};
use estimate_editor::store::{DropTarget, Placement};
use estimate_editor::{EditorEvent, EstimateEditor, NoticeLevel};
use rust_decimal_macros::dec;
use std::sync::Arc;

fn catalog() -> Arc<FakeCatalog> {
    Arc::new(FakeCatalog::new(
        vec![
            entry(1, "Widget", dec!(2.00), dec!(5.00), Some(10)),
            entry(2, "Gasket", dec!(0.50), dec!(1.25), Some(2)),
        ],
        vec![entry(50, "Starter kit", dec!(10.00), dec!(18.00), None)],
    ))
}

fn store() -> Arc<FakeStore> {
    Arc::new(FakeStore::new().with_bundle(
        50,
        vec![
            ("Bracket", dec!(1), dec!(3.00), dec!(5.00)),
            ("Screw", dec!(3), dec!(0.10), dec!(0.25)),
        ],
    ))
}

async fn add(editor: &mut EstimateEditor, scope: CatalogScope, query: &str, quantity: &str) {
    editor
        .dispatch(EditorEvent::SearchInput {
            scope,
            text: query.to_string(),
        })
        .await;
    assert_eq!(editor.pump_search().await, Some(scope));
    editor
        .dispatch(EditorEvent::Select {
            scope,
            index: 0,
            quantity: quantity.to_string(),
        })
        .await;
}

async fn row(editor: &mut EstimateEditor, id: ItemId, action: RowAction) {
    editor
        .dispatch(EditorEvent::Row(RowEvent { item: id, action }))
        .await;
}

fn ids(editor: &EstimateEditor) -> Vec<i64> {
    editor.store().all().iter().map(|i| i.id.0).collect()
}

fn quantity(editor: &EstimateEditor, id: i64) -> rust_decimal::Decimal {
    editor.store().get(ItemId(id)).unwrap().quantity
}

#[tokio::test(start_paused = true)]
async fn widget_scenario_totals() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), false);

    add(&mut editor, CatalogScope::Products, "wid", "3").await;

    assert_eq!(ids(&editor), vec![100]);
    let totals = editor.totals();
    assert_eq!(totals.cost, dec!(6));
    assert_eq!(totals.retail, dec!(15));
    assert_eq!(totals.profit, dec!(9));
    assert_eq!(totals.markup_pct, dec!(150));
    assert_eq!(totals.margin_pct, dec!(60));
    assert!(editor.notices().is_empty());
    assert!(editor.search(CatalogScope::Products).results().is_empty());
}

#[tokio::test(start_paused = true)]
async fn bundle_children_do_not_count_in_totals() {
    let mut editor = editor(store(), catalog(), false);

    add(&mut editor, CatalogScope::Bundles, "kit", "2").await;

    assert_eq!(ids(&editor), vec![100, 101, 102]);
    assert_eq!(editor.store().children_of(ItemId(100)).len(), 2);
    assert_eq!(quantity(&editor, 102), dec!(6));

    let totals = editor.totals();
    assert_eq!(totals.cost, dec!(20));
    assert_eq!(totals.retail, dec!(36));
}

#[tokio::test(start_paused = true)]
async fn bundle_quantity_cascades_to_children() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), false);
    add(&mut editor, CatalogScope::Bundles, "kit", "2").await;

    row(&mut editor, ItemId(100), RowAction::EditQuantity("4".to_string())).await;

    assert_eq!(quantity(&editor, 100), dec!(4));
    assert_eq!(quantity(&editor, 101), dec!(4));
    assert_eq!(quantity(&editor, 102), dec!(12));

    let updated: Vec<ItemId> = store.updates().into_iter().map(|(id, _)| id).collect();
    assert_eq!(updated, vec![ItemId(100), ItemId(101), ItemId(102)]);
    assert_eq!(editor.totals().cost, dec!(40));
}

#[tokio::test(start_paused = true)]
async fn zero_bundle_quantity_stops_rescaling() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), false);
    add(&mut editor, CatalogScope::Bundles, "kit", "2").await;

    row(&mut editor, ItemId(100), RowAction::EditQuantity("0".to_string())).await;
    assert_eq!(quantity(&editor, 101), dec!(0));
    assert_eq!(quantity(&editor, 102), dec!(0));

    row(&mut editor, ItemId(100), RowAction::EditQuantity("5".to_string())).await;
    assert_eq!(quantity(&editor, 100), dec!(5));
    assert_eq!(quantity(&editor, 101), dec!(0));
    assert_eq!(quantity(&editor, 102), dec!(0));
    assert_eq!(store.updates().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn failed_child_update_does_not_stop_cascade() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), false);
    add(&mut editor, CatalogScope::Bundles, "kit", "1").await;
    store.fail_updates_for(ItemId(101));

    row(&mut editor, ItemId(100), RowAction::EditQuantity("2".to_string())).await;

    assert_eq!(quantity(&editor, 100), dec!(2));
    assert_eq!(quantity(&editor, 101), dec!(1));
    assert_eq!(quantity(&editor, 102), dec!(6));
    let notices = editor.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("101"));
}

#[tokio::test(start_paused = true)]
async fn child_quantity_edit_is_rejected_locally() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), false);
    add(&mut editor, CatalogScope::Bundles, "kit", "1").await;

    row(&mut editor, ItemId(101), RowAction::EditQuantity("9".to_string())).await;

    assert_eq!(quantity(&editor, 101), dec!(1));
    assert!(store.updates().is_empty());
    assert_eq!(editor.notices()[0].level, NoticeLevel::Warning);

    row(&mut editor, ItemId(101), RowAction::EditUnitCost("2.5".to_string())).await;
    assert_eq!(editor.store().get(ItemId(101)).unwrap().unit_cost, dec!(2.50));
}

#[tokio::test(start_paused = true)]
async fn store_failure_leaves_rows_unchanged() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), false);
    add(&mut editor, CatalogScope::Products, "wid", "3").await;
    store.set_failing(true);

    row(&mut editor, ItemId(100), RowAction::EditQuantity("7".to_string())).await;
    row(&mut editor, ItemId(100), RowAction::EditUnitRetail("9.99".to_string())).await;
    row(&mut editor, ItemId(100), RowAction::Remove).await;

    let item = editor.store().get(ItemId(100)).unwrap();
    assert_eq!(item.quantity, dec!(3));
    assert_eq!(item.unit_retail, dec!(5.00));
    assert_eq!(editor.totals().retail, dec!(15));
    assert_eq!(editor.notices().len(), 3);
    assert!(editor
        .notices()
        .iter()
        .all(|n| n.level == NoticeLevel::Error));
}

#[tokio::test(start_paused = true)]
async fn oversized_edits_are_refused_before_sending() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), false);
    add(&mut editor, CatalogScope::Products, "wid", "1").await;

    row(
        &mut editor,
        ItemId(100),
        RowAction::EditQuantity("79228162514264337593543950335".to_string()),
    )
    .await;
    row(&mut editor, ItemId(100), RowAction::EditUnitCost("5e20".to_string())).await;

    let item = editor.store().get(ItemId(100)).unwrap();
    assert_eq!(item.quantity, dec!(1));
    assert_eq!(item.unit_cost, dec!(2.00));
    assert!(store.updates().is_empty());
    assert_eq!(editor.totals().cost, dec!(2));
    assert_eq!(editor.rows()[0].line_total_label(), "2.00");

    let notices = editor.drain_notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Warning));
    assert!(notices[0].message.contains("out of range"));

    row(&mut editor, ItemId(100), RowAction::EditQuantity("1000000000".to_string())).await;
    assert_eq!(quantity(&editor, 100), dec!(1000000000));
    assert_eq!(editor.totals().cost, dec!(2000000000));
}

#[tokio::test(start_paused = true)]
async fn failed_add_creates_nothing() {
    let store = store();
    store.set_failing(true);
    let mut editor = editor(store.clone(), catalog(), false);

    add(&mut editor, CatalogScope::Products, "wid", "1").await;

    assert!(editor.store().is_empty());
    assert_eq!(editor.notices().len(), 1);
    assert!(editor.notices()[0].message.contains("Widget"));
}

#[tokio::test(start_paused = true)]
async fn removing_bundle_removes_children() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), false);
    add(&mut editor, CatalogScope::Products, "wid", "1").await;
    add(&mut editor, CatalogScope::Bundles, "kit", "1").await;

    row(&mut editor, ItemId(101), RowAction::Remove).await;

    assert_eq!(ids(&editor), vec![100]);
    assert_eq!(*store.removals.lock().unwrap(), vec![ItemId(101)]);
    assert_eq!(editor.totals().cost, dec!(2));
}

#[tokio::test(start_paused = true)]
async fn interleaving_move_is_rejected_silently() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), true);
    add(&mut editor, CatalogScope::Products, "wid", "1").await;
    add(&mut editor, CatalogScope::Bundles, "kit", "1").await;

    editor
        .dispatch(EditorEvent::Move {
            id: ItemId(100),
            target: DropTarget {
                anchor: ItemId(102),
                placement: Placement::Before,
            },
        })
        .await;

    assert_eq!(ids(&editor), vec![100, 101, 102, 103]);
    assert!(editor.notices().is_empty());
    assert!(store.updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn drag_moves_bundle_and_persists_order() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), true);
    add(&mut editor, CatalogScope::Products, "wid", "1").await;
    add(&mut editor, CatalogScope::Bundles, "kit", "1").await;

    editor.dispatch(EditorEvent::DragStart(ItemId(101))).await;
    editor
        .dispatch(EditorEvent::DragOver {
            over: ItemId(100),
            pointer_y: 2.0,
            row_top: 0.0,
            row_height: 20.0,
        })
        .await;
    editor.dispatch(EditorEvent::DragDrop).await;

    assert_eq!(ids(&editor), vec![101, 102, 103, 100]);
    let orders: Vec<(ItemId, Option<u32>)> = store
        .updates()
        .into_iter()
        .map(|(id, patch)| (id, patch.order))
        .collect();
    assert_eq!(
        orders,
        vec![
            (ItemId(101), Some(0)),
            (ItemId(102), Some(1)),
            (ItemId(103), Some(2)),
            (ItemId(100), Some(3)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn refresh_updates_cost_and_stock_only() {
    let store = Arc::new(FakeStore::new().with_refresh(vec![PriceRefresh {
        id: ItemId(100),
        unit_cost: Some(dec!(2.40)),
        retail: Some(dec!(7.00)),
        stock: Some(1),
    }]));
    let mut editor = editor(store.clone(), catalog(), false);
    add(&mut editor, CatalogScope::Products, "wid", "3").await;

    editor.dispatch(EditorEvent::RefreshPricing).await;

    let item = editor.store().get(ItemId(100)).unwrap();
    assert_eq!(item.unit_cost, dec!(2.40));
    assert_eq!(item.unit_retail, dec!(5.00));
    assert_eq!(item.stock, Some(1));
    assert!(item.is_short());
    assert_eq!(editor.totals().cost, dec!(7.20));
    assert_eq!(editor.notices()[0].level, NoticeLevel::Info);
}

#[tokio::test(start_paused = true)]
async fn toggle_hides_children_without_store_calls() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), false);
    add(&mut editor, CatalogScope::Bundles, "kit", "1").await;

    row(&mut editor, ItemId(100), RowAction::ToggleChildren).await;

    let rows = editor.rows();
    assert!(!rows[0].hidden);
    assert!(rows[1].hidden && rows[2].hidden);
    assert_eq!(rows[1].kind, ItemKind::BundleChild);
    assert!(store.updates().is_empty());

    let html = editor.render_html().unwrap();
    assert!(html.contains(r#"data-item-id="102""#));
}

#[tokio::test(start_paused = true)]
async fn picking_missing_suggestion_warns() {
    let mut editor = editor(store(), catalog(), false);

    editor
        .dispatch(EditorEvent::Select {
            scope: CatalogScope::Products,
            index: 3,
            quantity: String::new(),
        })
        .await;

    assert!(editor.store().is_empty());
    assert_eq!(editor.notices()[0].level, NoticeLevel::Warning);
}

#[tokio::test(start_paused = true)]
async fn save_reports_outcome() {
    let store = store();
    let mut editor = editor(store.clone(), catalog(), false);

    editor
        .dispatch(EditorEvent::Save(DocumentHeader {
            customer_id: None,
            customer_name: "Acme Roofing".to_string(),
            customer_address: String::new(),
            status: "draft".to_string(),
        }))
        .await;

    assert_eq!(store.saves.lock().unwrap().len(), 1);
    let notices = editor.drain_notices();
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert!(editor.notices().is_empty());
}
