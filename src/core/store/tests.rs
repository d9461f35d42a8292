//! Unit tests for the store and its repositories

use super::*;
use crate::core::session::Session;
use crate::entities::{Part, PartRef, Product};
use chrono::TimeZone;
use rusqlite::params;
use tempfile::tempdir;

fn create_test_store() -> Store {
    Store::open_in_memory().unwrap()
}

fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

fn session() -> Session {
    Session::at(UserId(1), ts(15, 10))
}

fn add_part(store: &Store, part: Part) -> Part {
    store.parts().add(&part, &session()).unwrap()
}

/// Insert a row with neither a machine id nor a company name
fn insert_indeterminate_part(store: &Store, name: &str) -> i64 {
    store
        .connection()
        .execute(
            r#"INSERT INTO parts (name, price, stock, min, max, machine_id, company_name,
                                  create_date, created_by, last_updated, last_updated_by)
               VALUES (?1, 1.0, 1, 0, 5, NULL, '  ', '2024-01-15T10:00:00Z', 1, '2024-01-15T10:00:00Z', 1)"#,
            params![name],
        )
        .unwrap();
    store.connection().last_insert_rowid()
}

fn link_rows(store: &Store, product_id: i64) -> Vec<(i64, i64)> {
    let mut stmt = store
        .connection()
        .prepare("SELECT link_id, part_id FROM product_parts WHERE product_id = ?1 ORDER BY link_id")
        .unwrap();
    stmt.query_map(params![product_id], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}

// =========================================================================
// Parts
// =========================================================================

#[test]
fn test_add_then_get_round_trips_in_house() {
    let store = create_test_store();
    let part = Part::in_house("Test InHouse Part", 10.5, 5, 1, 10, 101);

    let stored = add_part(&store, part.clone());
    assert!(!stored.is_new());

    let loaded = store.parts().get(stored.id()).unwrap().unwrap();
    assert_eq!(loaded, part.with_id(stored.id()));
    assert_eq!(loaded.machine_id(), Some(101));
}

#[test]
fn test_add_then_get_round_trips_outsourced() {
    let store = create_test_store();
    let part = Part::outsourced("Test Outsourced Part", 20.0, 10, 5, 20, "TestCo");

    let stored = add_part(&store, part.clone());

    let loaded = store.parts().get(stored.id()).unwrap().unwrap();
    assert_eq!(loaded, part.with_id(stored.id()));
    assert_eq!(loaded.company_name(), Some("TestCo"));
}

#[test]
fn test_add_assigns_fresh_ids() {
    let store = create_test_store();

    let first = add_part(&store, Part::in_house("A", 1.0, 1, 0, 2, 1));
    let second = add_part(&store, Part::in_house("B", 1.0, 1, 0, 2, 1).with_id(first.id()));

    assert_ne!(first.id(), second.id());
}

#[test]
fn test_get_missing_part() {
    let store = create_test_store();

    assert_eq!(store.parts().get(42).unwrap(), None);
    assert!(matches!(
        store.parts().resolve(42),
        Err(StoreError::NotFound { kind: "part", id: 42 })
    ));
}

#[test]
fn test_indeterminate_part_is_hidden_not_fatal() {
    let store = create_test_store();
    let good = add_part(&store, Part::in_house("Bracket", 2.0, 3, 1, 5, 8));
    let bad = insert_indeterminate_part(&store, "Bracket Blank");

    assert_eq!(store.parts().get(bad).unwrap(), None);
    assert!(matches!(
        store.parts().resolve(bad),
        Err(StoreError::IndeterminateVariant { id }) if id == bad
    ));

    // The raw row is still reachable for repair
    let row = store.parts().row(bad).unwrap().unwrap();
    assert_eq!(row.variant(), Variant::Indeterminate);
    assert_eq!(row.name, "Bracket Blank");

    // Lists and searches skip the row instead of failing
    let all = store.parts().list_all().unwrap();
    assert_eq!(all, vec![good.clone()]);

    let found = store.parts().find_by_name_contains("bracket", true).unwrap();
    assert_eq!(found, vec![good]);
}

#[test]
fn test_find_by_name_is_case_insensitive_by_default() {
    let store = create_test_store();
    let bolt = add_part(&store, Part::in_house("Hex Bolt", 0.2, 50, 10, 100, 3));
    add_part(&store, Part::outsourced("Washer", 0.05, 80, 10, 200, "Acme"));

    let found = store.parts().find_by_name_contains("BOLT", true).unwrap();
    assert_eq!(found, vec![bolt.clone()]);

    assert!(store
        .parts()
        .find_by_name_contains("BOLT", false)
        .unwrap()
        .is_empty());
    assert_eq!(
        store.parts().find_by_name_contains("Bolt", false).unwrap(),
        vec![bolt]
    );
}

#[test]
fn test_find_by_name_folds_accented_names() {
    let store = create_test_store();
    let nut = add_part(&store, Part::outsourced("Écrou M6", 0.05, 80, 10, 200, "Acme"));
    add_part(&store, Part::in_house("Hex Bolt", 0.2, 50, 10, 100, 3));

    for fragment in ["Écrou", "écrou", "ÉCROU M6"] {
        assert_eq!(
            store.parts().find_by_name_contains(fragment, true).unwrap(),
            vec![nut.clone()],
            "no match for {:?}",
            fragment
        );
    }

    assert!(store
        .parts()
        .find_by_name_contains("écrou", false)
        .unwrap()
        .is_empty());
    assert_eq!(store.parts().lookup("écrou").unwrap(), vec![nut]);
}

#[test]
fn test_search_rejects_wildcards() {
    let store = create_test_store();
    add_part(&store, Part::in_house("50% Blend", 1.0, 1, 0, 2, 1));

    for fragment in ["50%", "a_b", "%"] {
        let err = store
            .parts()
            .find_by_name_contains(fragment, true)
            .unwrap_err();
        assert!(
            matches!(err, StoreError::InvalidSearchInput { fragment: ref f } if f == fragment),
            "unexpected error for {:?}: {:?}",
            fragment,
            err
        );
    }

    assert!(matches!(
        store.products().find_by_name_contains("kit_", true),
        Err(StoreError::InvalidSearchInput { .. })
    ));
}

#[test]
fn test_lookup_by_id_or_name() {
    let store = create_test_store();
    let bolt = add_part(&store, Part::in_house("Hex Bolt", 0.2, 50, 10, 100, 3));

    assert_eq!(
        store.parts().lookup(&bolt.id().to_string()).unwrap(),
        vec![bolt.clone()]
    );
    assert_eq!(store.parts().lookup(" hex ").unwrap(), vec![bolt]);
    assert!(store.parts().lookup("999").unwrap().is_empty());
    assert!(store.parts().lookup("1_0").is_err());
}

#[test]
fn test_update_switching_variant_clears_machine_id() {
    let store = create_test_store();
    let part = add_part(&store, Part::in_house("Hinge", 3.0, 4, 1, 10, 5));

    let switched = Part::outsourced("Hinge", 3.25, 6, 1, 10, "X").with_id(part.id());
    store.parts().update(&switched, &session()).unwrap();

    let loaded = store.parts().get(part.id()).unwrap().unwrap();
    assert_eq!(loaded.company_name(), Some("X"));
    assert_eq!(loaded.machine_id(), None);
    assert_eq!(loaded.stock(), 6);

    let (machine_id, company): (Option<i64>, Option<String>) = store
        .connection()
        .query_row(
            "SELECT machine_id, company_name FROM parts WHERE id = ?1",
            params![part.id()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(machine_id, None);
    assert_eq!(company.as_deref(), Some("X"));
}

#[test]
fn test_update_switching_back_clears_company() {
    let store = create_test_store();
    let part = add_part(&store, Part::outsourced("Hinge", 3.0, 4, 1, 10, "X"));

    let switched = Part::in_house("Hinge", 3.0, 4, 1, 10, 77).with_id(part.id());
    store.parts().update(&switched, &session()).unwrap();

    let row: PartRow = store
        .connection()
        .query_row(
            &format!("SELECT {} FROM parts WHERE id = ?1", PartRow::COLUMNS),
            params![part.id()],
            PartRow::from_row,
        )
        .unwrap();
    assert_eq!(row.machine_id, Some(77));
    assert_eq!(row.company_name, None);
}

#[test]
fn test_update_missing_part_is_not_found() {
    let store = create_test_store();
    let ghost = Part::in_house("Ghost", 1.0, 1, 0, 2, 1).with_id(404);

    assert!(matches!(
        store.parts().update(&ghost, &session()),
        Err(StoreError::NotFound { kind: "part", id: 404 })
    ));
}

#[test]
fn test_delete_unreferenced_part() {
    let store = create_test_store();
    let part = add_part(&store, Part::in_house("Shim", 0.1, 9, 1, 20, 2));

    assert!(store.parts().delete(part.id()).unwrap());
    assert_eq!(store.parts().get(part.id()).unwrap(), None);
    assert!(!store.parts().delete(part.id()).unwrap());
}

#[test]
fn test_delete_referenced_part_is_policy_violation() {
    let store = create_test_store();
    let part = add_part(&store, Part::in_house("Shim", 0.1, 9, 1, 20, 2));
    let product = Product::new("Shim Pack", 4.0, 2, 1, 5).with_parts([part.clone()]);
    let product = store.products().add(&product, &session()).unwrap();

    let err = store.parts().delete(part.id()).unwrap_err();
    match err {
        StoreError::PolicyViolation { message } => {
            assert!(message.contains(&product.id.to_string()));
        }
        other => panic!("expected policy violation, got {:?}", other),
    }

    // Row untouched
    assert_eq!(store.parts().get(part.id()).unwrap(), Some(part));
}

#[test]
fn test_referenced_by_is_distinct_and_sorted() {
    let store = create_test_store();
    let part = add_part(&store, Part::in_house("Pin", 0.1, 9, 1, 20, 2));
    let other = add_part(&store, Part::in_house("Clip", 0.1, 9, 1, 20, 2));

    let first = store
        .products()
        .add(
            &Product::new("Kit A", 1.0, 1, 0, 2).with_parts([part.clone(), part.clone()]),
            &session(),
        )
        .unwrap();
    store
        .products()
        .add(
            &Product::new("Kit B", 1.0, 1, 0, 2).with_parts([other.clone()]),
            &session(),
        )
        .unwrap();
    let third = store
        .products()
        .add(
            &Product::new("Kit C", 1.0, 1, 0, 2).with_parts([other, part.clone()]),
            &session(),
        )
        .unwrap();

    assert_eq!(
        store.parts().referenced_by(part.id()).unwrap(),
        vec![first.id, third.id]
    );

    let using: Vec<String> = store
        .products()
        .using_part(part.id())
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(using, vec!["Kit A", "Kit C"]);
}

#[test]
fn test_audit_trail_follows_session() {
    let store = create_test_store();
    let created = Session::at(UserId(1), ts(10, 9));
    let edited = Session::at(UserId(2), ts(12, 17));

    let part = store
        .parts()
        .add(&Part::in_house("Cam", 5.0, 2, 1, 4, 9), &created)
        .unwrap();
    store.parts().update(&part, &edited).unwrap();

    let audit = store.parts().audit(part.id()).unwrap().unwrap();
    assert_eq!(audit.created, ts(10, 9));
    assert_eq!(audit.created_by, UserId(1));
    assert_eq!(audit.last_updated, ts(12, 17));
    assert_eq!(audit.last_updated_by, UserId(2));

    assert_eq!(store.parts().audit(999).unwrap(), None);
}

// =========================================================================
// Products
// =========================================================================

#[test]
fn test_add_product_preserves_multiplicity() {
    let store = create_test_store();
    let a = add_part(&store, Part::in_house("Part A", 1.0, 5, 1, 10, 1));
    let b = add_part(&store, Part::outsourced("Part B", 2.0, 5, 1, 10, "Acme"));

    let product = Product::new("Widget Kit", 9.99, 3, 1, 5).with_parts([a.clone(), a.clone(), b.clone()]);
    let stored = store.products().add(&product, &session()).unwrap();

    let loaded = store.products().get(stored.id).unwrap().unwrap();
    assert_eq!(loaded, stored);
    assert_eq!(
        loaded.part_refs(),
        vec![a.part_ref(), a.part_ref(), b.part_ref()]
    );
}

#[test]
fn test_product_without_parts_has_empty_list() {
    let store = create_test_store();
    let stored = store
        .products()
        .add(&Product::new("Bare", 1.0, 1, 0, 2), &session())
        .unwrap();

    let loaded = store.products().get(stored.id).unwrap().unwrap();
    assert!(loaded.associated_parts.is_empty());
}

#[test]
fn test_add_product_with_unknown_part_rolls_back() {
    let store = create_test_store();
    let a = add_part(&store, Part::in_house("Part A", 1.0, 5, 1, 10, 1));
    let ghost = Part::in_house("Ghost", 1.0, 1, 0, 2, 1).with_id(999);

    let product = Product::new("Broken Kit", 1.0, 1, 0, 2).with_parts([a, ghost]);
    let err = store.products().add(&product, &session()).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));

    assert!(store.products().list_all().unwrap().is_empty());
    let links: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM product_parts", [], |row| row.get(0))
        .unwrap();
    assert_eq!(links, 0);
}

#[test]
fn test_widget_kit_reconciliation() {
    let store = create_test_store();
    let a = add_part(&store, Part::in_house("PartA", 1.0, 5, 1, 10, 1));
    let b = add_part(&store, Part::outsourced("PartB", 2.0, 5, 1, 10, "Acme"));

    let kit = Product::new("Widget Kit", 9.99, 3, 1, 5).with_parts([a.clone(), a.clone(), b.clone()]);
    let kit = store.products().add(&kit, &session()).unwrap();
    let before = link_rows(&store, kit.id);
    assert_eq!(before.len(), 3);

    let mut desired = kit.clone();
    desired.associated_parts = vec![a.clone(), b.clone(), b.clone()];
    let edits = store.products().update(&desired, &session()).unwrap();

    assert_eq!(edits.to_remove, vec![a.part_ref()]);
    assert_eq!(edits.to_add, vec![b.part_ref()]);

    // Oldest PartA link went; the other two rows were not touched
    let after = link_rows(&store, kit.id);
    assert_eq!(after.len(), 3);
    assert_eq!(after[0], before[1]);
    assert_eq!(after[1], before[2]);
    assert_eq!(after[2].1, b.id());
    assert!(after[2].0 > before[2].0);

    let loaded = store.products().get(kit.id).unwrap().unwrap();
    assert_eq!(
        loaded.part_refs(),
        vec![a.part_ref(), b.part_ref(), b.part_ref()]
    );
}

#[test]
fn test_update_with_same_parts_writes_no_links() {
    let store = create_test_store();
    let a = add_part(&store, Part::in_house("PartA", 1.0, 5, 1, 10, 1));
    let b = add_part(&store, Part::in_house("PartB", 1.0, 5, 1, 10, 2));

    let kit = store
        .products()
        .add(
            &Product::new("Kit", 1.0, 1, 0, 2).with_parts([a.clone(), b.clone(), a.clone()]),
            &session(),
        )
        .unwrap();
    let before = link_rows(&store, kit.id);

    let mut renamed = kit.clone();
    renamed.name = "Kit v2".to_string();
    renamed.associated_parts = vec![b, a.clone(), a];
    let edits = store.products().update(&renamed, &session()).unwrap();

    assert!(edits.is_empty());
    assert_eq!(link_rows(&store, kit.id), before);
    assert_eq!(store.products().get(kit.id).unwrap().unwrap().name, "Kit v2");
}

#[test]
fn test_failed_reconciliation_rolls_back_everything() {
    let store = create_test_store();
    let a = add_part(&store, Part::in_house("PartA", 1.0, 5, 1, 10, 1));

    let kit = store
        .products()
        .add(
            &Product::new("Kit", 1.0, 1, 0, 2).with_parts([a.clone(), a.clone()]),
            &session(),
        )
        .unwrap();
    let before = link_rows(&store, kit.id);

    let mut broken = kit.clone();
    broken.name = "Renamed".to_string();
    broken.associated_parts = vec![a, Part::in_house("Ghost", 1.0, 1, 0, 2, 1).with_id(999)];
    let err = store.products().update(&broken, &session()).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));

    assert_eq!(link_rows(&store, kit.id), before);
    assert_eq!(store.products().get(kit.id).unwrap().unwrap().name, "Kit");
}

#[test]
fn test_update_missing_product_is_not_found() {
    let store = create_test_store();
    let ghost = Product {
        id: 77,
        ..Product::new("Ghost", 1.0, 1, 0, 2)
    };

    assert!(matches!(
        store.products().update(&ghost, &session()),
        Err(StoreError::NotFound { kind: "product", id: 77 })
    ));
}

#[test]
fn test_delete_product_requires_no_parts() {
    let store = create_test_store();
    let a = add_part(&store, Part::in_house("PartA", 1.0, 5, 1, 10, 1));
    let kit = store
        .products()
        .add(&Product::new("Kit", 1.0, 1, 0, 2).with_parts([a]), &session())
        .unwrap();

    assert!(matches!(
        store.products().delete(kit.id),
        Err(StoreError::PolicyViolation { .. })
    ));
    assert!(store.products().get(kit.id).unwrap().is_some());

    let mut emptied = kit.clone();
    emptied.associated_parts.clear();
    store.products().update(&emptied, &session()).unwrap();

    assert!(store.products().delete(kit.id).unwrap());
    assert!(store.products().get(kit.id).unwrap().is_none());
    assert!(!store.products().delete(kit.id).unwrap());
}

#[test]
fn test_product_get_drops_indeterminate_linked_part() {
    let store = create_test_store();
    let a = add_part(&store, Part::in_house("PartA", 1.0, 5, 1, 10, 1));
    let blank = insert_indeterminate_part(&store, "Blank");

    let kit = store
        .products()
        .add(&Product::new("Kit", 1.0, 1, 0, 2).with_parts([a.clone()]), &session())
        .unwrap();
    store
        .connection()
        .execute(
            "INSERT INTO product_parts (product_id, part_id) VALUES (?1, ?2)",
            params![kit.id, blank],
        )
        .unwrap();

    let loaded = store.products().get(kit.id).unwrap().unwrap();
    assert_eq!(loaded.part_refs(), vec![a.part_ref()]);

    // The persisted multiset still has the hidden link
    assert_eq!(
        store.products().linked_parts(kit.id).unwrap(),
        vec![a.part_ref(), PartRef(blank)]
    );
}

#[test]
fn test_product_search_and_lookup() {
    let store = create_test_store();
    let a = add_part(&store, Part::in_house("PartA", 1.0, 5, 1, 10, 1));
    let kit = store
        .products()
        .add(
            &Product::new("Widget Kit", 1.0, 1, 0, 2).with_parts([a]),
            &session(),
        )
        .unwrap();
    store
        .products()
        .add(&Product::new("Gadget", 1.0, 1, 0, 2), &session())
        .unwrap();

    let found = store.products().find_by_name_contains("widget", true).unwrap();
    assert_eq!(found, vec![kit.clone()]);

    assert_eq!(
        store.products().lookup(&kit.id.to_string()).unwrap(),
        vec![kit]
    );
    assert_eq!(store.products().lookup("").unwrap().len(), 2);
}

#[test]
fn test_product_search_folds_accented_names() {
    let store = create_test_store();
    let kit = store
        .products()
        .add(&Product::new("Trousse Économique", 1.0, 1, 0, 2), &session())
        .unwrap();

    let found = store
        .products()
        .find_by_name_contains("économique", true)
        .unwrap();
    assert_eq!(found, vec![kit]);
}

// =========================================================================
// Reports and storage
// =========================================================================

#[test]
fn test_updated_since_lists_parts_then_products() {
    let store = create_test_store();
    let old = Session::at(UserId(1), ts(1, 8));
    let recent = Session::at(UserId(1), ts(20, 8));

    store
        .parts()
        .add(&Part::in_house("Old Part", 1.0, 1, 0, 2, 1), &old)
        .unwrap();
    let fresh = store
        .parts()
        .add(&Part::in_house("Fresh Part", 1.0, 7, 0, 9, 1), &recent)
        .unwrap();
    store
        .products()
        .add(&Product::new("Fresh Kit", 1.0, 2, 0, 5), &recent)
        .unwrap();

    let items = store.updated_since(ts(13, 8)).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].kind, ItemKind::Part);
    assert_eq!(items[0].id, fresh.id());
    assert_eq!(items[0].stock, 7);
    assert_eq!(items[0].last_updated, ts(20, 8));
    assert_eq!(items[1].kind, ItemKind::Product);
    assert_eq!(items[1].name, "Fresh Kit");

    // Boundary is inclusive
    assert_eq!(store.updated_since(ts(20, 8)).unwrap().len(), 2);
}

#[test]
fn test_stock_levels_flags_reorder() {
    let store = create_test_store();
    add_part(&store, Part::in_house("Low", 1.0, 2, 2, 9, 1));
    add_part(&store, Part::in_house("Fine", 1.0, 5, 2, 9, 1));

    let lines = store.stock_levels().unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].needs_reorder());
    assert!(!lines[1].needs_reorder());
}

#[test]
fn test_file_store_persists_between_opens() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("inventory.db");

    let id = {
        let store = Store::open(&path).unwrap();
        add_part(&store, Part::outsourced("Seal", 0.5, 10, 1, 50, "Acme")).id()
    };

    let store = Store::open(&path).unwrap();
    let part = store.parts().get(id).unwrap().unwrap();
    assert_eq!(part.name(), "Seal");
}

#[test]
fn test_schema_version_mismatch_is_reported() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("inventory.db");

    {
        let store = Store::open(&path).unwrap();
        store
            .connection()
            .execute("UPDATE schema_version SET version = 99", [])
            .unwrap();
    }

    assert!(matches!(
        Store::open(&path),
        Err(StoreError::SchemaMismatch {
            found: 99,
            expected: SCHEMA_VERSION
        })
    ));
}
