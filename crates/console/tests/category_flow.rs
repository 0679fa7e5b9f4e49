#![forbid(unsafe_code)]

mod support;

use catadmin_console::{
    AuthSession, CATEGORY_PATH, CatalogClient, CategoryController, ConsoleError, MemoryTokenStore,
    Method, ParentChange,
};
use catadmin_core::{CategoryId, HierarchyError};
use serde_json::{Value, json};
use support::{FakeTransport, category, data};

fn id(raw: &str) -> CategoryId {
    CategoryId::try_new(raw).expect("valid id")
}

fn controller<'t>(
    transport: &'t FakeTransport,
    store: &'t MemoryTokenStore,
) -> CategoryController<&'t FakeTransport, &'t MemoryTokenStore> {
    let client = CatalogClient::new(AuthSession::new(transport, store));
    CategoryController::new(client, 10)
}

fn chain() -> Value {
    json!([
        category("a", "Apparel", None),
        category("b", "Boots", Some("a")),
        category("c", "Chelsea", Some("b")),
        category("d", "Denim", None),
    ])
}

#[test]
fn reload_replaces_the_snapshot() {
    let transport = FakeTransport::new();
    transport
        .reply(Method::Get, CATEGORY_PATH, 200, data(chain()))
        .reply(Method::Get, CATEGORY_PATH, 200, data(json!([category("z", "Zips", None)])));
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);

    assert_eq!(ctl.reload().expect("first load"), 4);
    assert_eq!(ctl.reload().expect("second load"), 1);
    assert_eq!(ctl.categories()[0].id, id("z"));
    let bearers: Vec<Option<String>> = transport
        .requests()
        .into_iter()
        .map(|request| request.bearer)
        .collect();
    assert_eq!(bearers, vec![Some("t".to_string()), Some("t".to_string())]);
}

#[test]
fn cyclic_parent_is_rejected_without_a_request() {
    let transport = FakeTransport::new();
    transport.reply(Method::Get, CATEGORY_PATH, 200, data(chain()));
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    let err = ctl
        .update(&id("a"), None, ParentChange::Set(id("c")))
        .expect_err("a under its grandchild");
    assert!(matches!(err, ConsoleError::Hierarchy(HierarchyError::Cycle { .. })));
    assert_eq!(err.code(), "PARENT_CYCLE");
    assert!(err.is_validation());
    assert!(
        err.to_string().starts_with("Invalid parent selection"),
        "{err}"
    );

    let err = ctl
        .update(&id("b"), None, ParentChange::Set(id("b")))
        .expect_err("self parent");
    assert!(matches!(err, ConsoleError::Hierarchy(HierarchyError::SelfParent { .. })));

    let err = ctl
        .create("Loafers", Some(id("missing")))
        .expect_err("unknown parent");
    assert!(matches!(err, ConsoleError::Hierarchy(HierarchyError::UnknownParent { .. })));

    let err = ctl.create("   ", None).expect_err("blank name");
    assert_eq!(err.code(), "NAME_REQUIRED");

    assert!(transport.mutations().is_empty());
    assert_eq!(transport.count(Method::Get, CATEGORY_PATH), 1);
}

#[test]
fn successful_save_sends_draft_and_reloads() {
    let transport = FakeTransport::new();
    transport
        .reply(Method::Get, CATEGORY_PATH, 200, data(chain()))
        .reply(
            Method::Get,
            CATEGORY_PATH,
            200,
            data(json!([
                category("a", "Apparel", None),
                category("b", "Boots", Some("a")),
                category("c", "Chelsea", Some("b")),
                category("d", "Denim", Some("a")),
            ])),
        )
        .reply(Method::Put, "/api/v1/category/d", 200, json!({ "data": null }));
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    ctl.update(&id("d"), Some("  Denim  "), ParentChange::Set(id("a")))
        .expect("move d under a");

    let mutations = transport.mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!(
        mutations[0].body,
        Some(json!({ "category_name": "Denim", "parent_id": "a" }))
    );
    assert_eq!(transport.count(Method::Get, CATEGORY_PATH), 2);
    let moved = ctl
        .categories()
        .iter()
        .find(|node| node.id == id("d"))
        .expect("d reloaded");
    assert_eq!(moved.parent_id, Some(id("a")));
}

#[test]
fn moving_to_root_and_keeping_parent() {
    let transport = FakeTransport::new();
    transport
        .reply(Method::Get, CATEGORY_PATH, 200, data(chain()))
        .reply(Method::Put, "/api/v1/category/c", 200, json!({}))
        .reply(Method::Put, "/api/v1/category/b", 200, json!({}));
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    ctl.update(&id("c"), None, ParentChange::Root).expect("to root");
    ctl.update(&id("b"), Some("Boots & Shoes"), ParentChange::Keep)
        .expect("rename only");

    let bodies: Vec<Value> = transport
        .mutations()
        .into_iter()
        .filter_map(|request| request.body)
        .collect();
    assert_eq!(
        bodies,
        vec![
            json!({ "category_name": "Chelsea", "parent_id": null }),
            json!({ "category_name": "Boots & Shoes", "parent_id": "a" }),
        ]
    );
}

#[test]
fn create_posts_to_collection() {
    let transport = FakeTransport::new();
    transport
        .reply(Method::Get, CATEGORY_PATH, 200, data(chain()))
        .reply(Method::Post, CATEGORY_PATH, 201, json!({ "data": { "id": "e" } }));
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    ctl.create("Espadrilles", Some(id("c"))).expect("create");
    let mutations = transport.mutations();
    assert_eq!(mutations[0].method, Method::Post);
    assert_eq!(
        mutations[0].body,
        Some(json!({ "category_name": "Espadrilles", "parent_id": "c" }))
    );
    assert_eq!(transport.count(Method::Get, CATEGORY_PATH), 2);
}

#[test]
fn backend_rejection_surfaces_status_and_message() {
    let transport = FakeTransport::new();
    transport
        .reply(Method::Get, CATEGORY_PATH, 200, data(chain()))
        .reply(
            Method::Post,
            CATEGORY_PATH,
            409,
            json!({ "message": "Category already exists" }),
        );
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    let err = ctl.create("Apparel", None).expect_err("conflict");
    match err {
        ConsoleError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Category already exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(transport.count(Method::Get, CATEGORY_PATH), 1);
}

#[test]
fn candidates_exclude_self_and_subtree() {
    let transport = FakeTransport::new();
    transport.reply(Method::Get, CATEGORY_PATH, 200, data(chain()));
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    let ids = |editing: Option<&CategoryId>| -> Vec<String> {
        ctl.parent_candidates(editing)
            .expect("candidates")
            .into_iter()
            .map(|node| node.id.into_string())
            .collect()
    };
    assert_eq!(ids(Some(&id("a"))), vec!["d"]);
    assert_eq!(ids(Some(&id("b"))), vec!["a", "d"]);
    assert_eq!(ids(None), vec!["a", "b", "c", "d"]);

    let err = ctl
        .parent_candidates(Some(&id("nope")))
        .expect_err("unknown editing id");
    assert!(matches!(err, ConsoleError::UnknownCategory(_)));
}

#[test]
fn delete_requires_known_id_and_reloads() {
    let transport = FakeTransport::new();
    transport
        .reply(Method::Get, CATEGORY_PATH, 200, data(chain()))
        .reply(Method::Delete, "/api/v1/category/d", 200, json!({}));
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    let err = ctl.delete(&id("x")).expect_err("unknown");
    assert!(matches!(err, ConsoleError::UnknownCategory(_)));
    assert!(transport.mutations().is_empty());

    ctl.delete(&id("d")).expect("delete");
    assert_eq!(transport.count(Method::Delete, "/api/v1/category/d"), 1);
    assert_eq!(transport.count(Method::Get, CATEGORY_PATH), 2);
}

#[test]
fn tree_rows_mark_corrupt_data_instead_of_hanging() {
    let transport = FakeTransport::new();
    transport.reply(
        Method::Get,
        CATEGORY_PATH,
        200,
        data(json!([
            category("x", "Xmas", Some("y")),
            category("y", "Yoga", Some("x")),
            { "id": 7, "category_name": "Seven", "parent_id": "" },
        ])),
    );
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    let rows = ctl.tree_rows(None);
    let shape: Vec<(&str, usize, bool)> = rows
        .iter()
        .map(|row| (row.id.as_str(), row.depth, row.is_circular_reference_marker))
        .collect();
    assert_eq!(
        shape,
        vec![
            ("x", 0, false),
            ("y", 1, false),
            ("x", 2, true),
            ("7", 0, false),
        ]
    );

    let issues = ctl.lint();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, "PARENT_CYCLE");
}

#[test]
fn tree_search_keeps_matching_nodes_only() {
    let transport = FakeTransport::new();
    transport.reply(Method::Get, CATEGORY_PATH, 200, data(chain()));
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    let rows = ctl.tree_rows(Some("  bOOts "));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "b");
    assert_eq!(rows[0].depth, 0);
    assert_eq!(ctl.tree_rows(Some("")).len(), 4);
}

#[test]
fn orphan_can_be_renamed_while_keeping_its_parent() {
    let transport = FakeTransport::new();
    transport
        .reply(
            Method::Get,
            CATEGORY_PATH,
            200,
            data(json!([
                category("a", "Apparel", None),
                category("o", "Orphan", Some("gone")),
            ])),
        )
        .reply(Method::Put, "/api/v1/category/o", 200, json!({}));
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    ctl.update(&id("o"), Some("Outlet"), ParentChange::Keep)
        .expect("rename keeps dangling parent");
    assert_eq!(
        transport.mutations()[0].body,
        Some(json!({ "category_name": "Outlet", "parent_id": "gone" }))
    );

    let err = ctl
        .update(&id("a"), None, ParentChange::Set(id("gone")))
        .expect_err("moving under a missing parent");
    assert!(matches!(err, ConsoleError::Hierarchy(HierarchyError::UnknownParent { .. })));
    assert_eq!(transport.mutations().len(), 1);
}

#[test]
fn failed_reload_does_not_fail_a_landed_mutation() {
    let transport = FakeTransport::new();
    transport
        .reply(Method::Get, CATEGORY_PATH, 200, data(chain()))
        .reply(Method::Get, CATEGORY_PATH, 503, json!({ "message": "unavailable" }))
        .reply(Method::Delete, "/api/v1/category/d", 200, json!({}));
    let store = MemoryTokenStore::with_tokens("t", "r");
    let mut ctl = controller(&transport, &store);
    ctl.reload().expect("load");

    ctl.delete(&id("d")).expect("delete landed");
    assert_eq!(transport.count(Method::Get, CATEGORY_PATH), 2);
    assert_eq!(ctl.categories().len(), 4);
}
