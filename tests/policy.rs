use std::{sync::Arc, thread};
use tollgate::{Error, PermissionPreset, PresetGraph};

fn blog_presets() -> PresetGraph {
    PresetGraph::new(vec![
        PermissionPreset::new("read"),
        PermissionPreset::new("write").extends(["read"]),
        PermissionPreset::new("moderate").extends(["read"]),
        PermissionPreset::new("publish").extends(["write"]),
        PermissionPreset::new("editor")
            .describe("Writes and publishes posts")
            .extends(["publish", "moderate"]),
        PermissionPreset::new("owner").extends(["editor", "billing", "owner"]),
    ])
}

#[test]
fn test_take_binds_expanded_permissions() {
    let validator = blog_presets().take(["editor"]);

    let mut granted: Vec<&str> = validator.permissions().iter().collect();
    granted.sort_unstable();
    assert_eq!(granted, ["editor", "moderate", "publish", "read", "write"]);
    assert!(!validator.is_guarded());
}

#[test]
fn test_cyclic_owner_preset() {
    let validator = blog_presets().take(["owner"]);

    assert!(validator.has("owner").unwrap());
    assert!(validator.has("read").unwrap());
    // "billing" is referenced but never registered
    assert!(!validator.has("billing").unwrap());
}

#[test]
fn test_unknown_grants_give_nothing() {
    let validator = blog_presets().take(["unknown"]);

    assert!(validator.permissions().is_empty());
    assert!(!validator.match_one(|q| vec![q.has("unknown")]).unwrap());
}

#[test]
fn test_request_style_guard() {
    let presets = blog_presets();
    let is_author = false;

    let allowed = presets
        .take(["write"])
        .guard()
        .match_one(|q| vec![q.has("publish"), q.has("write").cond(is_author)]);
    assert!(matches!(allowed, Err(Error::PolicyDenied { .. })));

    let allowed = presets
        .take(["write"])
        .guard()
        .match_one(|q| vec![q.has("publish"), q.has("write").cond(!is_author)]);
    assert!(allowed.unwrap());
}

#[test]
fn test_mixed_composite() {
    let validator = blog_presets().take(["publish"]);
    let is_admin = false;

    assert!(validator
        .match_all(|q| vec![
            q.has("read"),
            q.has_any_of(["moderate", "publish"]),
            q.has_all_of(["write", "publish"]),
            q.cond(!is_admin),
        ])
        .unwrap());

    assert!(!validator
        .match_all(|q| vec![q.has("read"), q.has_all_of(["publish", "moderate"])])
        .unwrap());
}

#[test]
fn test_shared_graph_across_threads() {
    let presets = Arc::new(blog_presets());

    let handles: Vec<_> = ["read", "write", "editor", "owner"]
        .into_iter()
        .map(|grant| {
            let presets = Arc::clone(&presets);
            thread::spawn(move || presets.take([grant]).has("read").unwrap())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
