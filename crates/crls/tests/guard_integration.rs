//! Integration tests for synchronous guards.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crls::{
    bind_sync, Columns, DatasetSource, Decision, FilterConfig, GuardBinder, GuardError, Record,
    Row, SecurityContext, SecuritySpec,
};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("crls=trace,crls_core=trace")
        .with_test_writer()
        .try_init();
}

fn row(value: serde_json::Value) -> Row {
    Row::try_from(value).unwrap()
}

fn blog_posts() -> Vec<Row> {
    vec![
        row(json!({
            "id": 1,
            "title": "This is a blog post!",
            "tenant": 123,
            "content": "This is the content of the blog post!",
        })),
        row(json!({
            "id": 2,
            "title": "This is another blog post!",
            "tenant": 123,
            "content": "This can only be seen by our tenant!",
        })),
        row(json!({
            "id": 3,
            "title": "This is our organisation's secret blog post!",
            "tenant": 456,
            "content": "This is the secure/secret content of the blog post!",
            "secret": true,
        })),
    ]
}

fn tenant(id: i64) -> SecurityContext {
    SecurityContext::anonymous().with_attribute("tenant", id)
}

fn same_tenant(row: &Row, ctx: &SecurityContext) -> bool {
    row.get("tenant") == ctx.attribute("tenant")
}

fn ids(rows: &[Row]) -> Vec<i64> {
    rows.iter()
        .map(|r| r.get("id").and_then(|v| v.as_i64()).unwrap())
        .collect()
}

#[test]
fn test_row_level_security() {
    init_tracing();
    let guard = bind_sync(
        blog_posts(),
        Some(SecuritySpec::<Row, SecurityContext>::new().with_row(same_tenant)),
    );

    let filtered = guard.call(&tenant(123)).unwrap();
    assert_eq!(ids(&filtered), vec![1, 2]);

    let filtered = guard.call(&tenant(456)).unwrap();
    assert_eq!(ids(&filtered), vec![3]);

    let filtered = guard.call(&tenant(789)).unwrap();
    assert!(filtered.is_empty());
}

#[test]
fn test_column_level_security() {
    init_tracing();
    let guard = bind_sync(
        blog_posts(),
        Some(SecuritySpec::<Row, ()>::new().with_column(|row, _| {
            if row.get("tenant") == Some(&json!(456)) {
                Columns::only(["id", "title", "content", "secret"])
            } else {
                Columns::only(["id", "title", "content"])
            }
        })),
    );

    let filtered = guard.call(&()).unwrap();
    assert_eq!(filtered.len(), 3);
    assert_eq!(filtered[0].field_names(), vec!["id", "title", "content"]);
    assert_eq!(filtered[1].field_names(), vec!["id", "title", "content"]);

    let secret = filtered
        .iter()
        .find(|r| r.get("id") == Some(&json!(3)))
        .unwrap();
    assert_eq!(secret.field_names(), vec!["id", "title", "content", "secret"]);
}

#[test]
fn test_row_and_column_security() {
    init_tracing();
    let guard = bind_sync(
        blog_posts(),
        Some(
            SecuritySpec::<Row, SecurityContext>::new()
                .with_row(same_tenant)
                .with_column(|_, _| Columns::only(["id", "title", "tenant", "content"])),
        ),
    );

    let filtered = guard.call(&tenant(123)).unwrap();
    assert_eq!(ids(&filtered), vec![1, 2]);
    assert!(filtered.iter().all(|r| r.get("secret").is_none()));
    assert!(filtered.iter().all(|r| r.len() == 4));

    let filtered = guard.call(&tenant(789)).unwrap();
    assert!(filtered.is_empty());
}

#[test]
fn test_no_security_returns_original_dataset() {
    let dataset: Arc<[Row]> = blog_posts().into();
    let guard = bind_sync::<Row, ()>(Arc::clone(&dataset), None);

    let filtered = guard.call(&()).unwrap();
    assert!(Arc::ptr_eq(&filtered, &dataset));
    assert_eq!(&*filtered, &*dataset);
}

#[test]
fn test_explicit_defaults_match_no_security() {
    let none = bind_sync::<Row, SecurityContext>(blog_posts(), None);
    let empty = bind_sync(blog_posts(), Some(SecuritySpec::<Row, SecurityContext>::new()));
    let explicit = bind_sync(
        blog_posts(),
        Some(
            SecuritySpec::<Row, SecurityContext>::new()
                .with_row(|_, _| true)
                .with_column(|_, _| Columns::All),
        ),
    );

    assert!(none.is_passthrough());
    assert!(empty.is_passthrough());
    assert!(!explicit.is_passthrough());

    for ctx in [tenant(123), tenant(456), SecurityContext::anonymous()] {
        let expected = none.call(&ctx).unwrap();
        assert_eq!(&*empty.call(&ctx).unwrap(), &*expected);
        assert_eq!(&*explicit.call(&ctx).unwrap(), &*expected);
    }
}

#[test]
fn test_output_is_subset_of_input() {
    let source = blog_posts();
    let guard = bind_sync(
        source.clone(),
        Some(SecuritySpec::<Row, SecurityContext>::combined(|row, ctx| {
            if !same_tenant(row, ctx) {
                Decision::Exclude
            } else if ctx.is_authenticated() {
                Decision::include_all()
            } else {
                Decision::include_only(["id", "secret", "unknown"])
            }
        })),
    );

    let contexts = [
        tenant(123),
        tenant(456),
        tenant(456).with_principal("alice"),
        tenant(789),
    ];
    for ctx in contexts {
        let filtered = guard.call(&ctx).unwrap();
        assert!(filtered.len() <= source.len());

        for out in filtered.iter() {
            let original = source.iter().find(|r| r.get("id") == out.get("id")).unwrap();
            assert!(same_tenant(original, &ctx));

            let original_fields: HashSet<_> = original.field_names().into_iter().collect();
            for (name, value) in out.iter() {
                assert!(original_fields.contains(name));
                assert_eq!(original.get(name), Some(value));
            }
        }
    }
}

#[test]
fn test_projection_is_intersection() {
    let guard = bind_sync(
        blog_posts(),
        Some(SecuritySpec::<Row, ()>::new().with_column(|_, _| {
            Columns::only(["content", "secret", "missing", "id"])
        })),
    );

    let filtered = guard.call(&()).unwrap();
    assert_eq!(filtered[0].field_names(), vec!["id", "content"]);
    assert_eq!(filtered[2].field_names(), vec!["id", "content", "secret"]);
    assert_eq!(filtered[2].get("secret"), Some(&json!(true)));
}

#[test]
fn test_producer_invoked_every_call() {
    let state = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&state);
    let guard = bind_sync::<Row, ()>(
        DatasetSource::producer(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            vec![Row::new().with_field("state", n)]
        }),
        Some(SecuritySpec::<Row, ()>::new().with_row(|_, _| true)),
    );

    assert_eq!(guard.call(&()).unwrap()[0].get("state"), Some(&json!(1)));
    assert_eq!(guard.call(&()).unwrap()[0].get("state"), Some(&json!(2)));
}

#[test]
fn test_producer_failure_skips_predicates() {
    let evaluated = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evaluated);
    let guard = bind_sync::<Row, ()>(
        DatasetSource::try_producer(|| Err::<Vec<Row>, _>("database unavailable")),
        Some(SecuritySpec::<Row, ()>::new().with_row(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })),
    );

    let err = guard.call(&()).unwrap_err();
    assert!(matches!(err, GuardError::Producer(_)));
    assert_eq!(evaluated.load(Ordering::SeqCst), 0);
}

#[test]
fn test_predicate_failure_propagates() {
    #[derive(Debug, thiserror::Error)]
    #[error("no tenant in context")]
    struct MissingTenant;

    let guard = bind_sync(
        blog_posts(),
        Some(SecuritySpec::<Row, SecurityContext>::new().try_with_row(
            |row: &Row, ctx: &SecurityContext| match ctx.attribute("tenant") {
                Some(tenant) => Ok(row.get("tenant") == Some(tenant)),
                None => Err(MissingTenant),
            },
        )),
    );

    let err = guard.call(&SecurityContext::anonymous()).unwrap_err();
    match err {
        GuardError::RowPredicate { index, source } => {
            assert_eq!(index, 0);
            assert!(source.downcast_ref::<MissingTenant>().is_some());
        }
        other => panic!("Expected RowPredicate, got {other:?}"),
    }
}

#[test]
fn test_malformed_dynamic_result() {
    let guard = bind_sync(
        blog_posts(),
        Some(SecuritySpec::<Row, ()>::dynamic(|row, _| {
            if row.get("secret").is_some() {
                json!({ "columns": ["id"] })
            } else {
                json!(true)
            }
        })),
    );

    let err = guard.call(&()).unwrap_err();
    assert!(matches!(err, GuardError::MalformedColumns { index: 2, .. }));
}

#[test]
fn test_strict_config_rejects_unknown_fields() {
    let guard = GuardBinder::<Row, ()>::new()
        .with_security(
            SecuritySpec::<Row, ()>::new().with_column(|_, _| Columns::only(["id", "secret"])),
        )
        .with_config(FilterConfig::new().strict().with_label("posts"))
        .bind_sync(blog_posts());

    let err = guard.call(&()).unwrap_err();
    match err {
        GuardError::UnknownField { index, field } => {
            assert_eq!(index, 0);
            assert_eq!(field, "secret");
        }
        other => panic!("Expected UnknownField, got {other:?}"),
    }
}

#[test]
fn test_concurrent_calls() {
    let guard = bind_sync(
        blog_posts(),
        Some(SecuritySpec::<Row, SecurityContext>::new().with_row(same_tenant)),
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = [(123, 2), (456, 1), (789, 0)]
            .into_iter()
            .map(|(id, expected)| {
                let guard = guard.clone();
                scope.spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(guard.call(&tenant(id)).unwrap().len(), expected);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    });
}
