//! Data model tests: wire-shape deserialization, scope labeling, and
//! evaluation outcome rendering.

use jsdb::model::{EvalOutcome, Frame, RemoteValue, ScopeKind, Scope, RemoteObjectId};

/// A pause frame deserializes from the camelCase wire shape.
#[test]
fn frame_deserializes_from_wire_shape() {
    let frame: Frame = serde_json::from_str(
        r#"{
            "location": {"scriptId": "1", "lineNumber": 4, "columnNumber": 2},
            "scopeChain": [
                {"type": "local", "name": "foo", "object": "o1"},
                {"type": "global", "object": "g1"}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(frame.location.script_id.0, "1");
    assert_eq!(frame.location.line_number, 4);
    assert_eq!(frame.location.column_number, 2);
    assert_eq!(frame.scope_chain.len(), 2);
    assert_eq!(frame.scope_chain[0].kind, ScopeKind::Local);
    assert_eq!(frame.scope_chain[0].name.as_deref(), Some("foo"));
    assert_eq!(frame.scope_chain[0].object, RemoteObjectId("o1".into()));
    assert_eq!(frame.scope_chain[1].kind, ScopeKind::Global);
    assert_eq!(frame.scope_chain[1].name, None);
}

/// An omitted column defaults to 0.
#[test]
fn missing_column_defaults_to_zero() {
    let frame: Frame = serde_json::from_str(
        r#"{"location": {"scriptId": "9", "lineNumber": 1}, "scopeChain": []}"#,
    )
    .unwrap();
    assert_eq!(frame.location.column_number, 0);
}

/// Scope labels prefer the name, falling back to the kind when the name is
/// absent, empty, or the literal string "undefined".
#[test]
fn scope_label_rules() {
    let named = Scope {
        kind: ScopeKind::Closure,
        name: Some("makeCounter".into()),
        object: RemoteObjectId("o".into()),
    };
    assert_eq!(named.label(), "makeCounter");

    let unnamed = Scope {
        kind: ScopeKind::Block,
        name: None,
        object: RemoteObjectId("o".into()),
    };
    assert_eq!(unnamed.label(), "block");

    let undefined = Scope {
        kind: ScopeKind::Local,
        name: Some("undefined".into()),
        object: RemoteObjectId("o".into()),
    };
    assert_eq!(undefined.label(), "local");

    let empty = Scope {
        kind: ScopeKind::Catch,
        name: Some(String::new()),
        object: RemoteObjectId("o".into()),
    };
    assert_eq!(empty.label(), "catch");
}

/// Every protocol scope kind parses from its lowercase wire name.
#[test]
fn scope_kind_parses_lowercase() {
    for (text, kind) in [
        ("\"global\"", ScopeKind::Global),
        ("\"local\"", ScopeKind::Local),
        ("\"closure\"", ScopeKind::Closure),
        ("\"block\"", ScopeKind::Block),
        ("\"catch\"", ScopeKind::Catch),
        ("\"with\"", ScopeKind::With),
        ("\"script\"", ScopeKind::Script),
        ("\"eval\"", ScopeKind::Eval),
        ("\"module\"", ScopeKind::Module),
    ] {
        let parsed: ScopeKind = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, kind);
        assert_eq!(format!("\"{}\"", kind.as_str()), text);
    }
}

/// Value outcomes render their description; error outcomes are prefixed.
#[test]
fn eval_outcome_rendering() {
    let value = EvalOutcome::Value(RemoteValue {
        description: "[1, 2, 3]".into(),
    });
    assert_eq!(value.render(), "[1, 2, 3]");

    let error = EvalOutcome::Error("TypeError: undefined is not a function".into());
    assert_eq!(
        error.render(),
        "Uncaught: TypeError: undefined is not a function"
    );
}
