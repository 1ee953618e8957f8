//! Tests for server version parsing and compatibility gates.

use proptest::prelude::*;

use crate::error::Error;
use crate::server_version::{Compatibility, ServerVersion};

#[test]
fn test_parse_full_version() {
    let v = ServerVersion::parse("2.5.3").unwrap();
    assert_eq!(v, ServerVersion::new(2, 5, 3));
}

#[test]
fn test_parse_prerelease_suffix_is_dropped() {
    let v = ServerVersion::parse("2.6.0-alpha01").unwrap();
    assert_eq!(v, ServerVersion::new(2, 6, 0));
}

#[test]
fn test_parse_missing_patch_defaults_to_zero() {
    let v: ServerVersion = "2.4".parse().unwrap();
    assert_eq!(v, ServerVersion::new(2, 4, 0));
}

#[test]
fn test_parse_rejects_garbage() {
    for raw in ["", "2", "two.one.zero", "2..1", "2.1.0.7", "2.x"] {
        assert!(
            matches!(ServerVersion::parse(raw), Err(Error::InvalidArgument(_))),
            "'{raw}' should not parse"
        );
    }
}

#[test]
fn test_ordering() {
    assert!(ServerVersion::new(2, 10, 0) > ServerVersion::new(2, 9, 9));
    assert!(ServerVersion::new(1, 99, 99) < ServerVersion::new(2, 0, 0));
    assert!(ServerVersion::new(2, 5, 1) > ServerVersion::new(2, 5, 0));
}

#[test]
fn test_compatibility_since() {
    let gate = Compatibility::since(ServerVersion::new(2, 2, 0));
    assert!(gate.allows(ServerVersion::new(2, 2, 0)));
    assert!(gate.allows(ServerVersion::new(2, 3, 1)));
    assert!(!gate.allows(ServerVersion::new(2, 1, 9)));
}

#[test]
fn test_compatibility_before() {
    let gate = Compatibility::before(ServerVersion::new(2, 1, 0));
    assert!(gate.allows(ServerVersion::new(2, 0, 3)));
    assert!(!gate.allows(ServerVersion::new(2, 1, 0)));
}

#[test]
fn test_compatibility_between() {
    let gate = Compatibility::between(ServerVersion::new(2, 3, 0), ServerVersion::new(3, 0, 0));
    assert!(!gate.allows(ServerVersion::new(2, 2, 9)));
    assert!(gate.allows(ServerVersion::new(2, 3, 0)));
    assert!(gate.allows(ServerVersion::new(2, 6, 1)));
    assert!(!gate.allows(ServerVersion::new(3, 0, 0)));
    assert_eq!(gate.to_string(), "2.3.0 <= GDS < 3.0.0");
}

#[test]
fn test_compatibility_check_error_names_endpoint() {
    let gate = Compatibility::since(ServerVersion::new(2, 4, 0));
    let err = gate
        .check("gds.graph.sample.cnarw", ServerVersion::new(2, 3, 0))
        .unwrap_err();

    match err {
        Error::IncompatibleServerVersion {
            endpoint,
            server_version,
            requirement,
        } => {
            assert_eq!(endpoint, "gds.graph.sample.cnarw");
            assert_eq!(server_version, "2.3.0");
            assert_eq!(requirement, "GDS >= 2.4.0");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_compatibility_display_window() {
    let gate = Compatibility {
        min_inclusive: Some(ServerVersion::new(2, 0, 0)),
        max_exclusive: Some(ServerVersion::new(2, 1, 0)),
    };
    assert_eq!(gate.to_string(), "2.0.0 <= GDS < 2.1.0");
    assert_eq!(Compatibility::default().to_string(), "any GDS version");
}

proptest! {
    #[test]
    fn prop_display_parse_roundtrip(major in 0u32..100, minor in 0u32..100, patch in 0u32..100) {
        let v = ServerVersion::new(major, minor, patch);
        prop_assert_eq!(ServerVersion::parse(&v.to_string()).unwrap(), v);
    }

    #[test]
    fn prop_order_matches_tuple_order(
        a in (0u32..5, 0u32..12, 0u32..5),
        b in (0u32..5, 0u32..12, 0u32..5),
    ) {
        let va = ServerVersion::new(a.0, a.1, a.2);
        let vb = ServerVersion::new(b.0, b.1, b.2);
        prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
    }
}
