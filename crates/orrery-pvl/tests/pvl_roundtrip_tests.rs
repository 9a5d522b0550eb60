//! Serialize → parse round-trips preserve document structure.

use orrery_pvl::{Document, Group, Keyword, Object};
use proptest::prelude::*;

/// Names that would read as structure lines are excluded; PVL reserves them.
fn name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,8}".prop_filter("reserved word", |s| {
        let lower = s.to_ascii_lowercase().replace('_', "");
        !matches!(lower.as_str(), "object" | "group" | "end" | "endobject" | "endgroup")
    })
}

fn value() -> impl Strategy<Value = String> {
    prop_oneof![
        // Bare path-like values.
        "[a-z0-9$./?_-]{1,12}",
        // Values with spaces or commas; the serializer must quote these.
        "[a-z0-9]{1,4}[ ,][a-z0-9]{1,4}",
        // One embedded quote kind (the serializer switches to the other).
        "[a-z]{1,3}\"[a-z]{1,3}",
        "[a-z]{1,3}'[a-z]{1,3}",
    ]
}

fn comments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9 ]{0,8}[a-z0-9]", 0..2)
}

fn keyword() -> impl Strategy<Value = Keyword> {
    (name(), prop::collection::vec(value(), 1..3), comments()).prop_map(
        |(name, values, comments)| Keyword {
            name,
            values,
            comments,
        },
    )
}

fn group() -> impl Strategy<Value = Group> {
    (name(), prop::collection::vec(keyword(), 0..3), comments()).prop_map(
        |(name, keywords, comments)| Group {
            name,
            keywords,
            comments,
        },
    )
}

fn object() -> impl Strategy<Value = Object> {
    (
        name(),
        prop::collection::vec(keyword(), 0..3),
        prop::collection::vec(group(), 0..3),
        comments(),
    )
        .prop_map(|(name, keywords, groups, comments)| Object {
            name,
            keywords,
            groups,
            objects: vec![],
            comments,
        })
}

fn document() -> impl Strategy<Value = Document> {
    (
        prop::collection::vec(keyword(), 0..2),
        prop::collection::vec(object(), 1..3),
    )
        .prop_map(|(keywords, objects)| Document { keywords, objects })
}

proptest! {
    #[test]
    fn round_trip_preserves_structure(doc in document()) {
        let text = doc.to_string();
        let reparsed = Document::parse(&text).expect("reparse serialized document");
        prop_assert_eq!(reparsed, doc);
    }
}
