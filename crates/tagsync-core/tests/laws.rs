use tagsync_core::tags::wildcard;
use tagsync_core::{DeltaMembership, TagDelta, TagRuleDelta, TagSet};

fn samples() -> Vec<TagDelta> {
    [
        "",
        "x",
        "-x",
        "a b -c",
        "foo bar -baz",
        "-a -b -c",
        "long_hair -short_hair blue_eyes",
        "x -y z",
    ]
    .iter()
    .map(|raw| TagDelta::parse(raw, " "))
    .collect()
}

#[test]
fn double_inversion_is_identity() {
    for delta in samples() {
        assert_eq!(delta.invert().invert(), delta);
    }
}

#[test]
fn canonical_string_round_trips() {
    for delta in samples() {
        let text = delta.canonical_string(" ");
        assert_eq!(TagDelta::parse(&text, " "), delta);
        assert_eq!(TagDelta::parse(&text, " ").canonical_string(" "), text);
    }
}

#[test]
fn wire_string_example() {
    let delta = TagDelta::from_raw(["foo", "bar"], ["baz"], Vec::<&str>::new());
    assert_eq!(delta.canonical_string(" "), "bar foo -baz");
    assert_eq!(TagRuleDelta::from(delta).api_string(), "bar foo -baz");
}

#[test]
fn flatten_matches_nested_union() {
    let all = samples();
    for d1 in &all {
        for d2 in &all {
            for d3 in &all {
                let flat = TagDelta::flatten([d1, d2, d3]);
                assert_eq!(flat, d1.union(d2).union(d3));
                assert_eq!(flat, d1.union(&d2.union(d3)));
            }
        }
    }
}

#[test]
fn union_is_not_commutative() {
    let d1 = TagDelta::parse("x", " ");
    let d2 = TagDelta::parse("-x", " ");
    assert_eq!(d1.union(&d2).status("x"), DeltaMembership::Removed);
    assert_eq!(d2.union(&d1).status("x"), DeltaMembership::Added);
}

#[test]
fn inverse_restores_set_when_precondition_holds() {
    let original = TagSet::from_names(["keep", "old"]);
    let delta = TagDelta::parse("new -old", " ");
    let mut set = original.clone();
    set.apply_delta(&delta);
    set.apply_delta(&delta.invert());
    assert_eq!(set, original);
}

#[test]
fn inverse_does_not_restore_when_addition_was_present() {
    let original = TagSet::from_names(["already"]);
    let delta = TagDelta::parse("already", " ");
    let mut set = original.clone();
    set.apply_delta(&delta);
    set.apply_delta(&delta.invert());
    assert_ne!(set, original);
}

#[test]
fn empty_deltas_compare_equal_however_built() {
    let mut emptied = TagDelta::parse("a -b", " ");
    emptied.reset("a");
    emptied.reset("b");
    assert_eq!(emptied, TagDelta::new());
    assert_eq!(TagDelta::parse("   ", " "), TagDelta::default());
}

#[test]
fn effective_against_skips_noops() {
    let tags = TagSet::from_names(["a", "b"]);
    let delta = TagDelta::parse("a c -b -d", " ");
    assert_eq!(delta.effective_against(&tags).to_string(), "c -b");
}

#[test]
fn wildcard_examples() {
    assert!(wildcard::matches("tag_*", "tag_everything"));
    assert!(!wildcard::matches("tag_*", "everything"));
    assert!(wildcard::matches("a*b*c", "aXbYc"));
    assert!(!wildcard::matches("a*b", "aXbY"));
}
