use tagsync_core::{PostId, ProposedEdit, TagDelta, TagRuleDelta, TagSet};
use tagsync_store::error::StoreErrorKind;
use tagsync_store::repo::ProposalStatus;
use tagsync_store::Store;

fn store() -> Store {
    let store = Store::open_in_memory().expect("open");
    store.migrate().expect("migrate");
    store
}

fn post(id: i64) -> PostId {
    PostId::new(id).expect("post id")
}

fn edit(store: &Store, replace: &str) -> ProposedEdit {
    let rule = store
        .rules()
        .create(1, TagDelta::parse("a", " "), TagRuleDelta::parse(replace), false)
        .expect("rule");
    ProposedEdit {
        rule_id: rule.id,
        delta: rule.replace_spec,
    }
}

#[test]
fn open_is_idempotent_per_post_and_rule() {
    let store = store();
    store
        .posts()
        .replace_tags(1, post(1), &TagSet::from_names(["a"]))
        .expect("post");
    let edit = edit(&store, "b -a");

    let (first, created) = store.proposals().open(10, post(1), &edit).expect("open");
    assert!(created);
    let (second, created_again) = store.proposals().open(20, post(1), &edit).expect("reopen");
    assert!(!created_again);
    assert_eq!(first.id, second.id);
    assert_eq!(second.delta.api_string(), "b -a");
    assert_eq!(store.proposals().list_open(None).expect("list").len(), 1);
}

#[test]
fn resolve_closes_and_allows_new_proposal() {
    let store = store();
    store
        .posts()
        .replace_tags(1, post(2), &TagSet::from_names(["a"]))
        .expect("post");
    let edit = edit(&store, "c");

    let (proposal, _) = store.proposals().open(10, post(2), &edit).expect("open");
    store
        .proposals()
        .resolve(11, proposal.id, ProposalStatus::Dismissed)
        .expect("dismiss");

    let loaded = store.proposals().get(proposal.id).expect("get").expect("proposal");
    assert_eq!(loaded.status, ProposalStatus::Dismissed);
    assert_eq!(loaded.resolved_at, Some(11));
    assert!(store.proposals().list_open(Some(post(2))).expect("list").is_empty());

    let err = store
        .proposals()
        .resolve(12, proposal.id, ProposalStatus::Committed)
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::InvalidProposal);

    let (_, created) = store.proposals().open(13, post(2), &edit).expect("reopen");
    assert!(created);
}

#[test]
fn list_open_filters_by_post() {
    let store = store();
    for id in [1, 2] {
        store
            .posts()
            .replace_tags(1, post(id), &TagSet::from_names(["a"]))
            .expect("post");
    }
    let edit = edit(&store, "d");
    store.proposals().open(1, post(1), &edit).expect("open 1");
    store.proposals().open(1, post(2), &edit).expect("open 2");

    let only_two = store.proposals().list_open(Some(post(2))).expect("list");
    assert_eq!(only_two.len(), 1);
    assert_eq!(only_two[0].post_id, post(2));
}

#[test]
fn deleting_rule_drops_its_proposals() {
    let store = store();
    store
        .posts()
        .replace_tags(1, post(3), &TagSet::from_names(["a"]))
        .expect("post");
    let edit = edit(&store, "e");
    store.proposals().open(1, post(3), &edit).expect("open");
    store.rules().delete(edit.rule_id).expect("delete rule");
    assert!(store.proposals().list_open(None).expect("list").is_empty());
}
