use tagsync_core::{compile, PostId, TagSet};
use tagsync_store::query::PostQuery;
use tagsync_store::Store;

fn store() -> Store {
    let store = Store::open_in_memory().expect("open");
    store.migrate().expect("migrate");
    store
}

fn post(id: i64) -> PostId {
    PostId::new(id).expect("post id")
}

fn seed(store: &Store) {
    let posts = store.posts();
    posts
        .replace_tags(1, post(1), &TagSet::from_names(["foo", "baz"]))
        .expect("seed 1");
    posts
        .replace_tags(1, post(2), &TagSet::from_names(["foo", "bar", "qux"]))
        .expect("seed 2");
    posts
        .replace_tags(1, post(3), &TagSet::from_names(["foo", "qux"]))
        .expect("seed 3");
    posts
        .replace_tags(1, post(4), &TagSet::from_names(["o'neil"]))
        .expect("seed 4");
    posts
        .replace_tags(1, post(5), &TagSet::new())
        .expect("seed 5");
}

#[test]
fn replace_tags_overwrites_mirror() {
    let store = store();
    let posts = store.posts();
    posts
        .replace_tags(1, post(9), &TagSet::from_names(["a", "b"]))
        .expect("replace");
    posts
        .replace_tags(2, post(9), &TagSet::from_names(["c"]))
        .expect("replace again");

    let tags = posts.get_tags(post(9)).expect("get").expect("tags");
    assert_eq!(tags.to_strings(), vec!["c"]);
    assert!(posts.get_tags(post(10)).expect("get missing").is_none());
}

#[test]
fn load_all_groups_tags_per_post() {
    let store = store();
    seed(&store);
    let all = store.posts().load_all().expect("load all");
    assert_eq!(all.len(), 5);
    assert_eq!(all[1].0, post(2));
    assert_eq!(all[1].1.to_strings(), vec!["bar", "foo", "qux"]);
    assert!(all[4].1.is_empty());
}

#[test]
fn search_runs_compiled_expression() {
    let store = store();
    seed(&store);
    let query = PostQuery::parse("foo -bar {baz,qux}").expect("parse");
    let ids = store.posts().search(&query).expect("search");
    assert_eq!(ids, vec![post(1), post(3)]);
}

#[test]
fn search_binds_quotes_safely() {
    let store = store();
    seed(&store);
    let query = PostQuery::parse("o'neil").expect("parse");
    assert_eq!(store.posts().search(&query).expect("search"), vec![post(4)]);
}

#[test]
fn search_agrees_with_in_memory_evaluation() {
    let store = store();
    seed(&store);
    let all = store.posts().load_all().expect("load all");
    for input in ["foo", "-foo", "bar, baz", "- {bar, baz} foo", "qux -bar", "--foo"] {
        let expr = compile(input).expect("compile");
        let expected: Vec<PostId> = all
            .iter()
            .filter(|(_, tags)| expr.evaluate(tags))
            .map(|(id, _)| *id)
            .collect();
        let found = store
            .posts()
            .search(&PostQuery::from_expr(&expr))
            .expect("search");
        assert_eq!(found, expected, "expression {input}");
    }
}

#[test]
fn delete_removes_post_and_tags() {
    let store = store();
    seed(&store);
    assert!(store.posts().delete(post(1)).expect("delete"));
    assert!(store.posts().get_tags(post(1)).expect("get").is_none());
    let query = PostQuery::parse("baz").expect("parse");
    assert!(store.posts().search(&query).expect("search").is_empty());
}

#[test]
fn failed_transaction_leaves_tags_untouched() {
    let store = store();
    seed(&store);

    let outcome: Result<(), tagsync_store::error::StoreError> = store.transaction(|conn| {
        tagsync_store::repo::PostsRepo::new(conn).replace_tags(
            2,
            post(1),
            &TagSet::from_names(["replaced"]),
        )?;
        Err(tagsync_store::error::StoreError::NotFound("abort".to_string()))
    });
    assert!(outcome.is_err());

    let tags = store.posts().get_tags(post(1)).expect("get").expect("post");
    assert_eq!(tags, TagSet::from_names(["foo", "baz"]));
}
