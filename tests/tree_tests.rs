mod common;

use anyhow::{Context, Result};
use common::TestCollection;
use filecoll::package::{Dependency, Package};
use filecoll::tree::Collection;
use rstest::rstest;
use std::path::Path;

/// /a, /a/b, /a/b/c and a sibling /d
fn nested() -> Result<Collection> {
    let mut coll = Collection::new(Path::new("/data/collection.toml"))?;
    let root = coll.root();
    let a = coll.new_directory("a")?;
    let b = coll.new_directory("b")?;
    let c = coll.new_directory("c")?;
    let d = coll.new_directory("d")?;
    coll.add_child(root, a)?;
    coll.add_child(a, b)?;
    coll.add_child(b, c)?;
    coll.add_child(root, d)?;
    Ok(coll)
}

#[rstest]
#[case("/a", "/a", false)]
#[case("/a", "/a/b", false)]
#[case("/a", "/a/b/c", false)]
#[case("/a", "/d", true)]
#[case("/a/b", "/d", true)]
#[case("/a/b", "/a", false)]
#[case("/a/b/c", "/", true)]
fn test_directory_move_rules(
    #[case] item: &str,
    #[case] target: &str,
    #[case] allowed: bool,
) -> Result<()> {
    let coll = nested()?;
    let item = coll.find(item).context("item")?;
    let target = coll.find(target).context("target")?;
    assert_eq!(coll.can_move(item, target), allowed);
    Ok(())
}

#[test]
fn test_move_then_find() -> Result<()> {
    let mut coll = nested()?;
    let b = coll.find("/a/b").context("b")?;
    let d = coll.find("/d").context("d")?;
    coll.move_to(b, d)?;

    assert!(coll.find("/d/b/c").is_some());
    assert!(coll.find("/a/b").is_none());
    assert_eq!(
        coll[coll.find("/d/b/c").context("c")?].full_path(),
        Path::new("/data/d/b/c")
    );
    Ok(())
}

#[test]
fn test_persisted_tree_round_trip() -> Result<()> {
    let fixture = TestCollection::new()?;
    let mut coll = fixture.open()?;
    let root = coll.root();

    let docs = coll.new_directory("docs")?;
    let guide = coll.new_file("guide.txt")?;
    let empty = coll.new_file("empty.txt")?;
    coll.add_child(root, docs)?;
    coll.add_child(docs, guide)?;
    coll.add_child(root, empty)?;

    coll.set_checksum(guide, "SHA1:ABCDEF")?;
    coll.set_size(guide, 42)?;
    coll.set_description(guide, "How to use it")?;
    coll.mark_file_dirty(guide, false)?;
    coll.add_package(guide, Package::new("guide", Some("2.1")))?;
    coll.add_package(guide, Package::new("docs", None))?;
    coll.add_dependency(guide, Dependency::new("viewer", Some("1.0"), Some("3")))?;
    coll.add_dependency(guide, Dependency::new("fonts", None, None))?;
    coll.save(true)?;

    let again = fixture.open()?;
    for name in ["/docs", "/docs/guide.txt", "/empty.txt"] {
        let before = coll.find(name).context("before")?;
        let after = again.find(name).context("after")?;
        assert_eq!(coll[before].is_file(), again[after].is_file());

        if let (Some(old), Some(new)) = (coll.file(before), again.file(after)) {
            assert_eq!(old.checksum(), new.checksum());
            assert_eq!(old.size(), new.size());
            assert_eq!(old.description(), new.description());
            assert_eq!(old.is_dirty(), new.is_dirty());
            assert_eq!(old.packages(), new.packages());
            assert_eq!(old.dependencies(), new.dependencies());
        }
    }

    assert!(fixture.root().join("collection.toml.bak").exists());
    Ok(())
}
