use super::*;

use std::{
    fs::{read, write},
    io::{self, Read, Write},
};

use pdfshelf_access::{FixedRegime, PermissionRegime};

use crate::sort::SortOrder;

fn shelf_with(names: &[&str], regime: PermissionRegime) -> (tempfile::TempDir, Shelf) {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let records = names
        .iter()
        .map(|name| {
            let path = tmp.path().join(name);
            write(&path, name.as_bytes()).expect("write pdf");
            PdfRecord::from_path(&path).expect("record")
        })
        .collect();

    let mut library = Library::new(SortOrder::NameAsc);
    library.replace_all(records);
    let shelf = Shelf::new(library, FileMutator::new(FixedRegime(regime)));
    (tmp, shelf)
}

fn listed(shelf: &Shelf) -> Vec<&str> {
    shelf
        .library()
        .records()
        .iter()
        .map(|r| r.name.as_str())
        .collect()
}

fn short_copy(reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    writer.write_all(&buf[..buf.len() / 2])?;
    Ok((buf.len() / 2) as u64)
}

#[test]
fn rename_replaces_the_record_in_place() {
    let (tmp, mut shelf) = shelf_with(&["a.pdf", "b.pdf", "c.pdf"], PermissionRegime::FullAccess);

    let renamed = shelf
        .rename(&tmp.path().join("b.pdf"), "zz")
        .expect("rename");

    assert_eq!(renamed.path, tmp.path().join("zz.pdf"));
    assert_eq!(listed(&shelf), vec!["a.pdf", "zz.pdf", "c.pdf"]);
    assert!(shelf.library().get(&tmp.path().join("b.pdf")).is_none());

    // The next sort change puts it where it belongs.
    shelf.library_mut().set_sort(SortOrder::NameAsc);
    assert_eq!(listed(&shelf), vec!["a.pdf", "c.pdf", "zz.pdf"]);
}

#[test]
fn delete_removes_exactly_one_entry() {
    let (tmp, mut shelf) = shelf_with(&["a.pdf", "b.pdf", "c.pdf"], PermissionRegime::Legacy);
    let target = tmp.path().join("a.pdf");

    let removed = shelf.delete(&target).expect("delete");

    assert_eq!(removed.path, target);
    assert!(!target.exists());
    assert_eq!(listed(&shelf), vec!["b.pdf", "c.pdf"]);
}

#[test]
fn unknown_path_is_reported_without_touching_anything() {
    let (tmp, mut shelf) = shelf_with(&["a.pdf"], PermissionRegime::FullAccess);
    let stray = tmp.path().join("stray.pdf");
    write(&stray, b"not listed").expect("write stray");

    for err in [
        shelf.rename(&stray, "other").expect_err("unknown"),
        shelf.delete(&stray).expect_err("unknown"),
    ] {
        assert!(
            matches!(err, ShelfError::UnknownRecord { ref path } if *path == stray),
            "{err:?}"
        );
        assert!(err.is_user_error());
    }

    assert!(stray.exists());
    assert_eq!(listed(&shelf), vec!["a.pdf"]);
}

#[test]
fn failed_rename_leaves_list_and_files_alone() {
    let (tmp, mut shelf) = shelf_with(&["a.pdf", "b.pdf"], PermissionRegime::FullAccess);

    let err = shelf
        .rename(&tmp.path().join("a.pdf"), "b")
        .expect_err("collision");

    assert!(
        matches!(err, ShelfError::Mutation(MutationError::NameCollision { .. })),
        "{err:?}"
    );
    assert!(err.is_user_error());
    assert_eq!(listed(&shelf), vec!["a.pdf", "b.pdf"]);
    assert_eq!(read(tmp.path().join("a.pdf")).unwrap(), b"a.pdf");
    assert_eq!(read(tmp.path().join("b.pdf")).unwrap(), b"b.pdf");
}

#[test]
fn failed_legacy_copy_keeps_the_record() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("scan.pdf");
    write(&path, b"%PDF-1.7 twelve bytes or so").expect("write pdf");

    let mut library = Library::default();
    library.replace_all(vec![PdfRecord::from_path(&path).expect("record")]);
    let mutator = FileMutator::new(FixedRegime(PermissionRegime::Legacy)).with_copy(short_copy);
    let mut shelf = Shelf::new(library, mutator);

    let err = shelf.rename(&path, "renamed").expect_err("short copy");

    assert!(!err.is_user_error(), "{err:?}");
    assert_eq!(listed(&shelf), vec!["scan.pdf"]);
    assert!(path.exists());
    assert!(!tmp.path().join("renamed.pdf").exists());
}

#[test]
fn vanished_file_is_not_found_and_stays_listed() {
    let (tmp, mut shelf) = shelf_with(&["a.pdf"], PermissionRegime::FullAccess);
    let path = tmp.path().join("a.pdf");
    std::fs::remove_file(&path).expect("remove behind the shelf's back");

    let err = shelf.delete(&path).expect_err("missing");
    assert!(
        matches!(err, ShelfError::Mutation(MutationError::NotFound { .. })),
        "{err:?}"
    );
    assert_eq!(shelf.library().len(), 1);
}

#[test]
fn replace_records_keeps_sort_and_query() {
    let (tmp, mut shelf) = shelf_with(&["a.pdf"], PermissionRegime::FullAccess);
    shelf.library_mut().set_sort(SortOrder::NameDesc);
    shelf.library_mut().set_query("b");

    let fresh = ["a.pdf", "b1.pdf", "b2.pdf"]
        .iter()
        .map(|name| PdfRecord {
            path: tmp.path().join(name),
            name: (*name).to_owned(),
            size: 1,
            modified_ms: 1,
        })
        .collect();
    shelf.replace_records(fresh);

    assert_eq!(shelf.library().sort_order(), SortOrder::NameDesc);
    let visible: Vec<_> = shelf
        .library()
        .visible()
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(visible, vec!["b2.pdf", "b1.pdf"]);
}
