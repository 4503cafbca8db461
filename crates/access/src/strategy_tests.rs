use super::*;

use std::{
    fs::{read, write},
    path::PathBuf,
};

use pdfshelf_fs::JsonMediaIndex;

/// Copies only the first half of the source.
fn short_copy(reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let half = &buf[..buf.len() / 2];
    writer.write_all(half)?;
    Ok(half.len() as u64)
}

/// Writes a few bytes and then fails.
fn failing_copy(_reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64> {
    writer.write_all(b"%PDF")?;
    Err(io::Error::other("disk full"))
}

fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let src = tmp.path().join("report.pdf");
    let dst = tmp.path().join("summary.pdf");
    write(&src, b"%PDF-1.7 original contents").expect("write src");
    (tmp, src, dst)
}

#[test]
fn direct_rename_and_delete() {
    let (_tmp, src, dst) = fixture();
    let mut access = DirectAccess;

    access.rename(&src, &dst).expect("rename");
    assert!(!src.exists());
    assert_eq!(read(&dst).unwrap(), b"%PDF-1.7 original contents");

    access.delete(&dst).expect("delete");
    assert!(!dst.exists());
}

#[test]
fn direct_delete_of_missing_file_is_io_error() {
    let (_tmp, _src, dst) = fixture();
    let err = DirectAccess.delete(&dst).expect_err("missing file");
    assert!(matches!(err, MutationError::Io { op: "delete", .. }), "{err:?}");
}

#[test]
fn legacy_rename_copies_then_removes_original() {
    let (_tmp, src, dst) = fixture();

    LegacyAccess::default().rename(&src, &dst).expect("rename");

    assert!(!src.exists());
    assert_eq!(read(&dst).unwrap(), b"%PDF-1.7 original contents");
}

#[test]
fn legacy_rename_with_short_copy_keeps_original_and_removes_partial() {
    let (_tmp, src, dst) = fixture();

    let err = LegacyAccess::new(short_copy)
        .rename(&src, &dst)
        .expect_err("short copy must fail");

    match err {
        MutationError::SizeMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, 26);
            assert_eq!(actual, 13);
        }
        other => panic!("expected SizeMismatch, got {other:?}"),
    }
    assert_eq!(read(&src).unwrap(), b"%PDF-1.7 original contents");
    assert!(!dst.exists(), "partial copy should be removed");
}

#[test]
fn legacy_rename_with_copy_error_keeps_original_and_removes_partial() {
    let (_tmp, src, dst) = fixture();

    let err = LegacyAccess::new(failing_copy)
        .rename(&src, &dst)
        .expect_err("copy error must fail");

    assert!(matches!(err, MutationError::Io { op: "copy", .. }), "{err:?}");
    assert!(src.exists());
    assert!(!dst.exists());
}

#[test]
fn legacy_rename_never_overwrites_existing_destination() {
    let (_tmp, src, dst) = fixture();
    write(&dst, b"someone else's file").expect("write dst");

    let err = LegacyAccess::default()
        .rename(&src, &dst)
        .expect_err("destination exists");

    assert!(matches!(err, MutationError::NameCollision { .. }), "{err:?}");
    assert_eq!(read(&src).unwrap(), b"%PDF-1.7 original contents");
    assert_eq!(read(&dst).unwrap(), b"someone else's file");
}

#[test]
fn indexed_rename_updates_entry_then_file() {
    let (tmp, src, dst) = fixture();
    let mut index = JsonMediaIndex::open(tmp.path().join("index.json")).expect("open index");
    let id = index.insert_file(&src).expect("index src");

    IndexedAccess::new(&mut index)
        .rename(&src, &dst)
        .expect("rename");

    assert!(!src.exists());
    assert!(dst.exists());
    assert_eq!(index.find_id(&dst), Some(id));
    assert_eq!(index.entries()[0].display_name, "summary.pdf");
}

#[test]
fn indexed_rename_finds_entry_through_a_roundabout_path() {
    let (tmp, src, dst) = fixture();
    std::fs::create_dir(tmp.path().join("sub")).expect("create sub");
    let mut index = JsonMediaIndex::open(tmp.path().join("index.json")).expect("open index");
    let id = index.insert_file(&src).expect("index src");

    let roundabout = tmp.path().join("sub/../report.pdf");
    IndexedAccess::new(&mut index)
        .rename(&roundabout, &dst)
        .expect("rename via ..");

    assert!(!src.exists());
    assert!(dst.exists());
    assert_eq!(index.find_id(&dst), Some(id));
}

#[test]
fn indexed_rename_without_entry_touches_nothing() {
    let (tmp, src, dst) = fixture();
    let mut index = JsonMediaIndex::open(tmp.path().join("index.json")).expect("open index");

    let err = IndexedAccess::new(&mut index)
        .rename(&src, &dst)
        .expect_err("no entry");

    assert!(matches!(err, MutationError::IndexEntryMissing { .. }), "{err:?}");
    assert!(src.exists());
    assert!(!dst.exists());
}

#[test]
fn indexed_rename_rolls_back_entry_when_file_rename_fails() {
    let (tmp, src, _dst) = fixture();
    let mut index = JsonMediaIndex::open(tmp.path().join("index.json")).expect("open index");
    let id = index.insert_file(&src).expect("index src");

    // The destination directory does not exist, so the file rename fails.
    let dst = tmp.path().join("missing-dir").join("summary.pdf");
    let err = IndexedAccess::new(&mut index)
        .rename(&src, &dst)
        .expect_err("rename into missing dir");

    assert!(matches!(err, MutationError::Io { op: "rename", .. }), "{err:?}");
    assert!(src.exists());
    assert_eq!(index.find_id(&src), Some(id), "entry should point back at src");
    assert_eq!(index.entries()[0].display_name, "report.pdf");
}

#[test]
fn indexed_delete_removes_entry_and_file() {
    let (tmp, src, _dst) = fixture();
    let mut index = JsonMediaIndex::open(tmp.path().join("index.json")).expect("open index");
    index.insert_file(&src).expect("index src");

    IndexedAccess::new(&mut index).delete(&src).expect("delete");

    assert!(!src.exists());
    assert!(index.is_empty());
}

#[test]
fn indexed_delete_without_entry_keeps_file() {
    let (tmp, src, _dst) = fixture();
    let mut index = JsonMediaIndex::open(tmp.path().join("index.json")).expect("open index");

    let err = IndexedAccess::new(&mut index)
        .delete(&src)
        .expect_err("no entry");

    assert!(matches!(err, MutationError::IndexEntryMissing { .. }));
    assert!(src.exists());
}
