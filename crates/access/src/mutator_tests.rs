use super::*;

use std::{
    cell::Cell,
    fs::{read, write},
    io::{Read, Write},
    rc::Rc,
};

use pdfshelf_fs::JsonMediaIndex;

use crate::regime::FixedRegime;

const CONTENTS: &[u8] = b"%PDF-1.4 some pages";

fn fixture() -> (tempfile::TempDir, PdfRecord) {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("report.pdf");
    write(&path, CONTENTS).expect("write pdf");
    let record = PdfRecord::from_path(&path).expect("record");
    (tmp, record)
}

fn indexed_mutator(tmp: &tempfile::TempDir, record: &PdfRecord) -> FileMutator {
    let mut index = JsonMediaIndex::open(tmp.path().join("index.json")).expect("open index");
    index.insert_file(&record.path).expect("index record");
    FileMutator::new(FixedRegime(PermissionRegime::IndexedOnly)).with_index(index)
}

fn short_copy(reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    writer.write_all(&buf[..buf.len() - 1])?;
    Ok(buf.len() as u64 - 1)
}

/// A probe whose answer can be changed from the outside between calls.
#[derive(Clone)]
struct SwitchableProbe(Rc<Cell<PermissionRegime>>);

impl RegimeProbe for SwitchableProbe {
    fn current(&self) -> PermissionRegime {
        self.0.get()
    }
}

#[test]
fn normalize_new_name_cases() {
    let (_tmp, record) = fixture();

    let ok: &[(&str, &str)] = &[
        ("summary", "summary.pdf"),
        ("  summary  ", "summary.pdf"),
        ("summary.pdf", "summary.pdf"),
        ("summary.PDF", "summary.PDF"),
        ("v1.2", "v1.2.pdf"),
        ("report.pdf.old", "report.pdf.old.pdf"),
    ];
    for (input, expected) in ok {
        assert_eq!(
            normalize_new_name(&record, input).expect("valid name"),
            *expected,
            "{input:?}"
        );
    }

    let bad: &[&str] = &["", "   ", "a/b", r"a\b", ".", ".."];
    for input in bad {
        assert!(
            matches!(
                normalize_new_name(&record, input),
                Err(MutationError::InvalidName { .. })
            ),
            "{input:?} should be rejected"
        );
    }

    let too_long = "x".repeat(MAX_NAME_BYTES);
    assert!(matches!(
        normalize_new_name(&record, &too_long),
        Err(MutationError::InvalidName { .. })
    ));

    for same in ["report", "report.pdf", " report "] {
        assert!(
            matches!(
                normalize_new_name(&record, same),
                Err(MutationError::Unchanged)
            ),
            "{same:?} is the current name"
        );
    }
}

#[test]
fn upper_case_extension_keeps_its_stem_unchanged() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("foo.PDF");
    write(&path, CONTENTS).expect("write pdf");
    let record = PdfRecord::from_path(&path).expect("record");

    for same in ["foo", " foo ", "foo.PDF"] {
        assert!(
            matches!(
                normalize_new_name(&record, same),
                Err(MutationError::Unchanged)
            ),
            "{same:?} is the current name"
        );
    }

    // Spelling the extension differently is a real rename.
    assert_eq!(
        normalize_new_name(&record, "foo.pdf").expect("case change"),
        "foo.pdf"
    );
    assert_eq!(normalize_new_name(&record, "Foo").expect("stem change"), "Foo.pdf");
}

#[test]
fn normalize_new_name_handles_multibyte_input() {
    let (_tmp, record) = fixture();
    assert_eq!(
        normalize_new_name(&record, "tài liệu").expect("valid"),
        "tài liệu.pdf"
    );
    assert_eq!(normalize_new_name(&record, "ệ").expect("valid"), "ệ.pdf");
}

#[test]
fn rename_in_every_regime_produces_fresh_record() {
    for regime in PermissionRegime::ALL {
        let (tmp, record) = fixture();
        let mut mutator = match regime {
            PermissionRegime::IndexedOnly => indexed_mutator(&tmp, &record),
            _ => FileMutator::new(FixedRegime(regime)),
        };

        let renamed = mutator
            .rename(&record, "summary")
            .unwrap_or_else(|e| panic!("rename under {regime}: {e}"));

        assert_eq!(renamed.path, tmp.path().join("summary.pdf"), "{regime}");
        assert_eq!(renamed.name, "summary.pdf");
        assert_eq!(renamed.size, CONTENTS.len() as u64);
        assert!(!record.path.exists(), "{regime}: original should be gone");
        assert_eq!(read(&renamed.path).unwrap(), CONTENTS);
    }
}

#[test]
fn rename_onto_existing_file_is_rejected_in_every_regime() {
    for regime in PermissionRegime::ALL {
        let (tmp, record) = fixture();
        let other = tmp.path().join("taken.pdf");
        write(&other, b"other file").expect("write other");

        let mut mutator = match regime {
            PermissionRegime::IndexedOnly => indexed_mutator(&tmp, &record),
            _ => FileMutator::new(FixedRegime(regime)),
        };

        let err = mutator
            .rename(&record, "taken")
            .expect_err("collision");

        assert!(
            matches!(err, MutationError::NameCollision { ref path } if *path == other),
            "{regime}: {err:?}"
        );
        assert_eq!(read(&record.path).unwrap(), CONTENTS, "{regime}");
        assert_eq!(read(&other).unwrap(), b"other file", "{regime}");
    }
}

#[test]
fn rename_of_vanished_file_is_not_found() {
    let (_tmp, record) = fixture();
    fs::remove_file(&record.path).expect("remove");

    let err = FileMutator::new(FixedRegime(PermissionRegime::FullAccess))
        .rename(&record, "summary")
        .expect_err("source missing");

    assert!(matches!(err, MutationError::NotFound { .. }), "{err:?}");
    assert!(err.is_user_error());
}

#[test]
fn legacy_rename_with_short_copy_leaves_original_intact() {
    let (tmp, record) = fixture();
    let mut mutator =
        FileMutator::new(FixedRegime(PermissionRegime::Legacy)).with_copy(short_copy);

    let err = mutator.rename(&record, "summary").expect_err("short copy");

    assert!(matches!(err, MutationError::SizeMismatch { .. }), "{err:?}");
    assert!(!err.is_user_error());
    assert_eq!(read(&record.path).unwrap(), CONTENTS);
    assert!(!tmp.path().join("summary.pdf").exists());
}

#[test]
fn indexed_regime_without_index_fails_cleanly() {
    let (_tmp, record) = fixture();
    let mut mutator = FileMutator::new(FixedRegime(PermissionRegime::IndexedOnly));

    assert!(matches!(
        mutator.rename(&record, "summary"),
        Err(MutationError::IndexUnavailable)
    ));
    assert!(matches!(
        mutator.delete(&record),
        Err(MutationError::IndexUnavailable)
    ));
    assert!(record.path.exists());
}

#[test]
fn delete_in_every_regime_removes_the_file() {
    for regime in PermissionRegime::ALL {
        let (tmp, record) = fixture();
        let mut mutator = match regime {
            PermissionRegime::IndexedOnly => indexed_mutator(&tmp, &record),
            _ => FileMutator::new(FixedRegime(regime)),
        };

        mutator
            .delete(&record)
            .unwrap_or_else(|e| panic!("delete under {regime}: {e}"));
        assert!(!record.path.exists(), "{regime}");
    }
}

#[test]
fn delete_of_vanished_file_is_not_found() {
    let (_tmp, record) = fixture();
    fs::remove_file(&record.path).expect("remove");

    let err = FileMutator::new(FixedRegime(PermissionRegime::Legacy))
        .delete(&record)
        .expect_err("missing");
    assert!(matches!(err, MutationError::NotFound { .. }));
}

#[test]
fn regime_is_consulted_on_every_mutation() {
    let (tmp, record) = fixture();
    let switch = Rc::new(Cell::new(PermissionRegime::IndexedOnly));
    let mut mutator = FileMutator::new(SwitchableProbe(Rc::clone(&switch)));

    // No index configured: indexed access cannot work.
    assert!(matches!(
        mutator.rename(&record, "summary"),
        Err(MutationError::IndexUnavailable)
    ));

    // Access granted mid-session.
    switch.set(PermissionRegime::FullAccess);
    assert_eq!(mutator.regime(), PermissionRegime::FullAccess);
    let renamed = mutator.rename(&record, "summary").expect("rename");
    assert_eq!(renamed.path, tmp.path().join("summary.pdf"));
}

#[test]
fn mutator_exposes_its_index() {
    let (tmp, record) = fixture();
    let mutator = indexed_mutator(&tmp, &record);
    let index = mutator.index().expect("index configured");
    assert_eq!(index.find_id(&record.path), Some(1));

    assert!(
        FileMutator::new(FixedRegime(PermissionRegime::FullAccess))
            .index()
            .is_none()
    );
}
