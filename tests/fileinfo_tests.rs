use std::time::{Duration, SystemTime, UNIX_EPOCH};

use file_pipeline::fileinfo::{iso_timestamp, FileInfo};

fn at(secs: u64, micros: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs) + Duration::from_micros(micros)
}

#[test]
fn whole_second_timestamps_have_no_fraction() {
    let stamp = iso_timestamp(at(1_700_000_000, 0));
    assert_eq!(stamp.len(), "2023-11-14T22:13:20".len(), "{stamp}");
    assert!(!stamp.contains('.'), "{stamp}");
}

#[test]
fn sub_second_timestamps_keep_six_digits() {
    let stamp = iso_timestamp(at(1_700_000_000, 250));
    assert!(stamp.ends_with(".000250"), "{stamp}");

    let stamp = iso_timestamp(at(1_700_000_000, 123_456) + Duration::from_nanos(789));
    assert!(stamp.ends_with(".123456"), "{stamp}");
}

#[test]
fn sub_microsecond_remainder_counts_as_whole_second() {
    let stamp = iso_timestamp(at(1_700_000_000, 0) + Duration::from_nanos(999));
    assert!(!stamp.contains('.'), "{stamp}");
}

#[test]
fn file_info_reports_size_and_canonical_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("note.txt");
    std::fs::write(&path, "hello").unwrap();

    let info = FileInfo::from_path(&path).unwrap();
    assert_eq!(info.file_name, "note.txt");
    assert_eq!(info.size, 5);
    assert_eq!(
        std::path::Path::new(&info.full_path),
        path.canonicalize().unwrap()
    );
    assert!(info.modified.contains('T'));
}
