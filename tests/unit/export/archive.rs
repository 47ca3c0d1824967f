use std::io::Read;

use super::*;

fn read_back(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut file = zip.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), data)
        })
        .collect()
}

#[test]
fn entry_names_are_indexed_and_sanitized() {
    assert_eq!(entry_name(0, "beach", "jpg"), "001_beach.jpg");
    assert_eq!(entry_name(41, "a/b:c", "png"), "042_a_b_c.png");
    assert_eq!(entry_name(1234, "x", "jpg"), "1235_x.jpg");
    assert_eq!(entry_name(2, " .. ", "jpg"), "003_photo.jpg");
}

#[test]
fn archive_round_trips_entries_in_order() {
    let mut w = ArchiveWriter::new();
    assert!(w.is_empty());
    w.add_entry(0, "one", "jpg", b"first").unwrap();
    w.add_entry(1, "two", "png", b"second").unwrap();
    assert_eq!(w.len(), 2);
    let entries = read_back(w.finish().unwrap());
    assert_eq!(
        entries,
        vec![
            ("001_one.jpg".to_string(), b"first".to_vec()),
            ("002_two.png".to_string(), b"second".to_vec()),
        ]
    );
}

#[test]
fn clashing_names_get_suffixes() {
    let mut w = ArchiveWriter::new();
    let a = w.add_entry(0, "same", "jpg", b"a").unwrap();
    let b = w.add_entry(0, "same", "jpg", b"b").unwrap();
    let c = w.add_entry(0, "same", "jpg", b"c").unwrap();
    assert_eq!([a.as_str(), b.as_str(), c.as_str()], ["001_same.jpg", "001_same_2.jpg", "001_same_3.jpg"]);
    assert_eq!(read_back(w.finish().unwrap()).len(), 3);
}

#[test]
fn empty_archive_is_still_valid() {
    let bytes = ArchiveWriter::new().finish().unwrap();
    assert!(read_back(bytes).is_empty());
}
