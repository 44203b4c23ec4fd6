use crate::shared::storage_header::{BinaryHeader, FileKind};
use std::io::Cursor;

#[test]
fn header_roundtrips_through_bytes() {
    let header = BinaryHeader::new(FileKind::SegmentData.magic(), 1, 0);
    let mut buf = Vec::new();
    header.write_to(&mut buf).unwrap();
    assert_eq!(buf.len(), BinaryHeader::TOTAL_LEN);

    let decoded = BinaryHeader::read_from(Cursor::new(&buf)).unwrap();
    assert_eq!(decoded, header);
}

#[test]
fn corrupted_header_fails_crc() {
    let header = BinaryHeader::new(FileKind::KeyFilter.magic(), 1, 0);
    let mut buf = Vec::new();
    header.write_to(&mut buf).unwrap();
    buf[3] ^= 0xFF;

    let err = BinaryHeader::read_from(Cursor::new(&buf)).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[test]
fn file_kinds_have_distinct_magics() {
    assert_ne!(FileKind::SegmentData.magic(), FileKind::KeyFilter.magic());
}
