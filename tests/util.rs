use mp4ttml::util::{hex_dump, latin1_to_string};

#[test]
fn latin1_maps_every_byte_to_its_code_point() {
    assert_eq!(latin1_to_string(b"ABC"), "ABC");
    assert_eq!(latin1_to_string(&[0x41, 0xe9, 0xff]), "A\u{e9}\u{ff}");
    // not valid UTF-8, still one char per byte
    assert_eq!(latin1_to_string(&[0xc3, 0x28]).chars().count(), 2);
}

#[test]
fn hex_dump_shows_offset_hex_and_ascii() {
    let dump = hex_dump(&[0x10, 0x41], 16);
    assert!(dump.starts_with("00000010  10 41 "));
    assert!(dump.ends_with("|.A|\n"));
}

#[test]
fn hex_dump_splits_rows_of_sixteen() {
    let data = (0u8..20u8).collect::<Vec<_>>();
    let dump = hex_dump(&data, 0);
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("00000010  10 11 12 13 "));
}
