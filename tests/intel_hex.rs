mod common;

use common::{contiguous_only, drain};
use hexrec::{
    ExportOptions, ImportError, ImportOptions, IntelHexExporter, IntelHexImporter,
    MAX_RECORD_DATA, Segment, parse_intel_hex, write_intel_hex,
};

fn lines(output: Vec<u8>) -> Vec<String> {
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_data_then_eof() {
    let input = ":0B0010006164647265737320676174A3\n:00000001FF\n";
    let mut imp = IntelHexImporter::intel_hex(input.as_bytes(), ImportOptions::default());
    let mut buf = [0u8; MAX_RECORD_DATA];

    let chunk = imp.get(&mut buf).unwrap();
    assert_eq!(chunk.address, 0x10);
    assert_eq!(&buf[..chunk.len], b"address gat");
    assert!(imp.get(&mut buf).is_none());
    assert!(imp.get(&mut buf).is_none());
    assert!(imp.error().is_none());
}

#[test]
fn test_noncontiguous() {
    let input = ":0400000001020304F2\n:02FFFE00AABB9C\n:00000001FF\n";
    let (chunks, error) = drain(IntelHexImporter::intel_hex(
        input.as_bytes(),
        ImportOptions::default(),
    ));
    assert!(error.is_none());
    assert_eq!(chunks[1], (0xFFFE, vec![0xAA, 0xBB]));

    let (chunks, error) = drain(IntelHexImporter::intel_hex(input.as_bytes(), contiguous_only()));
    assert_eq!(chunks.len(), 1);
    assert!(matches!(
        error,
        Some(ImportError::NonAdjoiningAddress {
            line: 2,
            expected: 4,
            actual: 0xFFFE
        })
    ));
}

#[test]
fn test_extended_addresses() {
    let input = ":020000040001F9\n\
                 :02000000CCDD55\n\
                 :020000021000EC\n\
                 :02000000CCDD55\n\
                 :00000001FF\n";
    let segments = parse_intel_hex(input.as_bytes(), ImportOptions::default()).unwrap();
    assert_eq!(
        segments,
        vec![
            Segment::new(0x1_0000, vec![0xCC, 0xDD]),
            Segment::new(0x1_0000, vec![0xCC, 0xDD]),
        ]
    );
}

#[test]
fn test_unknown_record_types_skipped() {
    let input = ":0400000300000000F9\n\
                 :0400000500000000F7\n\
                 :02000000CCDD55\n\
                 :00000001FF\n";
    let segments = parse_intel_hex(input.as_bytes(), ImportOptions::default()).unwrap();
    assert_eq!(segments, vec![Segment::new(0, vec![0xCC, 0xDD])]);
}

#[test]
fn test_short_colon_line_is_error() {
    let err = parse_intel_hex(b":0000\n:00000001FF\n", ImportOptions::default()).unwrap_err();
    assert!(matches!(err, ImportError::ShortRecord { line: 1 }));
}

#[test]
fn test_eof_without_data() {
    let err = parse_intel_hex(b":00000001FF\n", ImportOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "no data records found");
}

#[test]
fn test_missing_eof_keeps_data() {
    let (chunks, error) = drain(IntelHexImporter::intel_hex(
        &b":02000000CCDD55"[..],
        ImportOptions::default(),
    ));
    assert_eq!(chunks, vec![(0, vec![0xCC, 0xDD])]);
    let error = error.unwrap();
    assert!(error.is_warning());
    assert_eq!(error.to_string(), "no Intel hex EOF record found");
}

#[test]
fn test_export_fixtures() {
    let data: Vec<u8> = (0..16u8).map(|i| i * 0x11).collect();
    let output = write_intel_hex(
        &[Segment::new(0, data.clone())],
        ExportOptions {
            record_length: 16,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        lines(output),
        [":1000000000112233445566778899AABBCCDDEEFFF8", ":00000001FF"]
    );

    let mut exp = IntelHexExporter::intel_hex(
        Vec::new(),
        ExportOptions {
            record_length: 4,
            ..Default::default()
        },
    );
    exp.write_data(&data, None);
    assert_eq!(
        lines(exp.finish().unwrap()),
        [
            ":040000000011223396",
            ":040004004455667782",
            ":040008008899AABB6E",
            ":04000C00CCDDEEFF5A",
        ]
    );
}

#[test]
fn test_export_single_bytes() {
    let mut exp = IntelHexExporter::intel_hex(
        Vec::new(),
        ExportOptions {
            record_length: 1,
            ..Default::default()
        },
    );
    exp.write_data(&[0xCC, 0xCC, 0xCC], None);
    assert_eq!(
        lines(exp.finish().unwrap()),
        [":01000000CC33", ":01000100CC32", ":01000200CC31"]
    );
}

#[test]
fn test_export_crosses_bank() {
    let output = write_intel_hex(
        &[Segment::new(0xFFFE, vec![1, 2, 3, 4])],
        ExportOptions::default(),
    )
    .unwrap();
    assert_eq!(
        lines(output),
        [
            ":02FFFE000102FE",
            ":020000040001F9",
            ":020000000304F7",
            ":00000001FF",
        ]
    );
}
