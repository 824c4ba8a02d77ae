//! Importing hand-written streams into builders.

use bytes::Bytes;

use ifd_builder::{
    import_chain, parse_ifd_chain, ByteOrder, FieldType, IfdBuilder, IfdByteEncoder,
    IfdTagEntryValueResolver, TagIndex, ValueError, IFD_EXIF, IFD_IOP, IFD_STANDARD,
};

use super::test_utils::{
    read_chain, read_child, read_value, write_tiff, ByteOrderType, RawIfd, CHILD_POINTER_TAGS,
};

// =============================================================================
// Fixtures
// =============================================================================

fn le_short(value: u16) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

/// IFD0 { Make, Orientation, unknown-type tag, Exif { ExifVersion, DateTimeOriginal } }
/// followed by IFD1 { Compression }.
fn sample_stream() -> Vec<u8> {
    let exif = RawIfd::new()
        .entry(0x9000, 7, b"0230".to_vec())
        .entry(0x9003, 2, b"2023:12:24 18:30:00\0".to_vec());

    let ifd0 = RawIfd::new()
        .entry(0x010F, 2, b"FUJIFILM\0".to_vec())
        .entry(0x0112, 3, le_short(8))
        .raw_entry(0xC0DE, 99, 1, vec![1, 2, 3, 4])
        .child(0x8769, exif);

    let ifd1 = RawIfd::new().entry(0x0103, 3, le_short(6));

    write_tiff(ByteOrderType::LittleEndian, &[ifd0, ifd1])
}

fn import(data: &[u8]) -> ifd_builder::ImportReport {
    let root = parse_ifd_chain(data, TagIndex::standard()).unwrap();
    IfdBuilder::from_existing_chain(&root, Bytes::copy_from_slice(data)).unwrap()
}

// =============================================================================
// Shape
// =============================================================================

#[test]
fn test_import_reconstructs_shape() {
    let report = import(&sample_stream());
    let root = &report.root;

    assert_eq!(root.name(), IFD_STANDARD);
    assert_eq!(root.byte_order(), ByteOrder::LittleEndian);
    // Make, Orientation and the Exif pointer; the unknown tag is gone
    assert_eq!(root.tags().len(), 3);
    assert!(root.find(0xC0DE).is_err());

    let exif = root.child_with_tag_id(0x8769).unwrap();
    assert_eq!(exif.name(), IFD_EXIF);
    assert_eq!(exif.tag_id(), 0x8769);
    assert_eq!(exif.tags().len(), 2);

    let ifd1 = root.next_ifd().unwrap();
    assert_eq!(ifd1.tags().len(), 1);
    assert_eq!(ifd1.tags()[0].tag_id(), 0x0103);
    assert!(ifd1.next_ifd().is_none());
}

#[test]
fn test_import_reports_unknown_type() {
    let report = import(&sample_stream());

    assert_eq!(report.skipped.len(), 1);
    let skipped = &report.skipped[0];
    assert_eq!(skipped.ifd_name, IFD_STANDARD);
    assert_eq!(skipped.tag_id, 0xC0DE);
    assert_eq!(skipped.field_type_raw, 99);
    assert_eq!(skipped.reason, ValueError::UnresolvedType(99));
}

#[test]
fn test_import_resolves_values_and_types() {
    let report = import(&sample_stream());
    let root = &report.root;

    let make = &root.tags()[root.find(0x010F).unwrap()];
    assert_eq!(&make.value().bytes().unwrap()[..], b"FUJIFILM\0");
    assert_eq!(make.field_type(), Some(FieldType::Ascii));

    let orientation = &root.tags()[root.find(0x0112).unwrap()];
    assert_eq!(&orientation.value().bytes().unwrap()[..], &[8, 0]);

    let exif = root.child_with_tag_id(0x8769).unwrap();
    let version = &exif.tags()[exif.find(0x9000).unwrap()];
    assert_eq!(&version.value().bytes().unwrap()[..], b"0230");
    assert_eq!(version.field_type(), Some(FieldType::Undefined));
}

#[test]
fn test_import_records_existing_offsets() {
    let data = sample_stream();
    let parsed = parse_ifd_chain(&data, TagIndex::standard()).unwrap();
    let report = IfdBuilder::from_existing_chain(&parsed, Bytes::from(data)).unwrap();

    assert_eq!(report.root.existing_offset(), Some(parsed.offset));

    let exif = report.root.child_with_tag_id(0x8769).unwrap();
    assert_eq!(
        exif.existing_offset(),
        Some(parsed.child(IFD_EXIF).unwrap().offset)
    );

    let ifd1 = report.root.next_ifd().unwrap();
    assert_eq!(
        ifd1.existing_offset(),
        parsed.next.as_ref().map(|next| next.offset)
    );
}

#[test]
fn test_import_nested_children() {
    let iop = RawIfd::new().entry(0x0001, 2, b"R03\0".to_vec());
    let exif = RawIfd::new()
        .entry(0xA001, 3, le_short(1))
        .child(0xA005, iop);
    let gps = RawIfd::new().entry(0x0001, 2, b"S\0".to_vec());
    let ifd0 = RawIfd::new()
        .entry(0x0112, 3, le_short(1))
        .child(0x8769, exif)
        .child(0x8825, gps);

    let data = write_tiff(ByteOrderType::LittleEndian, &[ifd0]);
    let report = import(&data);
    assert!(report.skipped.is_empty());

    let exif = report.root.child_with_tag_id(0x8769).unwrap();
    let iop = exif.child_with_tag_id(0xA005).unwrap();
    assert_eq!(iop.name(), IFD_IOP);
    assert_eq!(&iop.tags()[0].value().bytes().unwrap()[..], b"R03\0");

    let gps = report.root.child_with_tag_id(0x8825).unwrap();
    assert_eq!(&gps.tags()[0].value().bytes().unwrap()[..], b"S\0");
}

#[test]
fn test_import_with_custom_resolver() {
    let data = sample_stream();
    let root = parse_ifd_chain(&data, TagIndex::standard()).unwrap();
    let resolver =
        IfdTagEntryValueResolver::new(Bytes::from(data), ByteOrder::LittleEndian);

    let report = import_chain(&root, &resolver).unwrap();
    assert_eq!(report.root.chain().count(), 2);
}

#[test]
fn test_add_tags_from_existing_with_filters() {
    let data = sample_stream();
    let root = parse_ifd_chain(&data, TagIndex::standard()).unwrap();
    let resolver = IfdTagEntryValueResolver::new(Bytes::from(data), root.byte_order);

    let mut ib = IfdBuilder::new_with_existing_ifd(&root);
    let skipped = ib
        .add_tags_from_existing(&root, Some(&resolver), &[0x010F, 0xC0DE], &[])
        .unwrap();

    assert_eq!(ib.tags().len(), 1);
    assert_eq!(ib.tags()[0].tag_id(), 0x010F);
    assert_eq!(skipped.len(), 1);
}

// =============================================================================
// Re-encoding foreign layouts
// =============================================================================

#[test]
fn test_reencode_foreign_layout_preserves_entries() {
    let source = sample_stream();
    let report = import(&source);
    let encoded = IfdByteEncoder::default()
        .encode_to_tiff(&report.root)
        .unwrap();

    // The layouts differ, the content does not
    assert_ne!(source, encoded);

    let (source_order, source_chain) = read_chain(&source);
    let (encoded_order, encoded_chain) = read_chain(&encoded);
    assert_eq!(source_chain.len(), encoded_chain.len());

    for (source_ifd, encoded_ifd) in source_chain.iter().zip(&encoded_chain) {
        let kept: Vec<u16> = source_ifd
            .tags()
            .into_iter()
            .filter(|&tag| tag != 0xC0DE)
            .collect();
        assert_eq!(encoded_ifd.tags(), kept);

        for tag in kept {
            let before = source_ifd.entry(tag);
            let after = encoded_ifd.entry(tag);
            assert_eq!((before.field_type, before.count), (after.field_type, after.count));

            if CHILD_POINTER_TAGS.contains(&tag) {
                let source_child = read_child(&source, source_order, before);
                let encoded_child = read_child(&encoded, encoded_order, after);
                assert_eq!(source_child.tags(), encoded_child.tags());
                for child_tag in source_child.tags() {
                    assert_eq!(
                        read_value(&source, source_order, source_child.entry(child_tag)),
                        read_value(&encoded, encoded_order, encoded_child.entry(child_tag))
                    );
                }
            } else {
                assert_eq!(
                    read_value(&source, source_order, before),
                    read_value(&encoded, encoded_order, after)
                );
            }
        }
    }
}

#[test]
fn test_import_big_endian_stream() {
    let ifd0 = RawIfd::new()
        .entry(0x010F, 2, b"NIKON CORPORATION\0".to_vec())
        .entry(0x011A, 5, [0, 0, 1, 44, 0, 0, 0, 1].to_vec())
        .entry(0x0112, 3, vec![0, 1]);

    let data = write_tiff(ByteOrderType::BigEndian, &[ifd0]);
    let report = import(&data);

    assert!(report.skipped.is_empty());
    assert_eq!(report.root.byte_order(), ByteOrder::BigEndian);

    let resolution = &report.root.tags()[report.root.find(0x011A).unwrap()];
    assert_eq!(
        &resolution.value().bytes().unwrap()[..],
        &[0, 0, 1, 44, 0, 0, 0, 1]
    );
}
