//! Tag and IFD registry.
//!
//! Maps `(ifd name, tag id)` to the tag's display name and expected field
//! type, and maps child IFD names to the tag id that points at them from
//! their parent. The encoder asks it for the type of entries that carry no
//! explicit type; the reader asks it which entries are child IFD pointers.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::tags::FieldType;

// =============================================================================
// IFD Names
// =============================================================================

/// Name of every top-level IFD in a chain (IFD0, IFD1, ...).
pub const IFD_STANDARD: &str = "IFD";

/// EXIF sub-IFD, pointed to from IFD0.
pub const IFD_EXIF: &str = "Exif";

/// GPS sub-IFD, pointed to from IFD0.
pub const IFD_GPS: &str = "GPSInfo";

/// Interoperability sub-IFD, pointed to from the EXIF IFD.
pub const IFD_IOP: &str = "Iop";

/// Tag ids of the standard child IFD pointers.
pub const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
pub const TAG_GPS_IFD_POINTER: u16 = 0x8825;
pub const TAG_IOP_IFD_POINTER: u16 = 0xA005;

/// Tags whose values are file offsets of image data stored outside the IFDs:
/// StripOffsets, TileOffsets and JPEGInterchangeFormat.
pub const IMAGE_DATA_OFFSET_TAGS: &[u16] = &[0x0111, 0x0144, 0x0201];

const STANDARD_CHILD_IFDS: &[(&str, &str, u16)] = &[
    (IFD_EXIF, IFD_STANDARD, TAG_EXIF_IFD_POINTER),
    (IFD_GPS, IFD_STANDARD, TAG_GPS_IFD_POINTER),
    (IFD_IOP, IFD_EXIF, TAG_IOP_IFD_POINTER),
];

const STANDARD_TAGS: &[(&str, u16, &str, FieldType)] = &[
    // -------------------------------------------------------------------------
    // IFD0 / IFD1
    // -------------------------------------------------------------------------
    (IFD_STANDARD, 0x0100, "ImageWidth", FieldType::Long),
    (IFD_STANDARD, 0x0101, "ImageLength", FieldType::Long),
    (IFD_STANDARD, 0x0102, "BitsPerSample", FieldType::Short),
    (IFD_STANDARD, 0x0103, "Compression", FieldType::Short),
    (IFD_STANDARD, 0x0106, "PhotometricInterpretation", FieldType::Short),
    (IFD_STANDARD, 0x010E, "ImageDescription", FieldType::Ascii),
    (IFD_STANDARD, 0x010F, "Make", FieldType::Ascii),
    (IFD_STANDARD, 0x0110, "Model", FieldType::Ascii),
    (IFD_STANDARD, 0x0112, "Orientation", FieldType::Short),
    (IFD_STANDARD, 0x0115, "SamplesPerPixel", FieldType::Short),
    (IFD_STANDARD, 0x011A, "XResolution", FieldType::Rational),
    (IFD_STANDARD, 0x011B, "YResolution", FieldType::Rational),
    (IFD_STANDARD, 0x0128, "ResolutionUnit", FieldType::Short),
    (IFD_STANDARD, 0x0131, "Software", FieldType::Ascii),
    (IFD_STANDARD, 0x0132, "DateTime", FieldType::Ascii),
    (IFD_STANDARD, 0x013B, "Artist", FieldType::Ascii),
    (IFD_STANDARD, 0x0201, "JPEGInterchangeFormat", FieldType::Long),
    (IFD_STANDARD, 0x0202, "JPEGInterchangeFormatLength", FieldType::Long),
    (IFD_STANDARD, 0x0213, "YCbCrPositioning", FieldType::Short),
    (IFD_STANDARD, 0x8298, "Copyright", FieldType::Ascii),
    (IFD_STANDARD, TAG_EXIF_IFD_POINTER, "ExifTag", FieldType::Long),
    (IFD_STANDARD, TAG_GPS_IFD_POINTER, "GPSTag", FieldType::Long),
    // -------------------------------------------------------------------------
    // EXIF
    // -------------------------------------------------------------------------
    (IFD_EXIF, 0x829A, "ExposureTime", FieldType::Rational),
    (IFD_EXIF, 0x829D, "FNumber", FieldType::Rational),
    (IFD_EXIF, 0x8822, "ExposureProgram", FieldType::Short),
    (IFD_EXIF, 0x8827, "ISOSpeedRatings", FieldType::Short),
    (IFD_EXIF, 0x9000, "ExifVersion", FieldType::Undefined),
    (IFD_EXIF, 0x9003, "DateTimeOriginal", FieldType::Ascii),
    (IFD_EXIF, 0x9004, "DateTimeDigitized", FieldType::Ascii),
    (IFD_EXIF, 0x9101, "ComponentsConfiguration", FieldType::Undefined),
    (IFD_EXIF, 0x9201, "ShutterSpeedValue", FieldType::SRational),
    (IFD_EXIF, 0x9202, "ApertureValue", FieldType::Rational),
    (IFD_EXIF, 0x9204, "ExposureBiasValue", FieldType::SRational),
    (IFD_EXIF, 0x9207, "MeteringMode", FieldType::Short),
    (IFD_EXIF, 0x9209, "Flash", FieldType::Short),
    (IFD_EXIF, 0x920A, "FocalLength", FieldType::Rational),
    (IFD_EXIF, 0x927C, "MakerNote", FieldType::Undefined),
    (IFD_EXIF, 0x9286, "UserComment", FieldType::Undefined),
    (IFD_EXIF, 0xA000, "FlashpixVersion", FieldType::Undefined),
    (IFD_EXIF, 0xA001, "ColorSpace", FieldType::Short),
    (IFD_EXIF, 0xA002, "PixelXDimension", FieldType::Long),
    (IFD_EXIF, 0xA003, "PixelYDimension", FieldType::Long),
    (IFD_EXIF, TAG_IOP_IFD_POINTER, "InteroperabilityTag", FieldType::Long),
    // -------------------------------------------------------------------------
    // GPS
    // -------------------------------------------------------------------------
    (IFD_GPS, 0x0000, "GPSVersionID", FieldType::Byte),
    (IFD_GPS, 0x0001, "GPSLatitudeRef", FieldType::Ascii),
    (IFD_GPS, 0x0002, "GPSLatitude", FieldType::Rational),
    (IFD_GPS, 0x0003, "GPSLongitudeRef", FieldType::Ascii),
    (IFD_GPS, 0x0004, "GPSLongitude", FieldType::Rational),
    (IFD_GPS, 0x0005, "GPSAltitudeRef", FieldType::Byte),
    (IFD_GPS, 0x0006, "GPSAltitude", FieldType::Rational),
    (IFD_GPS, 0x0007, "GPSTimeStamp", FieldType::Rational),
    (IFD_GPS, 0x001D, "GPSDateStamp", FieldType::Ascii),
    // -------------------------------------------------------------------------
    // Interoperability
    // -------------------------------------------------------------------------
    (IFD_IOP, 0x0001, "InteroperabilityIndex", FieldType::Ascii),
    (IFD_IOP, 0x0002, "InteroperabilityVersion", FieldType::Undefined),
];

// =============================================================================
// TagIndex
// =============================================================================

/// Registry entry for one tag within one IFD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedTag {
    pub ifd_name: String,
    pub tag_id: u16,
    pub name: String,
    pub field_type: FieldType,
}

/// Registry entry for a child IFD kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildIfdInfo {
    pub name: String,
    pub parent: String,
    pub tag_id: u16,
}

/// Lookup tables for tags and child IFDs.
///
/// [`TagIndex::standard`] is the shared, read-only instance covering the
/// common TIFF/EXIF/GPS tags. Custom indexes can be built with
/// [`TagIndex::new`] or [`TagIndex::empty`] and the `register_*` methods.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    tags: HashMap<String, HashMap<u16, IndexedTag>>,
    ifds: HashMap<String, ChildIfdInfo>,
}

impl TagIndex {
    /// An index with no tags and no child IFDs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An index populated with the standard tables.
    pub fn new() -> Self {
        let mut index = Self::empty();

        for &(ifd_name, tag_id, name, field_type) in STANDARD_TAGS {
            index.register_tag(ifd_name, tag_id, name, field_type);
        }
        for &(name, parent, tag_id) in STANDARD_CHILD_IFDS {
            index.register_ifd(name, parent, tag_id);
        }

        index
    }

    /// The process-wide standard index.
    pub fn standard() -> &'static TagIndex {
        static STANDARD: OnceLock<TagIndex> = OnceLock::new();
        STANDARD.get_or_init(TagIndex::new)
    }

    /// Add or replace a tag definition.
    pub fn register_tag(
        &mut self,
        ifd_name: &str,
        tag_id: u16,
        name: &str,
        field_type: FieldType,
    ) {
        self.tags.entry(ifd_name.to_string()).or_default().insert(
            tag_id,
            IndexedTag {
                ifd_name: ifd_name.to_string(),
                tag_id,
                name: name.to_string(),
                field_type,
            },
        );
    }

    /// Add or replace a child IFD kind reachable from `parent` via `tag_id`.
    pub fn register_ifd(&mut self, name: &str, parent: &str, tag_id: u16) {
        self.ifds.insert(
            name.to_string(),
            ChildIfdInfo {
                name: name.to_string(),
                parent: parent.to_string(),
                tag_id,
            },
        );
    }

    /// Look up a tag definition.
    pub fn get(&self, ifd_name: &str, tag_id: u16) -> Option<&IndexedTag> {
        self.tags.get(ifd_name)?.get(&tag_id)
    }

    /// Expected field type of a tag.
    pub fn field_type(&self, ifd_name: &str, tag_id: u16) -> Option<FieldType> {
        self.get(ifd_name, tag_id).map(|tag| tag.field_type)
    }

    /// Display name of a tag.
    pub fn tag_name(&self, ifd_name: &str, tag_id: u16) -> Option<&str> {
        self.get(ifd_name, tag_id).map(|tag| tag.name.as_str())
    }

    /// Tag id that points at IFDs named `ifd_name`, if it is a child kind.
    pub fn ifd_tag_id(&self, ifd_name: &str) -> Option<u16> {
        self.ifds.get(ifd_name).map(|info| info.tag_id)
    }

    /// Name of the child IFD that `tag_id` points to inside `parent`.
    pub fn child_ifd_name(&self, parent: &str, tag_id: u16) -> Option<&str> {
        self.ifds
            .values()
            .find(|info| info.parent == parent && info.tag_id == tag_id)
            .map(|info| info.name.as_str())
    }

    /// Whether `tag_id` is a registered child IFD pointer under `parent`.
    pub fn is_child_ifd_tag(&self, parent: &str, tag_id: u16) -> bool {
        self.child_ifd_name(parent, tag_id).is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
