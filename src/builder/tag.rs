//! Tag entries of an IFD under construction.

use std::fmt;

use bytes::Bytes;

use crate::error::BuilderError;
use crate::format::tiff::FieldType;

use super::ifd::IfdBuilder;

/// Number of value bytes shown by `Display` before eliding the rest.
const DISPLAY_PREVIEW_BYTES: usize = 8;

// =============================================================================
// IfdBuilderTagValue
// =============================================================================

/// Value of a builder tag: either encoded value bytes or a child IFD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IfdBuilderTagValue {
    /// Value bytes in the directory's byte order
    Bytes(Bytes),

    /// A nested IFD
    IfdBuilder(Box<IfdBuilder>),
}

impl IfdBuilderTagValue {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        IfdBuilderTagValue::Bytes(bytes.into())
    }

    pub fn from_ifd_builder(ib: IfdBuilder) -> Self {
        IfdBuilderTagValue::IfdBuilder(Box::new(ib))
    }

    #[inline]
    pub fn is_bytes(&self) -> bool {
        matches!(self, IfdBuilderTagValue::Bytes(_))
    }

    #[inline]
    pub fn is_ifd_builder(&self) -> bool {
        matches!(self, IfdBuilderTagValue::IfdBuilder(_))
    }

    /// The value bytes.
    ///
    /// # Errors
    /// `InvalidValueUnion` if this value is a child IFD.
    pub fn bytes(&self) -> Result<&Bytes, BuilderError> {
        match self {
            IfdBuilderTagValue::Bytes(bytes) => Ok(bytes),
            IfdBuilderTagValue::IfdBuilder(_) => Err(BuilderError::InvalidValueUnion(
                "this tag is not a byte-slice value".to_string(),
            )),
        }
    }

    /// The child IFD builder.
    ///
    /// # Errors
    /// `InvalidValueUnion` if this value holds bytes.
    pub fn ifd_builder(&self) -> Result<&IfdBuilder, BuilderError> {
        match self {
            IfdBuilderTagValue::IfdBuilder(ib) => Ok(ib),
            IfdBuilderTagValue::Bytes(_) => Err(BuilderError::InvalidValueUnion(
                "this tag is not an IFD-builder value".to_string(),
            )),
        }
    }

    /// Mutable access to the child IFD builder.
    pub fn ifd_builder_mut(&mut self) -> Result<&mut IfdBuilder, BuilderError> {
        match self {
            IfdBuilderTagValue::IfdBuilder(ib) => Ok(ib),
            IfdBuilderTagValue::Bytes(_) => Err(BuilderError::InvalidValueUnion(
                "this tag is not an IFD-builder value".to_string(),
            )),
        }
    }
}

// =============================================================================
// BuilderTag
// =============================================================================

/// One row of an IFD under construction.
///
/// `child_ifd_name` is set exactly when the value is a nested builder; the
/// [`IfdBuilder`] mutation methods and the encoder enforce that pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderTag {
    child_ifd_name: Option<String>,
    tag_id: u16,
    value: IfdBuilderTagValue,
    field_type: Option<FieldType>,
}

impl BuilderTag {
    /// Create a tag from its parts without checking them.
    pub fn new(child_ifd_name: Option<String>, tag_id: u16, value: IfdBuilderTagValue) -> Self {
        Self {
            child_ifd_name,
            tag_id,
            value,
            field_type: None,
        }
    }

    /// Create a plain value tag.
    pub fn from_bytes(tag_id: u16, bytes: impl Into<Bytes>) -> Self {
        Self::new(None, tag_id, IfdBuilderTagValue::from_bytes(bytes))
    }

    /// Pin the field type used when encoding, instead of the registry's.
    pub fn with_field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    #[inline]
    pub fn tag_id(&self) -> u16 {
        self.tag_id
    }

    #[inline]
    pub fn child_ifd_name(&self) -> Option<&str> {
        self.child_ifd_name.as_deref()
    }

    #[inline]
    pub fn is_child_ifd(&self) -> bool {
        self.child_ifd_name.is_some()
    }

    #[inline]
    pub fn value(&self) -> &IfdBuilderTagValue {
        &self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut IfdBuilderTagValue {
        &mut self.value
    }

    /// Explicit field type, if one was set.
    #[inline]
    pub fn field_type(&self) -> Option<FieldType> {
        self.field_type
    }
}

impl fmt::Display for BuilderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BuilderTag<TAG-ID=(0x{:04x}) IFD=[{}] VALUE=[",
            self.tag_id,
            self.child_ifd_name.as_deref().unwrap_or("")
        )?;

        match &self.value {
            IfdBuilderTagValue::Bytes(bytes) if bytes.len() <= DISPLAY_PREVIEW_BYTES => {
                write!(f, "{}", hex::encode(bytes))?
            }
            IfdBuilderTagValue::Bytes(bytes) => {
                write!(f, "{}...", hex::encode(&bytes[..DISPLAY_PREVIEW_BYTES]))?
            }
            IfdBuilderTagValue::IfdBuilder(ib) => write!(f, "{}", ib)?,
        }

        f.write_str("]>")
    }
}

// =============================================================================
// Tests
// =============================================================================
