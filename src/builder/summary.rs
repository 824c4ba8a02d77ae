//! Serializable snapshot of a builder chain, used for JSON dumps.

use serde::Serialize;

use crate::format::tiff::{ByteOrder, FieldType, TagIndex};

use super::ifd::IfdBuilder;
use super::tag::IfdBuilderTagValue;

/// Values longer than this are truncated in `value_hex`.
const MAX_PREVIEW_BYTES: usize = 32;

/// One IFD with its entries and the rest of its chain.
#[derive(Debug, Clone, Serialize)]
pub struct IfdSummary {
    pub name: String,
    pub tag_id: u16,
    pub byte_order: ByteOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_offset: Option<u32>,
    pub tags: Vec<TagSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<IfdSummary>>,
}

/// One entry: either a value preview or a nested IFD.
#[derive(Debug, Clone, Serialize)]
pub struct TagSummary {
    pub tag_id: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child: Option<IfdSummary>,
}

impl IfdBuilder {
    /// Snapshot this builder, its children and its chain.
    ///
    /// Tag names and missing field types are looked up in `index`.
    pub fn summary(&self, index: &TagIndex) -> IfdSummary {
        let tags = self
            .tags()
            .iter()
            .map(|tag| {
                let name = index
                    .tag_name(self.name(), tag.tag_id())
                    .map(str::to_string);

                match tag.value() {
                    IfdBuilderTagValue::Bytes(bytes) => {
                        let preview = &bytes[..bytes.len().min(MAX_PREVIEW_BYTES)];
                        let mut value_hex = hex::encode(preview);
                        if bytes.len() > MAX_PREVIEW_BYTES {
                            value_hex.push_str("...");
                        }

                        TagSummary {
                            tag_id: tag.tag_id(),
                            name,
                            field_type: tag
                                .field_type()
                                .or_else(|| index.field_type(self.name(), tag.tag_id())),
                            length: bytes.len(),
                            value_hex: Some(value_hex),
                            child: None,
                        }
                    }
                    IfdBuilderTagValue::IfdBuilder(child) => TagSummary {
                        tag_id: tag.tag_id(),
                        name,
                        field_type: Some(FieldType::Long),
                        length: child.tags().len(),
                        value_hex: None,
                        child: Some(child.summary_without_chain(index)),
                    },
                }
            })
            .collect();

        IfdSummary {
            name: self.name().to_string(),
            tag_id: self.tag_id(),
            byte_order: self.byte_order(),
            existing_offset: self.existing_offset(),
            tags,
            next: self.next_ifd().map(|next| Box::new(next.summary(index))),
        }
    }

    fn summary_without_chain(&self, index: &TagIndex) -> IfdSummary {
        let mut summary = self.summary(index);
        summary.next = None;
        summary
    }
}
