//! Mutable model of one IFD and its chain.
//!
//! An [`IfdBuilder`] owns its tag entries (plain values and nested child
//! builders) and, through `next_ifd`, the rest of the top-level chain. All
//! structural checks happen in the mutation methods, so a failed call leaves
//! the builder as it was. The one exception is [`IfdBuilder::delete_n`],
//! which keeps the removals it made before running out of matches.

use std::fmt;

use bytes::Bytes;
use tracing::debug;

use crate::error::{BuilderError, ValueError};
use crate::format::tiff::{
    ByteOrder, Ifd, IfdEntry, TagIndex, ValueResolver, IMAGE_DATA_OFFSET_TAGS,
};

use super::import::SkippedTag;
use super::tag::{BuilderTag, IfdBuilderTagValue};

// =============================================================================
// IfdBuilder
// =============================================================================

/// One IFD under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdBuilder {
    name: String,
    tag_id: u16,
    byte_order: ByteOrder,
    tags: Vec<BuilderTag>,
    existing_offset: Option<u32>,
    next_ifd: Option<Box<IfdBuilder>>,
}

impl IfdBuilder {
    /// Create an empty builder.
    ///
    /// The own tag id is looked up in the standard registry and is 0 for
    /// names that are not child IFD kinds (such as the top-level `IFD`).
    pub fn new(name: impl Into<String>, byte_order: ByteOrder) -> Self {
        let name = name.into();
        let tag_id = TagIndex::standard().ifd_tag_id(&name).unwrap_or(0);
        Self::with_tag_id(name, tag_id, byte_order)
    }

    /// Create an empty builder with an explicit own tag id.
    pub fn with_tag_id(name: impl Into<String>, tag_id: u16, byte_order: ByteOrder) -> Self {
        Self {
            name: name.into(),
            tag_id,
            byte_order,
            tags: Vec::new(),
            existing_offset: None,
            next_ifd: None,
        }
    }

    /// Create an empty builder mirroring the identity of a parsed IFD.
    pub fn new_with_existing_ifd(ifd: &Ifd) -> Self {
        let mut ib = Self::with_tag_id(ifd.name.clone(), ifd.tag_id, ifd.byte_order);
        ib.existing_offset = Some(ifd.offset);
        ib
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tag_id(&self) -> u16 {
        self.tag_id
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Entries in emission order.
    #[inline]
    pub fn tags(&self) -> &[BuilderTag] {
        &self.tags
    }

    /// Offset of the IFD this builder was created from, if any.
    #[inline]
    pub fn existing_offset(&self) -> Option<u32> {
        self.existing_offset
    }

    #[inline]
    pub fn next_ifd(&self) -> Option<&IfdBuilder> {
        self.next_ifd.as_deref()
    }

    #[inline]
    pub fn next_ifd_mut(&mut self) -> Option<&mut IfdBuilder> {
        self.next_ifd.as_deref_mut()
    }

    /// Detach and return the rest of the chain.
    pub fn take_next_ifd(&mut self) -> Option<IfdBuilder> {
        self.next_ifd.take().map(|next| *next)
    }

    /// Link `next` after this IFD, replacing any previous link.
    pub fn set_next_ifd(&mut self, next: IfdBuilder) {
        self.next_ifd = Some(Box::new(next));
    }

    /// Iterate over this builder and every following builder in the chain.
    pub fn chain(&self) -> impl Iterator<Item = &IfdBuilder> {
        std::iter::successors(Some(self), |ib| ib.next_ifd())
    }

    // -------------------------------------------------------------------------
    // Adding
    // -------------------------------------------------------------------------

    /// Append a plain value entry.
    ///
    /// # Errors
    /// `InvalidValueUnion` if the tag holds a nested builder or names a
    /// child IFD. Use [`IfdBuilder::add_child_ifd`] for those.
    pub fn add(&mut self, tag: BuilderTag) -> Result<(), BuilderError> {
        if tag.value().is_ifd_builder() {
            return Err(BuilderError::InvalidValueUnion(
                "child IFDs must be added with add_child_ifd()".to_string(),
            ));
        }
        if let Some(child_name) = tag.child_ifd_name() {
            return Err(BuilderError::InvalidValueUnion(format!(
                "tag 0x{:04x} names child IFD [{}] but holds bytes",
                tag.tag_id(),
                child_name
            )));
        }

        self.tags.push(tag);
        Ok(())
    }

    /// Append a child IFD entry.
    ///
    /// # Errors
    /// `InvalidChildDirectory` if the child has no own tag id, uses another
    /// byte order, or a child with the same tag id is already present.
    pub fn add_child_ifd(&mut self, child: IfdBuilder) -> Result<(), BuilderError> {
        if child.tag_id == 0 {
            return Err(BuilderError::InvalidChildDirectory(format!(
                "child IFD [{}] has no tag id",
                child.name
            )));
        }

        if child.byte_order != self.byte_order {
            return Err(BuilderError::InvalidChildDirectory(format!(
                "child IFD [{}] is {} but parent [{}] is {}",
                child.name, child.byte_order, self.name, self.byte_order
            )));
        }

        let duplicate = self.tags.iter().any(|tag| {
            tag.value()
                .ifd_builder()
                .map(|existing| existing.tag_id == child.tag_id)
                .unwrap_or(false)
        });
        if duplicate {
            return Err(BuilderError::InvalidChildDirectory(format!(
                "child IFD with tag id 0x{:04x} already present in [{}]",
                child.tag_id, self.name
            )));
        }

        let tag = BuilderTag::new(
            Some(child.name.clone()),
            child.tag_id,
            IfdBuilderTagValue::from_ifd_builder(child),
        );
        self.tags.push(tag);
        Ok(())
    }

    /// Copy the plain entries of a parsed IFD into this builder.
    ///
    /// Child IFD pointers are never copied. An empty `include` means every
    /// tag; a tag listed in `exclude` is always skipped.
    ///
    /// With a resolver, each entry's value is resolved to its full bytes and
    /// entries that fail to resolve are skipped and returned. Without one,
    /// the raw 4-byte value/offset field is copied as-is; only inline values
    /// survive a re-encode in that mode.
    pub fn add_tags_from_existing<R>(
        &mut self,
        ifd: &Ifd,
        resolver: Option<&R>,
        include: &[u16],
        exclude: &[u16],
    ) -> Result<Vec<SkippedTag>, BuilderError>
    where
        R: ValueResolver + ?Sized,
    {
        let mut skipped = Vec::new();

        for entry in &ifd.entries {
            if entry.is_child_ifd() {
                continue;
            }
            if exclude.contains(&entry.tag_id) {
                continue;
            }
            if !include.is_empty() && !include.contains(&entry.tag_id) {
                continue;
            }

            if let Some(skip) = self.add_tag_from_existing(ifd, entry, resolver)? {
                skipped.push(skip);
            }
        }

        Ok(skipped)
    }

    /// Copy one plain entry of `ifd`, or return why it was left out.
    pub(crate) fn add_tag_from_existing<R>(
        &mut self,
        ifd: &Ifd,
        entry: &IfdEntry,
        resolver: Option<&R>,
    ) -> Result<Option<SkippedTag>, BuilderError>
    where
        R: ValueResolver + ?Sized,
    {
        let skip = |reason: ValueError| SkippedTag {
            ifd_name: ifd.name.clone(),
            tag_id: entry.tag_id,
            field_type_raw: entry.field_type_raw,
            reason,
        };

        let bytes = match resolver {
            Some(resolver) => match resolver.value_bytes(entry) {
                Ok(bytes) => bytes,
                Err(reason) => {
                    debug!(
                        ifd = %ifd.name,
                        tag_id = entry.tag_id,
                        field_type = entry.field_type_raw,
                        error = %reason,
                        "skipping tag that could not be resolved"
                    );
                    return Ok(Some(skip(reason)));
                }
            },
            None => Bytes::copy_from_slice(&entry.value_offset_bytes),
        };

        let mut tag = BuilderTag::from_bytes(entry.tag_id, bytes);
        match entry.field_type {
            Some(field_type) => tag = tag.with_field_type(field_type),
            // Raw copies of unknown types have no type to re-encode with
            None if resolver.is_none() => {
                return Ok(Some(skip(ValueError::UnresolvedType(entry.field_type_raw))));
            }
            None => {}
        }

        self.add(tag)?;
        Ok(None)
    }

    // -------------------------------------------------------------------------
    // Finding
    // -------------------------------------------------------------------------

    /// Positions of up to `max` entries with `tag_id`, in order.
    ///
    /// `max == 0` returns every match.
    pub fn find_n(&self, tag_id: u16, max: usize) -> Vec<usize> {
        let matches = self
            .tags
            .iter()
            .enumerate()
            .filter(|(_, tag)| tag.tag_id() == tag_id)
            .map(|(position, _)| position);

        if max == 0 {
            matches.collect()
        } else {
            matches.take(max).collect()
        }
    }

    /// Position of the first entry with `tag_id`.
    pub fn find(&self, tag_id: u16) -> Result<usize, BuilderError> {
        self.tags
            .iter()
            .position(|tag| tag.tag_id() == tag_id)
            .ok_or(BuilderError::EntryNotFound(tag_id))
    }

    /// The child IFD attached under `tag_id`.
    pub fn child_with_tag_id(&self, tag_id: u16) -> Result<&IfdBuilder, BuilderError> {
        self.tags
            .iter()
            .filter(|tag| tag.tag_id() == tag_id)
            .find_map(|tag| tag.value().ifd_builder().ok())
            .ok_or(BuilderError::EntryNotFound(tag_id))
    }

    /// Mutable access to the child IFD attached under `tag_id`.
    pub fn child_with_tag_id_mut(&mut self, tag_id: u16) -> Result<&mut IfdBuilder, BuilderError> {
        self.tags
            .iter_mut()
            .filter(|tag| tag.tag_id() == tag_id)
            .find_map(|tag| tag.value_mut().ifd_builder_mut().ok())
            .ok_or(BuilderError::EntryNotFound(tag_id))
    }

    // -------------------------------------------------------------------------
    // Replacing
    // -------------------------------------------------------------------------

    /// Overwrite the entry at `position`.
    pub fn replace_at(&mut self, position: usize, tag: BuilderTag) -> Result<(), BuilderError> {
        let len = self.tags.len();
        let slot = self
            .tags
            .get_mut(position)
            .ok_or(BuilderError::IndexOutOfRange { position, len })?;

        *slot = tag;
        Ok(())
    }

    /// Overwrite the first entry with `tag_id`.
    pub fn replace(&mut self, tag_id: u16, tag: BuilderTag) -> Result<(), BuilderError> {
        let position = self.find(tag_id)?;
        self.replace_at(position, tag)
    }

    // -------------------------------------------------------------------------
    // Deleting
    // -------------------------------------------------------------------------

    /// Remove the first `n` entries with `tag_id`.
    ///
    /// Entries are removed one at a time. If fewer than `n` exist, the call
    /// fails with `EntryNotFound` and the ones already removed stay removed.
    pub fn delete_n(&mut self, tag_id: u16, n: usize) -> Result<(), BuilderError> {
        if n == 0 {
            return Err(BuilderError::InvalidCount(n));
        }

        for _ in 0..n {
            let position = self.find(tag_id)?;
            self.tags.remove(position);
        }

        Ok(())
    }

    /// Remove the first entry with `tag_id`.
    pub fn delete_first(&mut self, tag_id: u16) -> Result<(), BuilderError> {
        self.delete_n(tag_id, 1)
    }

    /// Remove every entry with `tag_id` and return how many were removed.
    pub fn delete_all(&mut self, tag_id: u16) -> usize {
        let before = self.tags.len();
        self.tags.retain(|tag| tag.tag_id() != tag_id);
        before - self.tags.len()
    }

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------

    /// Entries of the chain that point at image data outside the IFDs.
    ///
    /// Returns `(chain index, tag id)` pairs. The encoder only writes IFDs,
    /// so these values no longer point at the pixel or thumbnail bytes once
    /// the chain is re-encoded on its own.
    pub fn image_data_offset_tags(&self) -> Vec<(usize, u16)> {
        self.chain()
            .enumerate()
            .flat_map(|(index, ib)| {
                ib.tags
                    .iter()
                    .filter(|tag| !tag.is_child_ifd())
                    .filter(|tag| IMAGE_DATA_OFFSET_TAGS.contains(&tag.tag_id()))
                    .map(move |tag| (index, tag.tag_id()))
            })
            .collect()
    }

    /// One line per entry, depth-first through child IFDs.
    pub fn dump_to_strings(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.dump_into(&mut lines, "");
        lines
    }

    fn dump_into(&self, lines: &mut Vec<String>, parents: &str) {
        for (i, tag) in self.tags.iter().enumerate() {
            lines.push(format!(
                "<PARENTS=[{}] IFD-NAME=[{}]> IFD-TAG-ID=(0x{:02x}) CHILD-IFD=[{}] INDEX=({}) TAG=[0x{:02x}]",
                parents,
                self.name,
                self.tag_id,
                tag.child_ifd_name().unwrap_or(""),
                i,
                tag.tag_id()
            ));

            if let Ok(child) = tag.value().ifd_builder() {
                let child_parents = if parents.is_empty() {
                    self.name.clone()
                } else {
                    format!("{}->{}", parents, self.name)
                };
                child.dump_into(lines, &child_parents);
            }
        }
    }
}

impl fmt::Display for IfdBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IfdBuilder<NAME=[{}] TAG-ID=(0x{:04x}) BO=[{}] COUNT=({}) OFFSET=(0x{:04x})",
            self.name,
            self.tag_id,
            self.byte_order,
            self.tags.len(),
            self.existing_offset.unwrap_or(0)
        )?;

        match self.next_ifd() {
            Some(next) => write!(f, " NEXT-IFD=({})>", next.name),
            None => f.write_str(" NEXT-IFD=(nil)>"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
