//! Rebuilding an editable builder chain from a parsed IFD graph.

use bytes::Bytes;
use tracing::debug;

use crate::error::{BuilderError, ValueError};
use crate::format::tiff::{Ifd, IfdTagEntryValueResolver, ValueResolver};

use super::ifd::IfdBuilder;

/// A source entry left out of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTag {
    /// Name of the IFD the entry belongs to
    pub ifd_name: String,

    /// Tag id of the entry
    pub tag_id: u16,

    /// Field type code as stored
    pub field_type_raw: u16,

    /// Why the value could not be carried over
    pub reason: ValueError,
}

/// Result of [`import_chain`].
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// First builder of the rebuilt chain
    pub root: IfdBuilder,

    /// Entries that were dropped, in the order they were met
    pub skipped: Vec<SkippedTag>,
}

/// Rebuild the whole chain starting at `root`.
///
/// Every top-level IFD becomes a builder with the source's name, tag id,
/// byte order and offset. Entries are taken in their stored order: plain
/// entries are copied through `resolver` and child IFDs are imported
/// recursively at the position of their pointer (their own `next` links are
/// not followed). The top-level builders are linked in chain order. Entries whose value
/// cannot be resolved are reported in [`ImportReport::skipped`].
pub fn import_chain<R>(root: &Ifd, resolver: &R) -> Result<ImportReport, BuilderError>
where
    R: ValueResolver + ?Sized,
{
    let mut skipped = Vec::new();
    let mut builders = Vec::new();

    for ifd in root.chain() {
        builders.push(import_ifd(ifd, resolver, &mut skipped)?);
    }

    // Link back to front so every builder owns the rest of the chain
    let mut next: Option<IfdBuilder> = None;
    for mut ib in builders.into_iter().rev() {
        if let Some(next) = next.take() {
            ib.set_next_ifd(next);
        }
        next = Some(ib);
    }

    let root = next.ok_or_else(|| {
        BuilderError::InvalidChildDirectory(format!("no IFD to import from [{}]", root.name))
    })?;

    debug!(
        ifds = root.chain().count(),
        skipped = skipped.len(),
        "imported IFD chain"
    );

    Ok(ImportReport { root, skipped })
}

/// One IFD and its children, without the chain.
fn import_ifd<R>(
    ifd: &Ifd,
    resolver: &R,
    skipped: &mut Vec<SkippedTag>,
) -> Result<IfdBuilder, BuilderError>
where
    R: ValueResolver + ?Sized,
{
    let mut ib = IfdBuilder::new_with_existing_ifd(ifd);
    let mut attached = vec![false; ifd.children.len()];

    // Entries keep their stored order, child pointers included
    for entry in &ifd.entries {
        let child_position = entry.child_ifd_name.as_deref().and_then(|name| {
            ifd.children
                .iter()
                .zip(&attached)
                .position(|(child, &done)| {
                    !done && child.name == name && child.tag_id == entry.tag_id
                })
        });

        match child_position {
            Some(position) => {
                attached[position] = true;
                let child_ib = import_ifd(&ifd.children[position], resolver, skipped)?;
                ib.add_child_ifd(child_ib)?;
            }
            None if entry.is_child_ifd() => {
                debug!(
                    ifd = %ifd.name,
                    tag_id = entry.tag_id,
                    "child IFD pointer without a parsed child"
                );
            }
            None => {
                if let Some(skip) = ib.add_tag_from_existing(ifd, entry, Some(resolver))? {
                    skipped.push(skip);
                }
            }
        }
    }

    // Children the entries did not reference still belong to this IFD
    for (child, &done) in ifd.children.iter().zip(&attached) {
        if done {
            continue;
        }
        let child_ib = import_ifd(child, resolver, skipped)?;
        ib.add_child_ifd(child_ib)?;
    }

    Ok(ib)
}

impl IfdBuilder {
    /// Import the chain at `root`, resolving values against `data`.
    ///
    /// `data` is the buffer `root` was parsed from, starting at the TIFF
    /// header.
    pub fn from_existing_chain(root: &Ifd, data: Bytes) -> Result<ImportReport, BuilderError> {
        let resolver = IfdTagEntryValueResolver::new(data, root.byte_order);
        import_chain(root, &resolver)
    }
}

// =============================================================================
// Tests
// =============================================================================
