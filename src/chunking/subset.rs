//! Page subsetting.
//!
//! Serializes a contiguous page range of a parsed PDF as a standalone
//! document. The source is parsed once; every subset works on a clone whose
//! page tree is collapsed to a single `Pages` node holding only the wanted
//! pages, after which unreachable objects are pruned.

use crate::error::{DocumentError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::ops::Range;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic `Parent` chains in broken files.
const MAX_TREE_DEPTH: usize = 64;

/// A parsed PDF ready to be cut into page ranges.
#[derive(Debug, Clone)]
pub struct PageSource {
    document: Document,
    catalog_id: ObjectId,
    pages_root: ObjectId,
    pages: Vec<ObjectId>,
}

impl PageSource {
    /// Parses `bytes` and prepares its pages for subsetting.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Parse`] for unreadable bytes and
    /// [`DocumentError::PageTree`] when the catalog has no page tree.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(bytes).map_err(DocumentError::from)?;
        let pages: Vec<ObjectId> = document.get_pages().into_values().collect();

        let catalog_id = document
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|e| DocumentError::PageTree(format!("missing catalog: {e}")))?;
        let pages_root = document
            .get_dictionary(catalog_id)
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|e| DocumentError::PageTree(format!("missing page tree root: {e}")))?;

        for &page_id in &pages {
            materialize_inherited(&mut document, page_id)?;
        }

        Ok(Self {
            document,
            catalog_id,
            pages_root,
            pages,
        })
    }

    /// Returns the number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serializes pages `range` into a standalone PDF.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Serialize`] if the range is out of bounds or
    /// writing fails.
    pub fn serialize(&self, range: Range<usize>) -> Result<Vec<u8>> {
        let serialize_error = |reason: String| DocumentError::Serialize {
            start: range.start,
            end: range.end,
            reason,
        };

        let Some(selected) = self.pages.get(range.clone()) else {
            return Err(serialize_error(format!(
                "range exceeds page count {}",
                self.pages.len()
            ))
            .into());
        };

        let mut subset = self.document.clone();

        for &page_id in selected {
            subset
                .get_object_mut(page_id)
                .and_then(|object| object.as_dict_mut())
                .map_err(|e| serialize_error(e.to_string()))?
                .set("Parent", self.pages_root);
        }

        let kids: Vec<Object> = selected.iter().map(|&id| Object::Reference(id)).collect();
        #[allow(clippy::cast_possible_wrap)]
        let count = selected.len() as i64;
        let root = subset
            .get_object_mut(self.pages_root)
            .and_then(|object| object.as_dict_mut())
            .map_err(|e| serialize_error(e.to_string()))?;
        root.set("Kids", kids);
        root.set("Count", count);
        root.remove(b"Parent");

        // Outlines, named destinations and structure trees would keep
        // every other page reachable.
        subset.objects.insert(
            self.catalog_id,
            Object::Dictionary(dictionary! {
                "Type" => "Catalog",
                "Pages" => self.pages_root,
            }),
        );

        let mut trailer = Dictionary::new();
        trailer.set("Root", self.catalog_id);
        if let Ok(info) = self.document.trailer.get(b"Info") {
            trailer.set("Info", info.clone());
        }
        subset.trailer = trailer;

        subset.prune_objects();

        let mut bytes = Vec::new();
        subset
            .save_to(&mut bytes)
            .map_err(|e| serialize_error(e.to_string()))?;
        Ok(bytes)
    }
}

/// Copies inherited attributes onto the page itself, so the page keeps them
/// once it is re-parented directly under the page tree root.
fn materialize_inherited(document: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(Vec<u8>, Object)> = Vec::new();
    {
        let page = document
            .get_dictionary(page_id)
            .map_err(|e| DocumentError::PageTree(format!("page {page_id:?}: {e}")))?;
        let mut missing: Vec<&[u8]> = INHERITABLE_KEYS
            .iter()
            .copied()
            .filter(|key| !page.has(key))
            .collect();
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;

        while let Some(parent_id) = parent {
            if missing.is_empty() || depth >= MAX_TREE_DEPTH {
                break;
            }
            let Ok(node) = document.get_dictionary(parent_id) else {
                break;
            };
            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    inherited.push((key.to_vec(), value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
    }

    if !inherited.is_empty() {
        let page = document
            .get_object_mut(page_id)
            .and_then(|object| object.as_dict_mut())
            .map_err(|e| DocumentError::PageTree(format!("page {page_id:?}: {e}")))?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
    Ok(())
}
