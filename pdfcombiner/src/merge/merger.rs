//! lopdf-based PDF merging.
//!
//! Combines in-memory PDF payloads by concatenating their page trees:
//! the first document becomes the base, every subsequent document is
//! renumbered past the current maximum object id, its objects are moved
//! across, and its pages are spliced into the base page tree.

use lopdf::{Document, Object, ObjectId};
use tokio::task;

use async_trait::async_trait;

use crate::error::{CombinerError, Result};
use crate::merge::{DocumentCombiner, ResolvedDocument};

/// PDF merger operating on in-memory payloads.
#[derive(Debug, Clone, Default)]
pub struct PdfMerger;

impl PdfMerger {
    /// Creates a new merger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentCombiner for PdfMerger {
    /// Merges `inputs` into a single PDF.
    ///
    /// # Errors
    ///
    /// Returns [`CombinerError::EmptyJob`] for an empty input set and
    /// [`CombinerError::Combine`] when any payload fails to parse or the
    /// merged document cannot be assembled. Parsing and merging are
    /// CPU-bound, so the whole operation runs on a blocking task.
    async fn combine(&self, inputs: &[ResolvedDocument]) -> Result<Vec<u8>> {
        if inputs.is_empty() {
            return Err(CombinerError::EmptyJob);
        }

        let inputs = inputs.to_vec();

        task::spawn_blocking(move || {
            let mut merged = merge_documents(&inputs)?;

            let mut buffer = Vec::new();
            merged
                .save_to(&mut buffer)
                .map_err(|e| CombinerError::combine(format!("failed to serialize output: {e}")))?;

            Ok(buffer)
        })
        .await
        .map_err(|e| CombinerError::combine(format!("merge task failed: {e}")))?
    }
}

/// Merge parsed documents in input order.
fn merge_documents(inputs: &[ResolvedDocument]) -> Result<Document> {
    let mut parsed = Vec::with_capacity(inputs.len());
    for input in inputs {
        let doc = Document::load_mem(&input.bytes).map_err(|e| {
            CombinerError::combine(format!("failed to parse '{}': {e}", input.name))
        })?;
        parsed.push(doc);
    }

    // Start with the first document as base
    let mut iter = parsed.into_iter();
    let mut merged = iter
        .next()
        .expect("inputs verified non-empty by the caller");
    let mut max_id = merged.max_id;

    for mut doc in iter {
        // Renumber objects to avoid ID conflicts
        doc.renumber_objects_with(max_id + 1);
        max_id = doc.max_id;

        // Get page references from the document
        let doc_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        // Add all objects from doc to merged
        merged.objects.extend(doc.objects);

        // Update the page tree
        add_pages_to_tree(&mut merged, &doc_pages)?;
    }

    merged.compress();

    // Always renumber for consistency
    merged.renumber_objects();

    tracing::debug!(
        documents = inputs.len(),
        pages = merged.get_pages().len(),
        "documents merged"
    );

    Ok(merged)
}

/// Add pages to the merged document's page tree.
fn add_pages_to_tree(merged: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    // Get the catalog and pages reference
    let catalog = merged
        .catalog_mut()
        .map_err(|e| CombinerError::combine(format!("failed to get catalog: {e}")))?;

    let pages_id = catalog
        .get(b"Pages")
        .and_then(|p| p.as_reference())
        .map_err(|e| CombinerError::combine(format!("failed to get pages reference: {e}")))?;

    // Get the pages dictionary
    let pages_dict = merged
        .get_object_mut(pages_id)
        .map_err(|e| CombinerError::combine(format!("failed to get pages object: {e}")))?;

    if let Object::Dictionary(dict) = pages_dict {
        // Get existing kids array
        let kids = dict
            .get_mut(b"Kids")
            .map_err(|_| CombinerError::combine("pages dictionary missing Kids array"))?;

        if let Object::Array(kids_array) = kids {
            // Add new page references
            for &page_id in page_ids {
                kids_array.push(Object::Reference(page_id));
            }
        } else {
            return Err(CombinerError::combine("Kids is not an array"));
        }

        // Update page count
        let current_count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);

        let new_count = current_count + page_ids.len() as i64;
        dict.set("Count", Object::Integer(new_count));
    } else {
        return Err(CombinerError::combine("pages object is not a dictionary"));
    }

    Ok(())
}
