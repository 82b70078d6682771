//! Pending-upload set for one guest session.
//!
//! Every selection event appends to the set; it never replaces what was
//! picked before. Filtering is by declared MIME type only, matching the
//! `accept="image/*"` input filter, not by sniffing the bytes.

use ps_core::models::UploadItem;

/// Declared-type check used to admit selections.
pub fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// The files a guest has picked so far. Dropped wholesale when the session
/// ends, which releases every held buffer.
#[derive(Debug, Default)]
pub struct PendingSet {
    items: Vec<UploadItem>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one selection event. Non-image entries are skipped, an empty
    /// selection is a no-op. Returns how many items were admitted.
    pub fn add_selection(&mut self, files: impl IntoIterator<Item = UploadItem>) -> usize {
        let before = self.items.len();
        for file in files {
            if is_image(&file.content_type) {
                self.items.push(file);
            } else {
                log::debug!("skipping non-image selection: {}", file.file_name);
            }
        }
        self.items.len() - before
    }

    /// Removes one item from the preview grid, releasing its buffer.
    pub fn remove(&mut self, index: usize) -> Option<UploadItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    /// Hands the full ordered set to the submission queue.
    pub fn take_all(self) -> Vec<UploadItem> {
        self.items
    }
}
