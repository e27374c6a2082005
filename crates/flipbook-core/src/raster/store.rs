use crate::types::{PageImage, PageView};

#[derive(Debug, Clone)]
pub enum PageSlot {
    Pending,
    Ready(PageImage),
    Failed(String),
}

/// Index-pinned page images. Production is sequential, lookups are random.
#[derive(Debug, Default)]
pub struct PageStore {
    slots: Vec<PageSlot>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_count(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn set_page_count(&mut self, count: u32) {
        self.slots.resize(count as usize, PageSlot::Pending);
    }

    pub fn insert(&mut self, image: PageImage) {
        if let Some(slot) = self.slot_mut(image.index) {
            *slot = PageSlot::Ready(image);
        }
    }

    pub fn mark_failed(&mut self, index: u32, reason: impl Into<String>) {
        if let Some(slot) = self.slot_mut(index) {
            *slot = PageSlot::Failed(reason.into());
        }
    }

    /// View of a 1-based page, `None` when outside the document
    pub fn get(&self, index: u32) -> Option<PageView> {
        let slot = self.slots.get(index.checked_sub(1)? as usize)?;
        Some(match slot {
            PageSlot::Pending => PageView::Placeholder { index },
            PageSlot::Ready(image) => PageView::Ready(image.clone()),
            PageSlot::Failed(reason) => PageView::Unavailable {
                index,
                reason: reason.clone(),
            },
        })
    }

    pub fn is_ready(&self, index: u32) -> bool {
        matches!(self.get(index), Some(PageView::Ready(_)))
    }

    pub fn ready_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, PageSlot::Ready(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, PageSlot::Failed(_)))
            .count()
    }

    /// Ready pages in index order
    pub fn ready_pages(&self) -> impl Iterator<Item = &PageImage> {
        self.slots.iter().filter_map(|s| match s {
            PageSlot::Ready(image) => Some(image),
            _ => None,
        })
    }

    fn slot_mut(&mut self, index: u32) -> Option<&mut PageSlot> {
        self.slots.get_mut(index.checked_sub(1)? as usize)
    }
}
