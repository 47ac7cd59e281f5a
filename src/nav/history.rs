use std::collections::VecDeque;

/// One entry in the navigation stack. The snapshot is the opaque document
/// state pushed alongside the address: the body HTML of the fragment that
/// produced the entry. Exactly one entry exists per successful navigation;
/// failed navigations never push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    pub snapshot: String,
}

#[derive(Debug)]
pub struct HistoryStack {
    back: VecDeque<HistoryEntry>,
    forward: VecDeque<HistoryEntry>,
    current: Option<HistoryEntry>,
    capacity: usize,
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            back: VecDeque::new(),
            forward: VecDeque::new(),
            current: None,
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if let Some(current) = self.current.take() {
            if self.back.len() >= self.capacity {
                self.back.pop_front();
            }
            self.back.push_back(current);
        }
        self.current = Some(entry);
        self.forward.clear();
    }

    pub fn back(&mut self) -> Option<&HistoryEntry> {
        let target = self.back.pop_back()?;
        if let Some(current) = self.current.take() {
            self.forward.push_back(current);
        }
        self.current = Some(target);
        self.current.as_ref()
    }

    pub fn forward(&mut self) -> Option<&HistoryEntry> {
        let target = self.forward.pop_back()?;
        if let Some(current) = self.current.take() {
            self.back.push_back(current);
        }
        self.current = Some(target);
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.current.as_ref()
    }

    pub fn len(&self) -> usize {
        self.back.len() + self.forward.len() + usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
