use fnv::FnvHashMap;

/// Slide index → viewer handle. A slot is filled at most once.
#[derive(Debug)]
pub struct ViewerRegistry<H> {
    viewers: FnvHashMap<usize, H>,
}

impl<H> Default for ViewerRegistry<H> {
    fn default() -> Self {
        Self {
            viewers: FnvHashMap::default(),
        }
    }
}

impl<H: Clone> ViewerRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<H> {
        self.viewers.get(&index).cloned()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.viewers.contains_key(&index)
    }

    /// Return the viewer for `index`, building it with `build` on first use.
    ///
    /// `build` is not called when the slot is already filled; when it
    /// returns `None` (missing DOM, no model path) nothing is stored and a
    /// later call may try again.
    pub fn get_or_try_insert_with<F>(&mut self, index: usize, build: F) -> Option<H>
    where
        F: FnOnce() -> Option<H>,
    {
        if let Some(existing) = self.viewers.get(&index) {
            return Some(existing.clone());
        }
        let handle = build()?;
        self.viewers.insert(index, handle.clone());
        Some(handle)
    }

    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.viewers.keys().copied()
    }
}
