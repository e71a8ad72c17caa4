use std::fmt;

/// Callback fired once after each `render_all` / `redraw_all`, receiving the
/// broadcast's chart group (`None` for the global group).
pub type Renderlet = Box<dyn FnMut(Option<&str>)>;

/// Handle returned by renderlet registration, used to detach it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderletId(u64);

#[derive(Default)]
pub(super) struct RenderletRegistry {
    next_id: u64,
    entries: Vec<(RenderletId, Renderlet)>,
}

impl RenderletRegistry {
    pub(super) fn register(&mut self, renderlet: Renderlet) -> RenderletId {
        let id = RenderletId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, renderlet));
        id
    }

    pub(super) fn remove(&mut self, id: RenderletId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(super) fn fire(&mut self, group: Option<&str>) {
        for (_, renderlet) in &mut self.entries {
            renderlet(group);
        }
    }
}

impl fmt::Debug for RenderletRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderletRegistry")
            .field("count", &self.entries.len())
            .finish()
    }
}
