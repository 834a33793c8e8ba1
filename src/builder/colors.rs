use indexmap::IndexMap;

/// Relationship colors, handed out in order and reused once exhausted.
pub const PALETTE: [&str; 14] = [
    "#d35400", "#008000", "#3455DB", "#9400d3", "#939393", "#b8806b", "#D35400", "#008b8b",
    "#B50000", "#1460aa", "#8b008b", "#696969", "#634806", "#870c25",
];

/// Assigns one palette color per lookup-column logical name.
///
/// Assignments are append-only and live as long as the allocator; each
/// build owns a fresh one.
#[derive(Debug, Default)]
pub struct ColorAllocator {
    assigned: IndexMap<String, &'static str>,
}

impl ColorAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, lookup_name: &str) -> &'static str {
        if let Some(color) = self.assigned.get(lookup_name).copied() {
            return color;
        }
        let color = PALETTE[self.assigned.len() % PALETTE.len()];
        self.assigned.insert(lookup_name.to_string(), color);
        color
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}
