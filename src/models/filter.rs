/// Structured search parameters extracted from a free-text query.
///
/// Id search takes precedence: when `search_by_id` is set with a non-empty
/// `id`, the name and score fields are ignored entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub search_by_name: bool,
    pub name: String,
    pub min_score: Option<f64>,
    pub search_by_id: bool,
    pub id: String,
}

impl SearchFilter {
    pub fn wants_direct_lookup(&self) -> bool {
        self.search_by_id && !self.id.is_empty()
    }

    pub fn keyword(&self) -> Option<&str> {
        if self.search_by_name && !self.name.is_empty() {
            Some(self.name.as_str())
        } else {
            None
        }
    }
}
