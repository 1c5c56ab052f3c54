// ---------------------------------------------------------------------------
// Category multiselect: which Historical_Spending columns to plot
// ---------------------------------------------------------------------------

/// Choices are sorted; the selection keeps the order the user picked them in,
/// which is also the order the lines are drawn and named in the title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySelection {
    available: Vec<String>,
    selected: Vec<String>,
}

impl CategorySelection {
    /// Start with nothing selected.
    pub fn new(available: Vec<String>) -> Self {
        CategorySelection {
            available,
            selected: Vec::new(),
        }
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.selected.iter().any(|c| c == category)
    }

    /// Flip one category. Unknown names are ignored.
    pub fn toggle(&mut self, category: &str) {
        if let Some(pos) = self.selected.iter().position(|c| c == category) {
            self.selected.remove(pos);
        } else if self.available.iter().any(|c| c == category) {
            self.selected.push(category.to_string());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.available.clone();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    /// Swap in a new set of choices after a reload, keeping whatever is
    /// still available.
    pub fn rebase(&mut self, available: Vec<String>) {
        self.selected.retain(|c| available.contains(c));
        self.available = available;
    }
}
