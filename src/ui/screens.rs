use crate::library::Library;
use crate::models::SearchField;
use crate::storage::Persistence;

/// Cursor over a list of `len` rows that stays in bounds as the list changes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Selection {
    pub(crate) selected: usize,
}

impl Selection {
    pub(crate) fn move_by(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let last = len as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// State for the search view. `hits` holds positional indexes into the
/// library so a hit can be removed directly.
#[derive(Debug, Default, Clone)]
pub(crate) struct SearchScreen {
    pub(crate) field: SearchField,
    pub(crate) query: String,
    pub(crate) hits: Vec<usize>,
    pub(crate) selection: Selection,
}

impl SearchScreen {
    pub(crate) fn new<P: Persistence>(library: &Library<P>) -> Self {
        let mut screen = Self::default();
        screen.refresh(library);
        screen
    }

    /// Re-run the query after the term, field, or collection changed.
    pub(crate) fn refresh<P: Persistence>(&mut self, library: &Library<P>) {
        self.hits = library.search_positions(&self.query, self.field);
        self.selection.ensure_in_bounds(self.hits.len());
    }

    pub(crate) fn cycle_field<P: Persistence>(&mut self, library: &Library<P>) {
        self.field = self.field.next();
        self.refresh(library);
    }

    /// Library index of the highlighted hit.
    pub(crate) fn current_index(&self) -> Option<usize> {
        self.hits.get(self.selection.selected).copied()
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selection.move_by(offset, self.hits.len());
    }
}
