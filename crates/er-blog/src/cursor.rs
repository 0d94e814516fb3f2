/// Pagination progress of one listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub loaded_count: u64,
    pub total: u64,
    pub is_loading: bool,
    pub pending_append: bool,
}

impl Cursor {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Everything the server reported has been loaded.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.loaded_count >= self.total
    }

    pub fn has_more(&self) -> bool {
        self.loaded_count < self.total
    }

    /// First page landed. Without a total header the page length stands in for it.
    pub fn record_initial(&mut self, returned: u64, total: Option<u64>) {
        self.loaded_count = returned;
        self.total = total.unwrap_or(returned);
        self.is_loading = false;
        self.pending_append = false;
    }

    /// Another page landed. Without a total header the listing is treated as
    /// exhausted at the new count.
    pub fn record_append(&mut self, returned: u64, total: Option<u64>) {
        self.loaded_count += returned;
        self.total = total.unwrap_or(self.loaded_count);
        self.is_loading = false;
        self.pending_append = false;
    }

    pub fn settle(&mut self) {
        self.is_loading = false;
        self.pending_append = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_needs_a_positive_total() {
        let mut cursor = Cursor::default();
        cursor.record_initial(0, None);
        assert!(!cursor.is_complete());
        assert!(!cursor.has_more());

        cursor.record_initial(10, Some(25));
        assert!(cursor.has_more());
        cursor.record_append(10, Some(25));
        cursor.record_append(5, Some(25));
        assert_eq!(cursor.loaded_count, 25);
        assert!(cursor.is_complete());
    }

    #[test]
    fn missing_header_falls_back_to_counts() {
        let mut cursor = Cursor::default();
        cursor.record_initial(10, None);
        assert_eq!(cursor.total, 10);
        assert!(cursor.is_complete());

        cursor.record_initial(10, Some(30));
        cursor.record_append(10, None);
        assert_eq!(cursor.total, 20);
        assert!(cursor.is_complete());
    }
}
