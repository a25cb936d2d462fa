use std::collections::BTreeMap;

use shared::{ExpressId, FragmentId, HighlightResult};

/// Fragment id → selected element ids
pub type SelectionRecord = BTreeMap<FragmentId, Vec<ExpressId>>;

/// Build the record for a pick: one entry per fragment, each holding the picked id.
pub fn record_from_result(result: &HighlightResult) -> SelectionRecord {
    let mut record = SelectionRecord::new();
    for fragment in &result.fragments {
        record.insert(fragment.clone(), vec![result.id]);
    }
    record
}

/// Last element selection
#[derive(Debug, Default)]
pub struct SelectionState {
    last_selection: Option<SelectionRecord>,
    /// Version counter for selection changes
    pub version: u64,
}

impl SelectionState {
    pub fn record(&self) -> Option<&SelectionRecord> {
        self.last_selection.as_ref()
    }

    /// Replace the whole record
    pub fn replace(&mut self, record: SelectionRecord) {
        self.last_selection = Some(record);
        self.version += 1;
    }

    pub fn clear(&mut self) {
        if self.last_selection.take().is_some() {
            self.version += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_selection.as_ref().map_or(true, |r| r.is_empty())
    }

    pub fn contains(&self, fragment: &str, express_id: ExpressId) -> bool {
        self.last_selection
            .as_ref()
            .and_then(|r| r.get(fragment))
            .is_some_and(|ids| ids.contains(&express_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_result_collapses_repeats() {
        let result = HighlightResult {
            id: 42,
            fragments: vec!["F1".into(), "F2".into(), "F1".into()],
        };
        let record = record_from_result(&result);
        assert_eq!(record.len(), 2);
        assert_eq!(record["F1"], vec![42]);
        assert_eq!(record["F2"], vec![42]);
    }

    #[test]
    fn test_replace_overwrites_previous() {
        let mut sel = SelectionState::default();
        assert!(sel.record().is_none());
        sel.replace(BTreeMap::from([("F9".to_string(), vec![1, 2])]));
        sel.replace(BTreeMap::from([("F1".to_string(), vec![42])]));
        assert_eq!(sel.record().unwrap().len(), 1);
        assert!(sel.contains("F1", 42));
        assert!(!sel.contains("F9", 1));
    }

    #[test]
    fn test_clear() {
        let mut sel = SelectionState::default();
        sel.replace(BTreeMap::from([("A".to_string(), vec![1]), ("B".to_string(), vec![2])]));
        assert!(sel.contains("B", 2));
        sel.clear();
        assert!(sel.is_empty());
    }
}
