//! Hot file ranking

use crate::model::FileRecord;

/// The `n` most frequently changed files, highest count first. Files with
/// equal counts keep their listing order.
pub fn top_changed(files: &[FileRecord], n: usize) -> Vec<&FileRecord> {
    let mut ranked: Vec<&FileRecord> = files.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.changes.cmp(&a.changes));
    ranked.truncate(n);
    ranked
}
