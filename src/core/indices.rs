use std::{hash::Hash, sync::Arc};

use hashbrown::HashMap;

use crate::types::RowIdx;

/// Row positions per distinct key, in list order.
pub type VecIndex<K> = HashMap<Arc<K>, Vec<RowIdx>>;

/// Groups row positions by value key.
///
/// Rows keep their list order inside each group; the returned key list is in
/// first-seen order.
pub fn group_rows<K, T, F>(rows: &[T], key: F) -> (VecIndex<K>, Vec<Arc<K>>)
where
    K: Hash + Eq,
    F: Fn(&T) -> &Arc<K>,
{
    let mut index: VecIndex<K> = HashMap::new();
    let mut first_seen = Vec::new();

    for (row, item) in rows.iter().enumerate() {
        let k = key(item);
        match index.get_mut(k.as_ref()) {
            Some(rows) => rows.push(row),
            None => {
                first_seen.push(Arc::clone(k));
                index.insert(Arc::clone(k), vec![row]);
            }
        }
    }

    (index, first_seen)
}
