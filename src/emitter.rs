//! Entry emitter: hands records to the index and absorbs its failures.

use crate::target::Target;
use crate::types::FileEntry;

impl Target {
    /// Give `record` to the index. A rejected record is logged and dropped.
    pub(crate) fn emit(&self, record: FileEntry) -> bool {
        let path = record.primary().path().to_string();
        match self.collab.index.add_file_entry(record) {
            Ok(id) => {
                log::debug!("indexed {} as {}", path, id);
                true
            }
            Err(e) => {
                self.error(&format!("indexing {} failed: {}", path, e));
                false
            }
        }
    }
}
