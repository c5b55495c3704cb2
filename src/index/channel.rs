use super::{record_id, Indexer};
use crate::error::{CrawlError, CrawlResult};
use crate::types::FileEntry;
use crossbeam::channel::{self, Receiver, Sender};

/// Sends every record to a consumer on the other end of a channel.
#[derive(Debug, Clone)]
pub struct ChannelIndex {
    tx: Sender<FileEntry>,
}

impl ChannelIndex {
    pub fn new(tx: Sender<FileEntry>) -> Self {
        Self { tx }
    }

    pub fn unbounded() -> (Self, Receiver<FileEntry>) {
        let (tx, rx) = channel::unbounded();
        (Self { tx }, rx)
    }
}

impl Indexer for ChannelIndex {
    fn add_file_entry(&self, entry: FileEntry) -> CrawlResult<String> {
        let id = record_id(&entry);
        self.tx
            .send(entry)
            .map_err(|_| CrawlError::index("record consumer has gone away"))?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileLocation;

    #[test]
    fn test_forwards_records() {
        let (index, rx) = ChannelIndex::unbounded();
        let entry = FileEntry::new("a.iso", 7, FileLocation::new("ftp://h/", "/a.iso"));

        let id = index.add_file_entry(entry.clone()).unwrap();

        assert_eq!(id, record_id(&entry));
        assert_eq!(rx.try_recv().unwrap(), entry);
    }

    #[test]
    fn test_dropped_receiver_is_an_error() {
        let (index, rx) = ChannelIndex::unbounded();
        drop(rx);
        let entry = FileEntry::new("a", 1, FileLocation::new("ftp://h/", "/a"));
        assert!(matches!(index.add_file_entry(entry), Err(CrawlError::Index(_))));
    }
}
