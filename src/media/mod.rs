mod index;

pub use index::{
    strip_storage_root, JournalMediaIndex, MediaIndex, MediaJournalEntry, RecordingMediaIndex,
};
