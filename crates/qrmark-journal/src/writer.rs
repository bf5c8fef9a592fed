//! Journal writer implementation.

use crate::errors::JournalError;
use crate::frame::{check_header, Frame, HEADER, HEADER_SIZE};
use crate::reader::{JournalReader, ReadMode};
use qrmark_core::RedemptionRecord;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::Path;

/// Options for journal writing.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to fsync after each append (default: false).
    pub sync: bool,
    /// Whether to create the file if it doesn't exist (default: true).
    pub create: bool,
    /// Whether to cut a torn trailing frame left by a crash (default: true).
    pub repair_tail: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: false,
            create: true,
            repair_tail: true,
        }
    }
}

/// Append-only writer for a redemption journal.
///
/// Each append is all-or-nothing on disk: if writing a frame fails part way,
/// the file is cut back to its previous length. If that cut fails too, the
/// writer refuses further appends with [`JournalError::WriterFailed`].
///
/// # Example
///
/// ```rust,no_run
/// use qrmark_journal::{JournalWriter, WriteOptions};
///
/// let writer = JournalWriter::open("redemptions.qrj", WriteOptions::default())?;
/// writer.finish()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct JournalWriter {
    tail: Tail<File>,
}

impl JournalWriter {
    /// Opens or creates a journal file for appending.
    ///
    /// A new or empty file receives a header. An existing file must carry a
    /// valid header; with `repair_tail` set, a truncated final frame is cut off
    /// so that new frames follow the last complete one.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if the file cannot be opened, is not a valid
    /// journal, or (without `repair_tail`) ends in a torn frame.
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, JournalError> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .create(options.create)
            .write(true)
            .read(true)
            .open(path)?;

        let metadata_len = file.metadata()?.len();
        let len = if metadata_len == 0 {
            file.write_all(&HEADER)?;
            file.flush()?;
            if options.sync {
                file.sync_all()?;
            }
            HEADER_SIZE as u64
        } else if metadata_len < HEADER_SIZE as u64 {
            return Err(JournalError::HeaderTruncated { len: metadata_len });
        } else {
            let mut header_bytes = [0u8; HEADER_SIZE];
            file.seek(io::SeekFrom::Start(0))?;
            file.read_exact(&mut header_bytes)?;
            check_header(&header_bytes)?;

            let mode = if options.repair_tail {
                ReadMode::Permissive
            } else {
                ReadMode::Strict
            };
            let end = complete_prefix_len(path, mode)?;
            if end < metadata_len {
                file.set_len(end)?;
            }
            end
        };

        file.seek(io::SeekFrom::Start(len))?;
        Ok(Self {
            tail: Tail::new(file, len, options.sync),
        })
    }

    /// Appends a committed redemption record.
    pub fn append_record(&mut self, record: &RedemptionRecord) -> Result<(), JournalError> {
        self.append(&Frame::Redemption(record.clone()))
    }

    /// Appends any frame.
    pub fn append(&mut self, frame: &Frame) -> Result<(), JournalError> {
        let bytes = frame.encode()?;
        self.tail.append(&bytes)
    }

    /// Length of the journal in bytes, header included.
    pub fn len(&self) -> u64 {
        self.tail.len
    }

    /// Whether the journal holds no frames.
    pub fn is_empty(&self) -> bool {
        self.tail.len == HEADER_SIZE as u64
    }

    /// Finishes writing and closes the file.
    pub fn finish(mut self) -> Result<(), JournalError> {
        self.tail.sink.flush()?;
        if self.tail.sync {
            self.tail.sink.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        let _ = self.tail.sink.flush();
        if self.tail.sync {
            let _ = self.tail.sink.sync_all();
        }
    }
}

/// Storage a journal tail can be appended to and cut back.
trait Sink: Write {
    fn sync_data(&mut self) -> io::Result<()>;
    fn cut(&mut self, len: u64) -> io::Result<()>;
}

impl Sink for File {
    fn sync_data(&mut self) -> io::Result<()> {
        File::sync_data(self)
    }

    fn cut(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.seek(io::SeekFrom::Start(len))?;
        Ok(())
    }
}

/// End of the journal: tracks the committed length and rolls back torn appends.
struct Tail<S> {
    sink: S,
    len: u64,
    sync: bool,
    failed: bool,
}

impl<S: Sink> Tail<S> {
    fn new(sink: S, len: u64, sync: bool) -> Self {
        Self {
            sink,
            len,
            sync,
            failed: false,
        }
    }

    fn append(&mut self, bytes: &[u8]) -> Result<(), JournalError> {
        if self.failed {
            return Err(JournalError::WriterFailed);
        }
        if let Err(err) = self.write_frame(bytes) {
            if self.sink.cut(self.len).is_err() {
                self.failed = true;
            }
            return Err(err.into());
        }
        self.len += bytes.len() as u64;
        Ok(())
    }

    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sink.write_all(bytes)?;
        self.sink.flush()?;
        if self.sync {
            self.sink.sync_data()?;
        }
        Ok(())
    }
}

fn complete_prefix_len(path: &Path, mode: ReadMode) -> Result<u64, JournalError> {
    let mut reader = JournalReader::open(path, mode)?;
    while reader.skip_frame()? {}
    Ok(reader.position())
}
