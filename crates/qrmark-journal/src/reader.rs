//! Journal reader implementation.

use crate::errors::JournalError;
use crate::frame::{check_header, parse_prefix, Frame, FRAME_HEADER_SIZE, HEADER_SIZE};
use qrmark_core::RedemptionRecord;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

/// Read mode for handling truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Strict mode: truncated frames are errors.
    Strict,
    /// Permissive mode: truncation is treated as end-of-file.
    Permissive,
}

/// Sequential reader over a redemption journal.
///
/// # Example
///
/// ```rust,no_run
/// use qrmark_journal::{JournalReader, ReadMode};
///
/// let mut reader = JournalReader::open("redemptions.qrj", ReadMode::Strict)?;
/// while let Some(record) = reader.read_record()? {
///     println!("{} redeemed {}", record.user_id, record.qrmark_id);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct JournalReader {
    file: BufReader<File>,
    mode: ReadMode,
    position: u64,
    file_size: u64,
    exhausted: bool,
}

impl JournalReader {
    /// Opens a journal file for reading and validates its header.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if the file cannot be opened or the header is
    /// invalid.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, JournalError> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();

        if file_size < HEADER_SIZE as u64 {
            return Err(JournalError::HeaderTruncated { len: file_size });
        }
        file.seek(io::SeekFrom::Start(0))?;
        let mut header_bytes = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_bytes)?;
        check_header(&header_bytes)?;

        Ok(Self {
            file: BufReader::new(file),
            mode,
            position: HEADER_SIZE as u64,
            file_size,
            exhausted: false,
        })
    }

    /// Returns the offset just past the last complete frame read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads and decodes the next frame.
    ///
    /// Returns `Ok(None)` at end-of-file, and at a truncated frame in
    /// permissive mode.
    pub fn read_frame(&mut self) -> Result<Option<Frame>, JournalError> {
        match self.next_payload()? {
            Some((kind, payload)) => Frame::decode(kind, payload).map(Some),
            None => Ok(None),
        }
    }

    /// Moves past the next complete frame without decoding it.
    pub(crate) fn skip_frame(&mut self) -> Result<bool, JournalError> {
        Ok(self.next_payload()?.is_some())
    }

    fn next_payload(&mut self) -> Result<Option<(u8, Vec<u8>)>, JournalError> {
        if self.exhausted || self.position >= self.file_size {
            return Ok(None);
        }

        let frame_offset = self.position;
        let mut prefix = [0u8; FRAME_HEADER_SIZE];
        if !self.read_fully(&mut prefix, frame_offset)? {
            return Ok(None);
        }
        let (kind, len) = parse_prefix(&prefix, frame_offset)?;

        let mut payload = vec![0u8; len as usize];
        if !self.read_fully(&mut payload, frame_offset)? {
            return Ok(None);
        }

        self.position = frame_offset + FRAME_HEADER_SIZE as u64 + u64::from(len);
        Ok(Some((kind, payload)))
    }

    /// Reads the next redemption record, skipping unknown frame kinds.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if a frame is invalid, a payload is not a
    /// record, or truncation is detected in strict mode.
    pub fn read_record(&mut self) -> Result<Option<RedemptionRecord>, JournalError> {
        loop {
            match self.read_frame()? {
                None => return Ok(None),
                Some(Frame::Redemption(record)) => return Ok(Some(record)),
                Some(Frame::Opaque { .. }) => continue,
            }
        }
    }

    /// Reads every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<RedemptionRecord>, JournalError> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    // Returns false when the buffer could not be filled and the mode allows
    // treating that as end-of-file.
    fn read_fully(&mut self, buf: &mut [u8], frame_offset: u64) -> Result<bool, JournalError> {
        match self.file.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                if self.mode == ReadMode::Permissive {
                    self.exhausted = true;
                    Ok(false)
                } else {
                    Err(JournalError::TruncatedFrame {
                        offset: frame_offset,
                    })
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}
