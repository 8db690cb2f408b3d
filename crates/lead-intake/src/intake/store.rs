use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::error;

use super::domain::{LeadId, LeadRecord, NewLead};

/// Append-only storage for leads. Implementations assign the id and creation time.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, lead: NewLead) -> Result<LeadRecord, RepositoryError>;
    fn select_all(&self) -> Result<Vec<LeadRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("lead store i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("lead store line {line} is not a valid record: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode lead record: {0}")]
    Encode(#[source] serde_json::Error),
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("lead store lock poisoned".to_string()))
}

/// Process-local store. Leads disappear when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryLeadRepository {
    pub(super) records: Mutex<Vec<LeadRecord>>,
}

impl InMemoryLeadRepository {
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(lock(&self.records)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

impl LeadRepository for InMemoryLeadRepository {
    fn insert(&self, lead: NewLead) -> Result<LeadRecord, RepositoryError> {
        let mut records = lock(&self.records)?;
        let next = records.last().map(|record| record.id().0 + 1).unwrap_or(1);
        let record = LeadRecord::new(LeadId(next), Utc::now(), lead);
        records.push(record.clone());
        Ok(record)
    }

    fn select_all(&self) -> Result<Vec<LeadRecord>, RepositoryError> {
        Ok(lock(&self.records)?.clone())
    }
}

/// Durable store writing one JSON document per line.
///
/// A record is only acknowledged once its whole line has been written and synced; a failed
/// write truncates the file back to its previous length so readers never see half a record.
#[derive(Debug)]
pub struct JsonlLeadRepository {
    path: PathBuf,
    state: Mutex<JsonlState>,
}

/// Append target of the JSONL store.
pub(crate) trait LogFile: Write {
    fn sync_data(&self) -> io::Result<()>;
    fn set_len(&self, len: u64) -> io::Result<()>;
}

impl LogFile for File {
    fn sync_data(&self) -> io::Result<()> {
        File::sync_data(self)
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }
}

/// Write side of the store. Bytes past `committed_len` belong to no acknowledged record.
#[derive(Debug)]
pub(crate) struct JsonlState<F = File> {
    pub(crate) file: F,
    pub(crate) next_id: u64,
    pub(crate) committed_len: u64,
    /// Set when a rollback failed and the file may end in a partial line.
    pub(crate) torn: bool,
}

impl<F: LogFile> JsonlState<F> {
    pub(crate) fn new(file: F, next_id: u64, committed_len: u64) -> Self {
        Self {
            file,
            next_id,
            committed_len,
            torn: false,
        }
    }

    pub(crate) fn append(&mut self, lead: NewLead) -> Result<LeadRecord, RepositoryError> {
        let committed_len = self.committed_len;
        if self.torn {
            self.file.set_len(committed_len).map_err(|err| {
                error!(error = %err, committed_len, "lead store tail is still uncommitted");
                RepositoryError::Unavailable("lead store has an uncommitted tail".to_string())
            })?;
            self.torn = false;
        }

        let record = LeadRecord::new(LeadId(self.next_id), Utc::now(), lead);
        let mut line = serde_json::to_vec(&record).map_err(RepositoryError::Encode)?;
        line.push(b'\n');

        let written = self
            .file
            .write_all(&line)
            .and_then(|()| self.file.sync_data());
        if let Err(err) = written {
            if let Err(rollback) = self.file.set_len(committed_len) {
                error!(error = %rollback, committed_len, "failed to roll back partial lead write");
                self.torn = true;
            }
            return Err(err.into());
        }

        self.committed_len += line.len() as u64;
        self.next_id += 1;
        Ok(record)
    }
}

impl JsonlLeadRepository {
    /// Open (or create) the store at `path`, replaying existing lines to recover the id sequence.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let committed_len = file.metadata()?.len();

        let next_id = read_committed(&path, committed_len)?
            .iter()
            .map(|record| record.id().0)
            .max()
            .map_or(1, |last| last + 1);

        Ok(Self {
            path,
            state: Mutex::new(JsonlState::new(file, next_id, committed_len)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LeadRepository for JsonlLeadRepository {
    fn insert(&self, lead: NewLead) -> Result<LeadRecord, RepositoryError> {
        lock(&self.state)?.append(lead)
    }

    fn select_all(&self) -> Result<Vec<LeadRecord>, RepositoryError> {
        let state = lock(&self.state)?;
        read_committed(&self.path, state.committed_len)
    }
}

/// Decode the first `len` bytes of the store at `path`.
pub(crate) fn read_committed(path: &Path, len: u64) -> Result<Vec<LeadRecord>, RepositoryError> {
    let reader = BufReader::new(File::open(path)?.take(len));
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| RepositoryError::Corrupt {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}
