//! Background loading of metric documents and their per-session state.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        mpsc::{self, Receiver, TryRecvError},
    },
    thread,
};

use indexmap::IndexMap;
use log::{debug, info, warn};

use super::document::{DocumentError, DocumentName, MetricsDocument};
use crate::overlay::Availability;

/// Load state of one document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentState {
    /// The load is still in flight.
    Pending,
    Loaded(Arc<MetricsDocument>),
    /// The load failed; this is final for the session.
    Failed(String),
}

impl DocumentState {
    pub fn document(&self) -> Option<&Arc<MetricsDocument>> {
        match self {
            Self::Loaded(document) => Some(document),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// The result of loading one document.
#[derive(Debug)]
pub struct LoadOutcome {
    pub name: DocumentName,
    pub result: Result<MetricsDocument, DocumentError>,
}

/// Reads metric documents from a results directory.
#[derive(Debug, Clone)]
pub struct MetricsLoader {
    dir: PathBuf,
}

impl MetricsLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `name` inside the results directory.
    pub fn document_path(&self, name: DocumentName) -> PathBuf {
        self.dir.join(name.file_name())
    }

    /// Reads and parses one document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Io`] if the file cannot be read, or a parse
    /// error from [`MetricsDocument::from_json_str`].
    pub fn load(&self, name: DocumentName) -> Result<MetricsDocument, DocumentError> {
        let path = self.document_path(name);
        debug!(document = name.as_str(), path:? = path; "Reading metric document");

        let json = fs::read_to_string(&path).map_err(|source| DocumentError::Io {
            path: path.clone(),
            source,
        })?;
        MetricsDocument::from_json_str(name, &json)
    }

    /// Loads every document on the calling thread.
    pub fn load_all(&self) -> Vec<LoadOutcome> {
        DocumentName::ALL
            .into_iter()
            .map(|name| LoadOutcome {
                name,
                result: self.load(name),
            })
            .collect()
    }

    /// Loads every document on a background thread.
    ///
    /// Outcomes arrive through the returned [`PendingLoads`] in the order
    /// they complete.
    pub fn spawn(self) -> PendingLoads {
        let (sender, receiver) = mpsc::channel();
        info!(dir:? = self.dir; "Loading metric documents");

        thread::spawn(move || {
            for name in DocumentName::ALL {
                let outcome = LoadOutcome {
                    name,
                    result: self.load(name),
                };
                // The receiver is gone once the session ends.
                if sender.send(outcome).is_err() {
                    break;
                }
            }
        });

        PendingLoads {
            receiver,
            finished: false,
        }
    }
}

/// Receiving end of a background load.
#[derive(Debug)]
pub struct PendingLoads {
    receiver: Receiver<LoadOutcome>,
    finished: bool,
}

impl PendingLoads {
    /// Returns a completed outcome without blocking.
    pub fn try_next(&mut self) -> Option<LoadOutcome> {
        if self.finished {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                None
            }
        }
    }

    /// Blocks until the next outcome, or returns `None` once all arrived.
    pub fn wait(&mut self) -> Option<LoadOutcome> {
        if self.finished {
            return None;
        }
        match self.receiver.recv() {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                self.finished = true;
                None
            }
        }
    }

    /// Returns `true` once the loader thread has delivered everything.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Per-session record of every document's [`DocumentState`].
#[derive(Debug, Clone)]
pub struct MetricsStore {
    states: IndexMap<DocumentName, DocumentState>,
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsStore {
    /// Creates a store with every document Pending.
    pub fn new() -> Self {
        Self {
            states: DocumentName::ALL
                .into_iter()
                .map(|name| (name, DocumentState::Pending))
                .collect(),
        }
    }

    /// Records a load outcome.
    ///
    /// Documents are written once: an outcome for a document that already
    /// left Pending is ignored and `false` is returned.
    pub fn apply(&mut self, outcome: LoadOutcome) -> bool {
        let LoadOutcome { name, result } = outcome;
        let state = self.states.entry(name).or_insert(DocumentState::Pending);
        if !state.is_pending() {
            warn!(document = name.as_str(); "Ignoring repeated load outcome");
            return false;
        }

        *state = match result {
            Ok(document) => {
                info!(
                    document = name.as_str(),
                    entries = document.entries().count();
                    "Metric document loaded"
                );
                DocumentState::Loaded(Arc::new(document))
            }
            Err(err) => {
                warn!(document = name.as_str(), err:err; "Metric document unavailable");
                DocumentState::Failed(err.to_string())
            }
        };
        true
    }

    pub fn state(&self, name: DocumentName) -> &DocumentState {
        self.states.get(&name).unwrap_or(&DocumentState::Pending)
    }

    /// The loaded document, or `None` while Pending or after a failure.
    pub fn get(&self, name: DocumentName) -> Option<Arc<MetricsDocument>> {
        self.state(name).document().cloned()
    }

    /// Combined availability of `names`.
    ///
    /// Any failure makes the set Unavailable; otherwise it is Ready only
    /// once every document is Loaded.
    pub fn availability(&self, names: &[DocumentName]) -> Availability {
        let states: Vec<_> = names.iter().map(|name| self.state(*name)).collect();
        if states
            .iter()
            .any(|state| matches!(state, DocumentState::Failed(_)))
        {
            Availability::Unavailable
        } else if states.iter().all(|state| state.document().is_some()) {
            Availability::Ready
        } else {
            Availability::Loading
        }
    }

    /// Returns `true` while any document is still Pending.
    pub fn has_pending(&self) -> bool {
        self.states.values().any(DocumentState::is_pending)
    }
}
