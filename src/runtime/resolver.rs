//! Background resolution worker.
//!
//! Remote extraction and search block on the network, so they run on a
//! worker thread behind an mpsc channel, like the playback commands do.
//! The worker drains its inbox to the newest job before doing any work
//! (debounce: rapid successive source switches collapse to the last one),
//! and every outcome carries the generation it was requested under so the
//! event loop can drop results for sources that are no longer current.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

use crate::error::Error;
use crate::library::{self, PlaylistSource, Track};
use crate::recents::RecentsLedger;
use crate::remote::{PlaylistExtractor, SearchProvider};

#[derive(Debug)]
pub enum ResolveJob {
    /// Materialize the track list for one source.
    Resolve {
        generation: u64,
        source: PlaylistSource,
    },
    /// Run a free-text search through the search collaborator.
    Search { generation: u64, term: String },
    /// Shut the worker down.
    Quit,
}

pub struct ResolveOutcome {
    pub generation: u64,
    pub result: Result<Vec<Track>, Error>,
}

pub struct ResolverWorker {
    tx: Sender<ResolveJob>,
    rx: Receiver<ResolveOutcome>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl ResolverWorker {
    pub fn new<C>(collaborator: C, recents: RecentsLedger) -> Self
    where
        C: PlaylistExtractor + SearchProvider + Send + 'static,
    {
        let (tx, job_rx) = mpsc::channel::<ResolveJob>();
        let (out_tx, rx) = mpsc::channel::<ResolveOutcome>();

        let join = thread::spawn(move || {
            run_worker(collaborator, recents, job_rx, out_tx);
        });

        Self {
            tx,
            rx,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn submit(&self, job: ResolveJob) {
        let _ = self.tx.send(job);
    }

    pub fn try_recv(&self) -> Option<ResolveOutcome> {
        self.rx.try_recv().ok()
    }

    pub fn quit(&self) {
        let _ = self.tx.send(ResolveJob::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

fn run_worker<C>(
    collaborator: C,
    recents: RecentsLedger,
    job_rx: Receiver<ResolveJob>,
    out_tx: Sender<ResolveOutcome>,
) where
    C: PlaylistExtractor + SearchProvider,
{
    loop {
        let Ok(mut job) = job_rx.recv() else {
            break;
        };

        // Last-request-wins: anything already queued supersedes this job.
        loop {
            match job_rx.try_recv() {
                Ok(newer) => job = newer,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        match job {
            ResolveJob::Quit => break,
            ResolveJob::Resolve { generation, source } => {
                log::debug!("resolving {}", source.name);
                let result = library::resolve(&source, &recents, &collaborator);
                let _ = out_tx.send(ResolveOutcome { generation, result });
            }
            ResolveJob::Search { generation, term } => {
                log::debug!("searching for {term:?}");
                let result = collaborator.search(&term);
                let _ = out_tx.send(ResolveOutcome { generation, result });
            }
        }
    }
}
