//! Handing work to the toolkit's event thread.
//!
//! The OS thread never calls into the toolkit directly. It posts a job, the
//! job runs later on the event thread, and the poster never waits for it.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

/// A unit of work for the event thread.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// "Run this later on the toolkit's event thread."
///
/// Jobs posted from one thread run in the order they were posted. There is
/// no completion signal.
pub trait EventThread: Send + Sync {
    /// Queue `job`. Never blocks.
    fn post(&self, job: Job);
}

/// Posting end of an [`EventQueue`].
#[derive(Clone)]
pub struct EventPoster {
    sender: Sender<Job>,
}

impl EventThread for EventPoster {
    fn post(&self, job: Job) {
        if self.sender.send(job).is_err() {
            log::warn!("event thread has stopped; dropping job");
        }
    }
}

/// A FIFO of jobs run by whichever thread pumps it.
///
/// Toolkits that own their event loop pump with [`drain`](Self::drain) once
/// per iteration; [`spawn_event_thread`] runs a dedicated thread on
/// [`run`](Self::run).
pub struct EventQueue {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// A handle for posting onto this queue from any thread.
    #[must_use]
    pub fn poster(&self) -> EventPoster {
        EventPoster {
            sender: self.sender.clone(),
        }
    }

    /// Run every job queued so far (and any they queue) on the calling
    /// thread. Returns how many ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Number of jobs waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run jobs as they arrive until every [`EventPoster`] has been dropped.
    pub fn run(self) {
        let Self { sender, receiver } = self;
        drop(sender);
        for job in receiver {
            job();
        }
    }
}

/// Start a named thread that runs posted jobs until every poster is gone.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be spawned.
pub fn spawn_event_thread(name: &str) -> io::Result<(EventPoster, JoinHandle<()>)> {
    let queue = EventQueue::new();
    let poster = queue.poster();
    let handle = thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || queue.run())?;
    Ok((poster, handle))
}
