// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Background work and the frame task queue.
//!
//! Background jobs (large-set sorts, orbit refreshes) never touch
//! render-facing state. They run on an [`Executor`] and hand their results
//! back by posting a [`FrameTask`] through a [`TaskSender`]. The scene graph
//! drains the queue at the start of the next
//! [`update`](crate::scene::SceneGraph::update), on the frame thread, so the
//! renderer never observes a half-applied result.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::scene::SceneGraph;

/// A callback run on the frame thread at the start of the next update.
pub type FrameTask = Box<dyn FnOnce(&mut SceneGraph) + Send>;

/// A unit of background work.
pub type Job = Box<dyn FnOnce() + Send>;

type Queue = Arc<Mutex<Vec<FrameTask>>>;

/// Queue of callbacks waiting for the next frame.
#[derive(Default)]
pub struct FrameTasks {
    queue: Queue,
}

impl core::fmt::Debug for FrameTasks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameTasks")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}

impl FrameTasks {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that posts into this queue from any thread.
    #[must_use]
    pub fn sender(&self) -> TaskSender {
        TaskSender {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Number of queued callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Takes every queued callback, in posting order.
    pub(crate) fn take(&self) -> Vec<FrameTask> {
        core::mem::take(&mut *self.queue.lock())
    }
}

/// Cloneable posting handle for [`FrameTasks`].
#[derive(Clone)]
pub struct TaskSender {
    queue: Queue,
}

impl core::fmt::Debug for TaskSender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskSender").finish_non_exhaustive()
    }
}

impl TaskSender {
    /// Queues `task` for the next frame.
    pub fn post(&self, task: impl FnOnce(&mut SceneGraph) + Send + 'static) {
        self.queue.lock().push(Box::new(task));
    }
}

/// Runs background jobs.
pub trait Executor: core::fmt::Debug + Send + Sync {
    /// Starts `job`. It may run on any thread, at any later time.
    fn spawn(&self, job: Job);
}

/// Runs jobs on the global rayon pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct RayonExecutor;

impl Executor for RayonExecutor {
    fn spawn(&self, job: Job) {
        rayon::spawn(job);
    }
}

/// Runs jobs immediately on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn spawn(&self, job: Job) {
        job();
    }
}

/// Holds jobs until [`run_all`](Self::run_all) is called.
///
/// For hosts that schedule background work themselves, and for
/// deterministic tests.
#[derive(Default)]
pub struct ManualExecutor {
    jobs: Mutex<Vec<Job>>,
}

impl core::fmt::Debug for ManualExecutor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ManualExecutor")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl ManualExecutor {
    /// Creates an executor with no pending jobs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Runs every pending job on the calling thread. Returns how many ran.
    pub fn run_all(&self) -> usize {
        let jobs = core::mem::take(&mut *self.jobs.lock());
        let n = jobs.len();
        for job in jobs {
            job();
        }
        n
    }
}

impl Executor for ManualExecutor {
    fn spawn(&self, job: Job) {
        self.jobs.lock().push(job);
    }
}
