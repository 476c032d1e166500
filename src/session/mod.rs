//! Background job runner.
//!
//! A job moves a [`Pipeline`] onto its own worker thread, rewires its relay to a channel and
//! returns the receiving end together with the join handle. Events arrive in emission order and
//! the channel closes when the worker finishes, so draining `events` to the end and then calling
//! [`JobHandle::join`] never blocks on a live worker.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;

use crate::assemble::batch::BatchResult;
use crate::assemble::folder::Pipeline;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::relay::{ChannelSink, LogEvent, Relay};

/// Running job: its event stream and the eventual result.
#[derive(Debug)]
pub struct JobHandle<T> {
    /// Log events emitted by the worker.
    pub events: mpsc::Receiver<LogEvent>,
    handle: JoinHandle<SlidecastResult<T>>,
}

impl<T> JobHandle<T> {
    /// Call `on_event` for every event until the worker finishes, then return its result.
    pub fn follow(self, mut on_event: impl FnMut(LogEvent)) -> SlidecastResult<T> {
        for event in self.events.iter() {
            on_event(event);
        }
        join_worker(self.handle)
    }

    /// Wait for the worker and return its result. Undelivered events are dropped.
    pub fn join(self) -> SlidecastResult<T> {
        join_worker(self.handle)
    }
}

fn join_worker<T>(handle: JoinHandle<SlidecastResult<T>>) -> SlidecastResult<T> {
    handle
        .join()
        .map_err(|_| SlidecastError::Other(anyhow::anyhow!("worker thread panicked")))?
}

fn spawn<T, F>(pipeline: Pipeline, name: &str, job: F) -> SlidecastResult<JobHandle<T>>
where
    T: Send + 'static,
    F: FnOnce(&Pipeline) -> SlidecastResult<T> + Send + 'static,
{
    let (sink, events) = ChannelSink::channel();
    let pipeline = pipeline.with_relay(Relay::new(sink));
    let handle = std::thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || job(&pipeline))
        .map_err(|e| SlidecastError::Other(anyhow::anyhow!("failed to spawn worker: {e}")))?;
    Ok(JobHandle { events, handle })
}

/// Assemble one folder on a background thread.
pub fn spawn_folder(pipeline: Pipeline, folder: PathBuf) -> SlidecastResult<JobHandle<PathBuf>> {
    spawn(pipeline, "slidecast-folder", move |p| p.assemble(&folder))
}

/// Process every subfolder of `parent` on a background thread.
pub fn spawn_batch(pipeline: Pipeline, parent: PathBuf) -> SlidecastResult<JobHandle<BatchResult>> {
    spawn(pipeline, "slidecast-batch", move |p| p.process_all(&parent))
}

#[cfg(test)]
#[path = "../../tests/unit/session/mod.rs"]
mod tests;
