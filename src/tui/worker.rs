use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};

use crate::api::{ApiResult, SelectedFile, TaskApi};
use crate::board::{self, Completion, Request};

pub enum Job {
    Run(Request),
    ReadFile(PathBuf),
}

pub enum WorkerEvent {
    Completed(Completion),
    FileRead(ApiResult<SelectedFile>),
}

/// Runs API requests and file reads off the UI thread, one at a time, in
/// submission order.
pub struct Worker {
    jobs: Option<Sender<Job>>,
    events: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn<A>(api: A) -> Result<Self>
    where
        A: TaskApi + Send + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("taskboard-worker".into())
            .spawn(move || {
                for job in job_rx {
                    let event = match job {
                        Job::Run(request) => WorkerEvent::Completed(board::execute(&api, &request)),
                        Job::ReadFile(path) => WorkerEvent::FileRead(SelectedFile::read(path)),
                    };
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
                tracing::debug!("worker exiting");
            })
            .context("failed to spawn request worker")?;

        Ok(Worker {
            jobs: Some(job_tx),
            events: event_rx,
            handle: Some(handle),
        })
    }

    pub fn submit(&self, job: Job) -> Result<()> {
        self.jobs
            .as_ref()
            .and_then(|tx| tx.send(job).ok())
            .ok_or_else(|| anyhow!("request worker stopped"))
    }

    /// Next finished job, if any. Never blocks.
    pub fn try_next(&self) -> Result<Option<WorkerEvent>> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(anyhow!("request worker stopped")),
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop once the current job finishes.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::api::{ApiError, Task, TaskStatus};
    use crate::board::Outcome;

    struct StaticApi;

    impl TaskApi for StaticApi {
        fn list_tasks(&self) -> ApiResult<Vec<Task>> {
            Ok(vec![Task {
                id: 1,
                title: "only".into(),
                status: TaskStatus::Todo,
                image_url: None,
            }])
        }

        fn create_task(&self, _: &str, _: Option<&str>) -> ApiResult<Option<Task>> {
            unreachable!()
        }

        fn delete_task(&self, _: i64) -> ApiResult<()> {
            unreachable!()
        }

        fn set_status(&self, _: i64, _: TaskStatus) -> ApiResult<Option<Task>> {
            unreachable!()
        }

        fn set_image(&self, _: i64, _: &str) -> ApiResult<Option<Task>> {
            unreachable!()
        }

        fn upload_image(&self, _: &SelectedFile) -> ApiResult<String> {
            unreachable!()
        }
    }

    fn wait(worker: &Worker) -> WorkerEvent {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(event) = worker.try_next().unwrap() {
                return event;
            }
            assert!(Instant::now() < deadline, "worker did not answer");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn runs_requests_in_the_background() {
        let worker = Worker::spawn(StaticApi).unwrap();
        worker.submit(Job::Run(Request::Load)).unwrap();
        match wait(&worker) {
            WorkerEvent::Completed(Completion {
                outcome: Outcome::Reloaded(tasks),
                ..
            }) => assert_eq!(tasks.len(), 1),
            _ => panic!("expected a reload"),
        }
    }

    #[test]
    fn reports_unreadable_files() {
        let worker = Worker::spawn(StaticApi).unwrap();
        worker
            .submit(Job::ReadFile(PathBuf::from("/no/such/file.png")))
            .unwrap();
        match wait(&worker) {
            WorkerEvent::FileRead(Err(ApiError::File { .. })) => {}
            _ => panic!("expected a file error"),
        }
    }
}
