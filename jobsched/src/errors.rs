// thiserror-based error types
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    #[error("heap is empty")] HeapEmpty,
    #[error("scheduler has not been started")] NotStarted,
    #[error("scheduler was already started")] AlreadyStarted,
    #[error("scheduler is stopped")] AlreadyStopped,
    #[error("scheduler task is gone")] Shutdown,
}
