mod dispatcher;
mod execution_log;
mod log;
mod retry;
mod router;
mod webhook;
mod worker;

pub use dispatcher::{DispatchError, Dispatcher};
pub use execution_log::{ExecutionLog, ExecutionRecord, ExecutionStatus};
pub use log::LogDispatcher;
pub use retry::RetryDispatcher;
pub use router::ModuleRouter;
pub use webhook::{WebhookDispatcher, SIGNATURE_HEADER};
pub use worker::DispatchWorker;
