mod refresh;

pub use refresh::{RefreshCacheJob, RefreshContext, process_refresh_job, refresh_schedule};
