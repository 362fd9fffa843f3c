//! Download jobs
//!
//! A job is one engine download bound to one HTTP response. The
//! [`JobLauncher`] validates the request, derives the job's options, opens a
//! fresh [`progress_channel`] and spawns a worker; the caller reads the
//! events back through the returned [`StreamHandle`].

mod channel;
mod launcher;

pub use channel::{ProgressReceiver, ProgressSender, progress_channel};
pub use launcher::{JobLauncher, StreamHandle, validate_url};

#[cfg(test)]
mod tests;
