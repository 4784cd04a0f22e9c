//! Background log warmer: a detached thread that re-reads the whole log on
//! a fixed period and ships the parsed snapshot to the main world.
//!
//! The snapshot only feeds diagnostics. The render loop keeps its own
//! cursor in `ChatLog` and never reads records from here.

use bevy::prelude::*;
use crossbeam_channel::{Receiver, TrySendError};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use super::read_records;
use crate::settings::LogEncoding;
use crate::shared::ChatRecord;

/// Receiving end of the warmer thread. Dropping it stops the thread.
#[derive(Resource)]
pub struct WarmLogFeed {
    pub receiver: Receiver<Vec<ChatRecord>>,
}

impl WarmLogFeed {
    /// Latest snapshot waiting in the channel, if any (non-blocking).
    pub fn latest(&self) -> Option<Vec<ChatRecord>> {
        self.receiver.try_iter().last()
    }
}

/// Most recent snapshot delivered by the warmer.
#[derive(Resource, Debug, Default, Clone)]
pub struct WarmLog {
    pub records: Vec<ChatRecord>,
    pub refreshes: u64,
}

pub fn spawn_log_warmer(path: PathBuf, encoding: LogEncoding, period: Duration) -> WarmLogFeed {
    let (sender, receiver) = crossbeam_channel::bounded(1);

    thread::spawn(move || loop {
        let snapshot = read_records(&path, encoding).unwrap_or_default();
        match sender.try_send(snapshot) {
            // A full channel means the main world has not caught up; the
            // next snapshot supersedes this one anyway.
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => break,
        }
        thread::sleep(period);
    });

    WarmLogFeed { receiver }
}

/// System: move the newest warm snapshot into `WarmLog`.
pub fn drain_warm_log(feed: Option<Res<WarmLogFeed>>, mut warm: ResMut<WarmLog>) {
    let Some(feed) = feed else {
        return;
    };
    if let Some(records) = feed.latest() {
        warm.records = records;
        warm.refreshes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_warmer_delivers_snapshot() {
        let path = std::env::temp_dir().join(format!("chatfolk_warm_{}.txt", std::process::id()));
        fs::write(&path, "alice: hola\njunk\nbob: adiós\n").unwrap();

        let feed = spawn_log_warmer(path.clone(), LogEncoding::Utf8, Duration::from_millis(10));
        let snapshot = feed
            .receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("warmer should send a snapshot");

        assert_eq!(
            snapshot,
            vec![ChatRecord::new("alice", "hola"), ChatRecord::new("bob", "adiós")]
        );
        drop(feed);
        fs::remove_file(&path).ok();
    }
}
