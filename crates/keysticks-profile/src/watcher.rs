use std::sync::mpsc;
use std::time::Duration;
use std::{fs, path::Path};

use notify::{Config, Error as NotifyError, RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{
    new_debouncer_opt, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use thiserror::Error;

use crate::{parse_profile, source::Source, ProfileError};

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ProfileError),
}

/// Watches a profile file and re-parses it whenever it settles.
pub struct ProfileWatcher {
    #[allow(dead_code)]
    watcher: Debouncer<RecommendedWatcher>,
}

pub enum ProfileEvent {
    Changed(Box<Source>),
    Removed,
    Error(WatcherError),
}

type ProfileEventSender = mpsc::Sender<ProfileEvent>;
pub type ProfileEventReceiver = mpsc::Receiver<ProfileEvent>;

const DEBOUNCE_TIMEOUT: Duration = Duration::from_millis(1000);

fn send_profile_event(path: &Path, tx: &ProfileEventSender) {
    let event = match fs::read_to_string(path) {
        Ok(content) => match parse_profile(&content) {
            Ok(source) => ProfileEvent::Changed(Box::new(source)),
            Err(e) => ProfileEvent::Error(WatcherError::Parse(e)),
        },
        Err(e) => ProfileEvent::Error(WatcherError::Io(e)),
    };
    let _ = tx.send(event);
}

impl ProfileWatcher {
    pub fn new_with_sender(
        path: &Path,
        tx: ProfileEventSender,
    ) -> Result<Self, WatcherError> {
        let path_c = path.to_owned();

        let debouncer_config = notify_debouncer_mini::Config::default()
            .with_timeout(DEBOUNCE_TIMEOUT)
            .with_notify_config(Config::default());
        let mut debouncer = new_debouncer_opt::<_, RecommendedWatcher>(
            debouncer_config,
            move |events: DebounceEventResult| match events {
                Ok(events) => {
                    let touched = events.iter().any(|event| {
                        matches!(
                            event.kind,
                            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                        )
                    });
                    if !touched {
                        return;
                    }
                    if path_c.exists() {
                        send_profile_event(&path_c, &tx);
                    } else {
                        let _ = tx.send(ProfileEvent::Removed);
                    }
                }
                Err(error) => {
                    let _ = tx.send(ProfileEvent::Error(WatcherError::Notify(error)));
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(path, RecursiveMode::NonRecursive)?;

        Ok(Self { watcher: debouncer })
    }

    pub fn new(path: &Path) -> Result<(Self, ProfileEventReceiver), WatcherError> {
        let (tx, rx) = mpsc::channel();

        Ok((Self::new_with_sender(path, tx)?, rx))
    }

    /// Like [`ProfileWatcher::new`], but the current file contents are
    /// delivered first.
    pub fn new_with_starting_event(
        path: &Path,
    ) -> Result<(Self, ProfileEventReceiver), WatcherError> {
        let (tx, rx) = mpsc::channel();

        send_profile_event(path, &tx);
        Ok((Self::new_with_sender(path, tx)?, rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_event_reports_missing_file() {
        let (tx, rx) = mpsc::channel();
        send_profile_event(Path::new("/definitely/not/here.yaml"), &tx);
        assert!(matches!(
            rx.try_recv(),
            Ok(ProfileEvent::Error(WatcherError::Io(_)))
        ));
    }

    #[test]
    fn starting_event_carries_parsed_source() {
        let path = std::env::temp_dir().join(format!(
            "keysticks-watcher-{}.yaml",
            std::process::id()
        ));
        fs::write(&path, "version: 1\nname: Watched\n").expect("write");
        let (_watcher, rx) = ProfileWatcher::new_with_starting_event(&path).expect("watcher");
        match rx.try_recv() {
            Ok(ProfileEvent::Changed(source)) => assert_eq!(source.name(), "Watched"),
            _ => panic!("expected a parsed profile"),
        }
        let _ = fs::remove_file(&path);
    }
}
