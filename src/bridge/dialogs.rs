use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Native dialog backend used by [`super::FsBridge`].
///
/// Every method returns `None`/empty when the user cancels.
pub trait DialogProvider: Send + Sync {
    fn pick_file(&self) -> Option<PathBuf>;
    fn pick_files(&self) -> Vec<PathBuf>;
    fn pick_directory(&self) -> Option<PathBuf>;
    fn save_file(&self, suggested: &Path) -> Option<PathBuf>;
}

#[derive(Default)]
struct Answers {
    files: VecDeque<Vec<PathBuf>>,
    directories: VecDeque<Option<PathBuf>>,
    saves: VecDeque<Option<PathBuf>>,
}

/// Dialogs answered from pre-recorded queues.
///
/// An exhausted queue behaves like a cancelled dialog.
#[derive(Default)]
pub struct ScriptedDialogs {
    answers: Mutex<Answers>,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    fn answers(&self) -> MutexGuard<'_, Answers> {
        self.answers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Next file pick returns these paths; an empty vec is a cancel
    pub fn push_files<I, P>(&self, paths: I) -> &Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.answers().files.push_back(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn push_directory(&self, directory: Option<impl Into<PathBuf>>) -> &Self {
        self.answers().directories.push_back(directory.map(Into::into));
        self
    }

    pub fn push_save(&self, target: Option<impl Into<PathBuf>>) -> &Self {
        self.answers().saves.push_back(target.map(Into::into));
        self
    }
}

impl DialogProvider for ScriptedDialogs {
    fn pick_file(&self) -> Option<PathBuf> {
        self.answers().files.pop_front().and_then(|paths| paths.into_iter().next())
    }

    fn pick_files(&self) -> Vec<PathBuf> {
        self.answers().files.pop_front().unwrap_or_default()
    }

    fn pick_directory(&self) -> Option<PathBuf> {
        self.answers().directories.pop_front().flatten()
    }

    fn save_file(&self, suggested: &Path) -> Option<PathBuf> {
        let target = self.answers().saves.pop_front().flatten();
        debug!("Save dialog for {} answered with {:?}", suggested.display(), target);
        target
    }
}

/// Headless dialogs: no picks, every directory prompt answers `directory`
/// and every save prompt accepts the suggested name inside it.
pub struct FixedDirectoryDialogs {
    directory: PathBuf,
}

impl FixedDirectoryDialogs {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }
}

impl DialogProvider for FixedDirectoryDialogs {
    fn pick_file(&self) -> Option<PathBuf> {
        None
    }

    fn pick_files(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    fn pick_directory(&self) -> Option<PathBuf> {
        Some(self.directory.clone())
    }

    fn save_file(&self, suggested: &Path) -> Option<PathBuf> {
        let name = suggested.file_name()?;
        Some(self.directory.join(name))
    }
}
