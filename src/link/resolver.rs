// Resolves link candidates against the local filesystem.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use url::Url;

use super::grammar::OperatingSystem;
use super::location::LinkLocation;
use super::validator::PathResolver;
use super::{LinkError, ResolvedLink};

/// Stats candidates relative to a working directory.
#[derive(Debug, Clone)]
pub struct FsPathResolver {
    cwd: PathBuf,
    home: Option<PathBuf>,
    os: OperatingSystem,
}

impl FsPathResolver {
    pub fn new(cwd: impl Into<PathBuf>, os: OperatingSystem) -> Self {
        Self {
            cwd: cwd.into(),
            home: None,
            os,
        }
    }

    /// Directory that a leading `~` expands to.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// The filesystem path a link refers to, without any line/column suffix.
    pub fn local_path(&self, link: &str) -> PathBuf {
        let path = LinkLocation::parse(link, self.os)
            .map(|location| location.path)
            .unwrap_or_else(|| link.to_string());

        let expanded = match (&self.home, strip_home(&path, self.os)) {
            (Some(home), Some(rest)) => home.join(rest),
            _ => PathBuf::from(&path),
        };
        normalize(&self.cwd.join(expanded))
    }
}

impl PathResolver for FsPathResolver {
    async fn resolve(&self, link: &str) -> Result<Option<ResolvedLink>, LinkError> {
        let path = self.local_path(link);
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                log::trace!("No file at {} for link '{link}'", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(LinkError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        let uri = Url::from_file_path(&path)
            .map_err(|()| LinkError::InvalidPath(path.display().to_string()))?;
        Ok(Some(ResolvedLink {
            uri,
            link: link.to_string(),
            is_directory: metadata.is_dir(),
        }))
    }
}

// Returns the remainder after `~`, `~/` or (on Windows) `~\`.
fn strip_home(path: &str, os: OperatingSystem) -> Option<&str> {
    if path == "~" {
        return Some("");
    }
    path.strip_prefix("~/").or_else(|| match os {
        OperatingSystem::Windows => path.strip_prefix("~\\"),
        OperatingSystem::Posix => None,
    })
}

// Lexically removes `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
