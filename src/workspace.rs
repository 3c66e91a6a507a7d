// Workspace folder membership for resolved directory links.

use std::path::Path;

use url::Url;

use crate::link::LinkError;

/// Answers whether a URI lies inside the active workspace.
pub trait WorkspaceMembership {
    fn is_inside_workspace(&self, uri: &Url) -> bool;
}

/// A fixed set of workspace root folders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceFolders {
    folders: Vec<Url>,
    ignore_path_casing: bool,
}

impl WorkspaceFolders {
    pub fn new(folders: Vec<Url>, ignore_path_casing: bool) -> Self {
        Self {
            folders,
            ignore_path_casing,
        }
    }

    /// Build from absolute filesystem paths.
    pub fn from_paths<P: AsRef<Path>>(
        paths: &[P],
        ignore_path_casing: bool,
    ) -> Result<Self, LinkError> {
        let folders = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                Url::from_directory_path(path)
                    .map_err(|()| LinkError::InvalidPath(path.display().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(folders, ignore_path_casing))
    }

    pub fn folders(&self) -> &[Url] {
        &self.folders
    }
}

impl WorkspaceMembership for WorkspaceFolders {
    fn is_inside_workspace(&self, uri: &Url) -> bool {
        self.folders
            .iter()
            .any(|folder| is_equal_or_parent(uri, folder, self.ignore_path_casing))
    }
}

/// Returns true if `uri` equals `parent` or lies beneath it.
///
/// Scheme and host must match; paths are compared segment by segment, so
/// `/ws/a` is not a parent of `/ws/ab`. Trailing slashes are ignored.
pub fn is_equal_or_parent(uri: &Url, parent: &Url, ignore_path_casing: bool) -> bool {
    if uri.scheme() != parent.scheme() {
        return false;
    }
    let host = |u: &Url| u.host_str().map(str::to_ascii_lowercase);
    if host(uri) != host(parent) {
        return false;
    }

    let child_segments = segments(uri);
    let parent_segments = segments(parent);
    if parent_segments.len() > child_segments.len() {
        return false;
    }
    parent_segments
        .iter()
        .zip(&child_segments)
        .all(|(p, c)| {
            if ignore_path_casing {
                p.to_lowercase() == c.to_lowercase()
            } else {
                p == c
            }
        })
}

fn segments(uri: &Url) -> Vec<&str> {
    uri.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}
