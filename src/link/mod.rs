pub mod buffer;
pub mod cache;
pub mod detector;
pub mod grammar;
pub mod location;
pub mod resolver;
pub mod scanner;
pub mod validator;

use std::fmt;

use url::Url;

use buffer::BufferRange;

pub use detector::{DetectorOptions, LocalLinkDetector};
pub use grammar::OperatingSystem;
pub use validator::PathResolver;

/// The kind of a detected local link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    LocalFile,
    LocalFolderInWorkspace,
    LocalFolderOutsideWorkspace,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkType::LocalFile => "file",
            LinkType::LocalFolderInWorkspace => "folder-in-workspace",
            LinkType::LocalFolderOutsideWorkspace => "folder-outside-workspace",
        };
        f.write_str(name)
    }
}

/// A link candidate that the resolver confirmed exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub uri: Url,
    /// The candidate text that resolved.
    pub link: String,
    pub is_directory: bool,
}

/// A detected link positioned in the terminal buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLink {
    pub text: String,
    pub uri: Url,
    pub buffer_range: BufferRange,
    pub link_type: LinkType,
}

/// Errors raised while resolving link candidates.
///
/// A candidate that simply does not exist is not an error.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("I/O error resolving '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("resolver error: {0}")]
    Resolver(String),
}
