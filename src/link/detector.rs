use std::sync::Arc;
use std::time::Duration;

use crate::config::types::Config;
use crate::workspace::WorkspaceMembership;

use super::buffer::{convert_link_range_to_buffer, line_content, BufferLine, LinkRange};
use super::cache::{CacheEntry, LinkValidationCache, DEFAULT_CACHE_TTL};
use super::grammar::OperatingSystem;
use super::scanner::{LinkScanner, MAX_LINE_LENGTH};
use super::validator::{link_candidates, validate_candidates, PathResolver};
use super::{LinkError, LinkType, ResolvedLink, TerminalLink};

/// Settings for a [`LocalLinkDetector`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorOptions {
    pub os: OperatingSystem,
    /// Terminal width in cells.
    pub columns: usize,
    pub enable_caching: bool,
    pub cache_ttl: Duration,
    pub max_line_length: usize,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            os: OperatingSystem::current(),
            columns: 80,
            enable_caching: true,
            cache_ttl: DEFAULT_CACHE_TTL,
            max_line_length: MAX_LINE_LENGTH,
        }
    }
}

impl DetectorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            os: config.links.os.resolve(),
            columns: config.terminal.columns,
            enable_caching: config.links.enable_caching,
            cache_ttl: Duration::from_millis(config.links.cache_ttl_ms),
            max_line_length: config.links.max_line_length,
        }
    }
}

/// Detects local file and folder links in wrapped terminal lines.
pub struct LocalLinkDetector<R, W> {
    scanner: LinkScanner,
    resolver: R,
    workspace: W,
    cache: Arc<LinkValidationCache>,
    options: DetectorOptions,
}

impl<R: PathResolver, W: WorkspaceMembership> LocalLinkDetector<R, W> {
    pub fn new(
        options: DetectorOptions,
        resolver: R,
        workspace: W,
        cache: Arc<LinkValidationCache>,
    ) -> Self {
        Self {
            scanner: LinkScanner::new(options.os).with_max_line_length(options.max_line_length),
            resolver,
            workspace,
            cache,
            options,
        }
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Detect links in the wrapped line made of `lines`, which occupy buffer
    /// rows `start_line..=end_line`.
    ///
    /// Returns links in order of appearance. Lines that are empty or too long
    /// yield no links. Resolver errors abort the pass.
    pub async fn detect(
        &self,
        lines: &[BufferLine],
        start_line: usize,
        end_line: usize,
    ) -> Result<Vec<TerminalLink>, LinkError> {
        if self.options.enable_caching {
            self.cache.schedule_clear(self.options.cache_ttl);
        }

        if end_line < start_line || end_line - start_line + 1 != lines.len() {
            log::debug!(
                "Detecting links in {} rows for buffer lines {start_line}..={end_line}",
                lines.len()
            );
        }

        let text = line_content(lines, self.options.columns);
        let mut links = Vec::new();
        for candidate in self.scanner.scan(&text) {
            let start_column = text[..candidate.offset].chars().count() + 1;
            let range = LinkRange {
                start_column,
                end_column: start_column + candidate.text.chars().count(),
            };
            let buffer_range =
                convert_link_range_to_buffer(lines, self.options.columns, range, start_line);

            let Some(resolved) = self.validate(&candidate.text).await? else {
                continue;
            };

            let link_type = if !resolved.is_directory {
                LinkType::LocalFile
            } else if self.workspace.is_inside_workspace(&resolved.uri) {
                LinkType::LocalFolderInWorkspace
            } else {
                LinkType::LocalFolderOutsideWorkspace
            };
            links.push(TerminalLink {
                text: resolved.link,
                uri: resolved.uri,
                buffer_range,
                link_type,
            });
        }
        Ok(links)
    }

    async fn validate(&self, link: &str) -> Result<Option<ResolvedLink>, LinkError> {
        let candidates = link_candidates(link);
        if !self.options.enable_caching {
            return validate_candidates(&self.resolver, &candidates).await;
        }

        match self.cache.get(link) {
            Some(CacheEntry::Resolved(resolved)) => return Ok(Some(resolved)),
            Some(CacheEntry::NotFound) => return Ok(None),
            None => {}
        }

        let resolved = validate_candidates(&self.resolver, &candidates).await?;
        match &resolved {
            Some(resolved) => self.cache.put_positive(link, resolved.clone()),
            None => self.cache.put_negative(link),
        }
        Ok(resolved)
    }
}
