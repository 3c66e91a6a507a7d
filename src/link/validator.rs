// Ordered validation of link candidates against a path resolver.

use super::{LinkError, ResolvedLink};

/// Resolves a candidate string to an existing file or folder.
///
/// `Ok(None)` means the candidate does not exist. Errors propagate out of
/// detection unchanged.
#[allow(async_fn_in_trait)]
pub trait PathResolver {
    async fn resolve(&self, link: &str) -> Result<Option<ResolvedLink>, LinkError>;
}

/// Candidates to try for a matched link, in priority order.
///
/// Links starting with parent traversals (`../` or `..\`) are also tried with
/// every leading traversal removed.
pub fn link_candidates(link: &str) -> Vec<String> {
    let mut candidates = vec![link.to_string()];
    let mut stripped = link;
    while let Some(rest) = stripped
        .strip_prefix("../")
        .or_else(|| stripped.strip_prefix("..\\"))
    {
        stripped = rest;
    }
    if stripped.len() != link.len() && !stripped.is_empty() {
        candidates.push(stripped.to_string());
    }
    candidates
}

/// Try each candidate in order, returning the first that resolves.
pub async fn validate_candidates<R: PathResolver>(
    resolver: &R,
    candidates: &[String],
) -> Result<Option<ResolvedLink>, LinkError> {
    for candidate in candidates {
        log::trace!("Resolving link candidate '{candidate}'");
        if let Some(resolved) = resolver.resolve(candidate).await? {
            return Ok(Some(resolved));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use url::Url;

    struct Recording {
        existing: Vec<&'static str>,
        failing: Option<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl Recording {
        fn new(existing: Vec<&'static str>) -> Self {
            Self {
                existing,
                failing: None,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PathResolver for Recording {
        async fn resolve(&self, link: &str) -> Result<Option<ResolvedLink>, LinkError> {
            self.calls.borrow_mut().push(link.to_string());
            if self.failing == Some(link) {
                return Err(LinkError::Resolver("boom".to_string()));
            }
            Ok(self.existing.iter().any(|e| *e == link).then(|| ResolvedLink {
                uri: Url::parse(&format!("file:///ws/{link}")).unwrap(),
                link: link.to_string(),
                is_directory: false,
            }))
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plain_link_has_single_candidate() {
        assert_eq!(link_candidates("src/foo.ts"), strings(&["src/foo.ts"]));
        assert_eq!(link_candidates("./src/foo.ts"), strings(&["./src/foo.ts"]));
    }

    #[test]
    fn leading_parent_traversals_are_stripped() {
        assert_eq!(
            link_candidates("../../src/foo.ts"),
            strings(&["../../src/foo.ts", "src/foo.ts"])
        );
        assert_eq!(
            link_candidates(r"..\..\src\foo.ts"),
            strings(&[r"..\..\src\foo.ts", r"src\foo.ts"])
        );
    }

    #[test]
    fn inner_parent_traversal_is_kept() {
        assert_eq!(link_candidates("src/../foo.ts"), strings(&["src/../foo.ts"]));
    }

    #[test]
    fn first_success_wins() {
        let resolver = Recording::new(vec!["a/b", "c/d"]);
        let result =
            pollster::block_on(validate_candidates(&resolver, &strings(&["a/b", "c/d"]))).unwrap();
        assert_eq!(result.unwrap().link, "a/b");
        assert_eq!(*resolver.calls.borrow(), strings(&["a/b"]));
    }

    #[test]
    fn falls_back_in_order() {
        let resolver = Recording::new(vec!["x/y.ts"]);
        let candidates = link_candidates("../../x/y.ts");
        let result = pollster::block_on(validate_candidates(&resolver, &candidates)).unwrap();
        assert_eq!(result.unwrap().link, "x/y.ts");
        assert_eq!(*resolver.calls.borrow(), strings(&["../../x/y.ts", "x/y.ts"]));
    }

    #[test]
    fn none_when_nothing_resolves() {
        let resolver = Recording::new(vec![]);
        let result =
            pollster::block_on(validate_candidates(&resolver, &strings(&["a/b", "c/d"]))).unwrap();
        assert!(result.is_none());
        assert_eq!(resolver.calls.borrow().len(), 2);
    }

    #[test]
    fn resolver_error_propagates_and_stops() {
        let mut resolver = Recording::new(vec!["c/d"]);
        resolver.failing = Some("a/b");
        let result = pollster::block_on(validate_candidates(&resolver, &strings(&["a/b", "c/d"])));
        assert!(matches!(result, Err(LinkError::Resolver(_))));
        assert_eq!(*resolver.calls.borrow(), strings(&["a/b"]));
    }
}
