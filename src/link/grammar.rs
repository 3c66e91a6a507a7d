// Path and line/column grammars for local link detection.

use std::sync::OnceLock;

use regex::Regex;

/// Platform whose path grammar is used when matching links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Posix,
    Windows,
}

impl OperatingSystem {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            OperatingSystem::Windows
        } else {
            OperatingSystem::Posix
        }
    }
}

// POSIX: `"':;` are legal in paths but usually act as separators, so they end
// the path body. `\` is excluded to keep escaped sequences from matching.
const POSIX_PATH_PREFIX: &str = r"(\.\.?|~)";
const POSIX_PATH_SEPARATOR: &str = "/";
const POSIX_PATH_BODY: &str = r#"[^\x00\s!`&*()\[\]'":;\\]"#;

const WINDOWS_DRIVE_PREFIX: &str = r"(?:\\\\\?\\)?[a-zA-Z]:";
const WINDOWS_PATH_SEPARATOR: &str = r"(\\|/)";
const WINDOWS_PATH_BODY: &str = r#"[^\x00<>\?\|/\s!`&*()\[\]'":;]"#;

/// Name of the capture group holding the whole path.
pub const PATH_GROUP: &str = "path";
/// Name of the capture group holding the whole line/column suffix.
pub const SUFFIX_GROUP: &str = "suffix";

/// Capture groups contributed by every suffix alternative.
pub const SUFFIX_FORM_GROUP_COUNT: usize = 6;

/// Group index of the suffix block in the POSIX link pattern.
pub const UNIX_SUFFIX_MATCH_INDEX: usize = 7;
/// Group index of the suffix block in the Windows link pattern.
pub const WINDOWS_SUFFIX_MATCH_INDEX: usize = 8;

/// Build the pattern fragment matching a bare local path.
///
/// Both variants have the shape `(prefix|body+)?(separator body+)+`. The whole
/// path is captured as [`PATH_GROUP`].
pub fn path_fragment(os: OperatingSystem) -> String {
    match os {
        OperatingSystem::Posix => format!(
            "(?P<{PATH_GROUP}>({prefix}|({body})+)?({sep}({body})+)+)",
            prefix = POSIX_PATH_PREFIX,
            sep = POSIX_PATH_SEPARATOR,
            body = POSIX_PATH_BODY,
        ),
        OperatingSystem::Windows => format!(
            "(?P<{PATH_GROUP}>({prefix}|({body})+)?({sep}({body})+)+)",
            prefix = format!(r"({WINDOWS_DRIVE_PREFIX}|\.\.?|~)"),
            sep = WINDOWS_PATH_SEPARATOR,
            body = WINDOWS_PATH_BODY,
        ),
    }
}

/// The surface forms a line/column suffix can take, in match precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuffixForm {
    /// `"foo.py", line 45` or `"foo.py", line 45 column 3`
    QuotedLine,
    /// `"foo.ts",45` or `"foo.ts",45:3`
    QuotedComma,
    /// `foo.c on line 8` or `foo.c on line 8, column 13`
    OnLine,
    /// `foo.cs:line 8` or `foo.cs:line 8, column 13`
    LineKeyword,
    /// `foo.rs(45)`, `foo.rs (45, 18)`, `foo.rs[45,18]`
    Bracketed,
    /// `foo.rs:336` or `foo.rs:336:9`, and the empty suffix.
    Colon,
}

impl SuffixForm {
    pub const ALL: [SuffixForm; 6] = [
        SuffixForm::QuotedLine,
        SuffixForm::QuotedComma,
        SuffixForm::OnLine,
        SuffixForm::LineKeyword,
        SuffixForm::Bracketed,
        SuffixForm::Colon,
    ];

    /// Name of the group spanning this alternative's whole match.
    pub fn group_name(self) -> &'static str {
        match self {
            SuffixForm::QuotedLine => "quoted_line",
            SuffixForm::QuotedComma => "quoted_comma",
            SuffixForm::OnLine => "on_line",
            SuffixForm::LineKeyword => "line_keyword",
            SuffixForm::Bracketed => "bracketed",
            SuffixForm::Colon => "colon",
        }
    }

    /// Name of the group holding the line number.
    pub fn line_group(self) -> &'static str {
        match self {
            SuffixForm::QuotedLine => "quoted_line_ln",
            SuffixForm::QuotedComma => "quoted_comma_ln",
            SuffixForm::OnLine => "on_line_ln",
            SuffixForm::LineKeyword => "line_keyword_ln",
            SuffixForm::Bracketed => "bracketed_ln",
            SuffixForm::Colon => "colon_ln",
        }
    }

    /// Name of the group holding the column number.
    pub fn column_group(self) -> &'static str {
        match self {
            SuffixForm::QuotedLine => "quoted_line_col",
            SuffixForm::QuotedComma => "quoted_comma_col",
            SuffixForm::OnLine => "on_line_col",
            SuffixForm::LineKeyword => "line_keyword_col",
            SuffixForm::Bracketed => "bracketed_col",
            SuffixForm::Colon => "colon_col",
        }
    }

    /// Returns the alternative that fired for a match of [`local_link_regex`].
    pub fn of(captures: &regex::Captures<'_>) -> Option<SuffixForm> {
        SuffixForm::ALL
            .into_iter()
            .find(|form| captures.name(form.group_name()).is_some())
    }

    // Each alternative has exactly SUFFIX_FORM_GROUP_COUNT groups.
    fn fragment(self) -> String {
        let (name, ln, col) = (self.group_name(), self.line_group(), self.column_group());
        match self {
            SuffixForm::QuotedLine => format!(
                r#"(?P<{name}>(\S*)", line ((?P<{ln}>[0-9]+)( column (?P<{col}>[0-9]+))?))"#
            ),
            SuffixForm::QuotedComma => format!(
                r#"(?P<{name}>(\S*)",((?P<{ln}>[0-9]+)(:(?P<{col}>[0-9]+))?))"#
            ),
            SuffixForm::OnLine => format!(
                r"(?P<{name}>(\S*) on line ((?P<{ln}>[0-9]+)(, column (?P<{col}>[0-9]+))?))"
            ),
            SuffixForm::LineKeyword => format!(
                r"(?P<{name}>(\S*):line ((?P<{ln}>[0-9]+)(, column (?P<{col}>[0-9]+))?))"
            ),
            SuffixForm::Bracketed => format!(
                r"(?P<{name}>([^\s\(\)]*)(\s?[\(\[](?P<{ln}>[0-9]+)(,\s?(?P<{col}>[0-9]+))?)[\)\]])"
            ),
            SuffixForm::Colon => format!(
                r#"(?P<{name}>([^:\s\(\)<>'"\[\]]*)(:(?P<{ln}>[0-9]+))?(:(?P<{col}>[0-9]+))?)"#
            ),
        }
    }
}

/// Build the alternation of all line/column suffix forms.
///
/// Literal spaces also accept a non-breaking space, which some renderers emit
/// in place of a regular one.
pub fn suffix_fragment() -> String {
    SuffixForm::ALL
        .into_iter()
        .map(SuffixForm::fragment)
        .collect::<Vec<_>>()
        .join("|")
        .replace(' ', r"[\x{00A0} ]")
}

/// Group index of the whole suffix block for the given platform's pattern.
pub fn suffix_match_index(os: OperatingSystem) -> usize {
    match os {
        OperatingSystem::Posix => UNIX_SUFFIX_MATCH_INDEX,
        OperatingSystem::Windows => WINDOWS_SUFFIX_MATCH_INDEX,
    }
}

/// Source of the combined path + suffix pattern.
pub fn local_link_pattern(os: OperatingSystem) -> String {
    format!("{}(?P<{SUFFIX_GROUP}>{})", path_fragment(os), suffix_fragment())
}

/// The compiled combined pattern, built once per platform.
pub fn local_link_regex(os: OperatingSystem) -> &'static Regex {
    static POSIX: OnceLock<Regex> = OnceLock::new();
    static WINDOWS: OnceLock<Regex> = OnceLock::new();
    let cell = match os {
        OperatingSystem::Posix => &POSIX,
        OperatingSystem::Windows => &WINDOWS,
    };
    cell.get_or_init(|| {
        Regex::new(&local_link_pattern(os)).expect("local link pattern is a valid regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn group_count(pattern: &str) -> usize {
        // captures_len includes the implicit whole-match group.
        Regex::new(pattern).unwrap().captures_len() - 1
    }

    fn find(os: OperatingSystem, text: &str) -> Option<String> {
        local_link_regex(os)
            .find(text)
            .map(|m| m.as_str().to_string())
    }

    #[test]
    fn posix_path_fragment_has_six_groups() {
        assert_eq!(group_count(&path_fragment(OperatingSystem::Posix)), 6);
    }

    #[test]
    fn windows_path_fragment_has_seven_groups() {
        assert_eq!(group_count(&path_fragment(OperatingSystem::Windows)), 7);
    }

    #[test]
    fn every_suffix_form_has_uniform_group_count() {
        for form in SuffixForm::ALL {
            assert_eq!(
                group_count(&form.fragment()),
                SUFFIX_FORM_GROUP_COUNT,
                "{form:?}"
            );
        }
    }

    #[rstest]
    #[case(OperatingSystem::Posix)]
    #[case(OperatingSystem::Windows)]
    fn suffix_match_index_points_at_named_suffix_group(#[case] os: OperatingSystem) {
        let position = local_link_regex(os)
            .capture_names()
            .position(|name| name == Some(SUFFIX_GROUP));
        assert_eq!(position, Some(suffix_match_index(os)));
    }

    #[rstest]
    #[case(OperatingSystem::Posix)]
    #[case(OperatingSystem::Windows)]
    fn suffix_match_index_locates_line_and_column(#[case] os: OperatingSystem) {
        let caps = local_link_regex(os).captures("foo/bar.ts:45:9").unwrap();
        assert_eq!(&caps[suffix_match_index(os)], ":45:9");
        assert_eq!(&caps[PATH_GROUP], "foo/bar.ts");
    }

    #[rstest]
    #[case("./foo/bar")]
    #[case("../a/b")]
    #[case("~/x")]
    #[case("/etc/hosts")]
    #[case("src/main.rs")]
    #[case("foo/bar.ts")]
    fn posix_paths_match(#[case] path: &str) {
        assert_eq!(find(OperatingSystem::Posix, path).as_deref(), Some(path));
    }

    #[rstest]
    #[case("foo")]
    #[case("hello world")]
    #[case("a;b:c")]
    fn posix_non_paths_do_not_match(#[case] text: &str) {
        assert_eq!(find(OperatingSystem::Posix, text), None);
    }

    #[rstest]
    #[case(r"C:\foo\bar")]
    #[case(r"\\?\C:\foo")]
    #[case(r".\x\y")]
    fn windows_paths_match(#[case] path: &str) {
        assert_eq!(find(OperatingSystem::Windows, path).as_deref(), Some(path));
    }

    #[rstest]
    #[case(r"C:\foo\bar")]
    #[case(r"\\?\C:\foo")]
    #[case(r".\x\y")]
    fn windows_paths_do_not_match_posix_grammar(#[case] path: &str) {
        assert_eq!(find(OperatingSystem::Posix, path), None);
    }

    #[test]
    fn posix_body_stops_at_shell_punctuation() {
        assert_eq!(
            find(OperatingSystem::Posix, "'/foo/bar'").as_deref(),
            Some("/foo/bar")
        );
        assert_eq!(
            find(OperatingSystem::Posix, "(/foo/bar)").as_deref(),
            Some("/foo/bar")
        );
    }

    #[test]
    fn windows_body_accepts_mixed_separators() {
        assert_eq!(
            find(OperatingSystem::Windows, "C:/foo\\bar").as_deref(),
            Some("C:/foo\\bar")
        );
    }

    #[rstest]
    #[case("foo/bar.py\", line 45", SuffixForm::QuotedLine)]
    #[case("foo/bar.py\", line 45 column 3", SuffixForm::QuotedLine)]
    #[case("foo/bar.ts\",45", SuffixForm::QuotedComma)]
    #[case("foo/bar.c on line 8, column 13", SuffixForm::OnLine)]
    #[case("foo/bar.cs:line 8", SuffixForm::LineKeyword)]
    #[case("foo/bar.rs(45)", SuffixForm::Bracketed)]
    #[case("foo/bar.rs (45, 18)", SuffixForm::Bracketed)]
    #[case("foo/bar.rs[45,18]", SuffixForm::Bracketed)]
    #[case("foo/bar.rs:336:9", SuffixForm::Colon)]
    #[case("foo/bar.rs", SuffixForm::Colon)]
    fn suffix_form_reports_the_alternative_that_fired(
        #[case] text: &str,
        #[case] expected: SuffixForm,
    ) {
        let caps = local_link_regex(OperatingSystem::Posix)
            .captures(text)
            .unwrap();
        assert_eq!(SuffixForm::of(&caps), Some(expected));
        assert_eq!(&caps[0], text);
    }

    #[test]
    fn non_breaking_space_is_accepted_in_suffix() {
        let text = "foo/bar.c\u{00A0}on\u{00A0}line\u{00A0}8";
        let caps = local_link_regex(OperatingSystem::Posix)
            .captures(text)
            .unwrap();
        assert_eq!(SuffixForm::of(&caps), Some(SuffixForm::OnLine));
    }
}
