use super::grammar::{local_link_regex, OperatingSystem, SuffixForm, PATH_GROUP};

/// A matched link split into its path and optional 1-based line/column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkLocation {
    pub path: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl LinkLocation {
    /// Parse link text such as `src/main.rs:12:4` or `"foo.py", line 3`.
    ///
    /// Returns `None` if the text contains no path at all.
    pub fn parse(text: &str, os: OperatingSystem) -> Option<Self> {
        let captures = local_link_regex(os).captures(text)?;
        let path = captures.name(PATH_GROUP)?.as_str().to_string();

        let (line, column) = match SuffixForm::of(&captures) {
            Some(form) => {
                let number = |group: &str| {
                    captures
                        .name(group)
                        .and_then(|m| m.as_str().parse::<u32>().ok())
                };
                let line = number(form.line_group());
                // A column without a line is meaningless.
                let column = line.and(number(form.column_group()));
                (line, column)
            }
            None => (None, None),
        };

        Some(Self { path, line, column })
    }
}
