//! Host blocks and the ordered document they live in
//!
//! The parser is line oriented and only understands `Host` and `Match`
//! headers. Everything else is kept verbatim so that lines the tool does not
//! own are written back exactly where they were found.

use crate::error::{Result, SshdError};

/// Indentation used for directives of blocks created by the tool.
const INDENT: &str = "    ";

/// Directive spellings used when the tool writes or compares keys.
const CANONICAL_DIRECTIVES: &[&str] = &[
    "AddKeysToAgent",
    "CertificateFile",
    "Compression",
    "ControlMaster",
    "ControlPath",
    "ControlPersist",
    "DynamicForward",
    "ForwardAgent",
    "GSSAPIAuthentication",
    "GSSAPIDelegateCredentials",
    "HostName",
    "IdentitiesOnly",
    "IdentityFile",
    "LocalForward",
    "LogLevel",
    "Port",
    "PreferredAuthentications",
    "ProxyCommand",
    "ProxyJump",
    "RemoteForward",
    "ServerAliveCountMax",
    "ServerAliveInterval",
    "StrictHostKeyChecking",
    "User",
    "UserKnownHostsFile",
];

/// Canonical spelling of a directive name; unknown names are returned as given.
pub fn canonical_directive(name: &str) -> String {
    CANONICAL_DIRECTIVES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(name))
        .map(|known| known.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Split `Key Value`, `Key=Value` or `Key = Value`.
fn split_keyword(line: &str) -> (&str, &str) {
    let line = line.trim();
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let (key, rest) = line.split_at(end);
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    (key, rest.trim())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// A single `Name value` line inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    name: String,
    value: String,
    /// Original text for directives read from disk.
    raw: Option<String>,
}

impl Directive {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: canonical_directive(name),
            value: value.into(),
            raw: None,
        }
    }

    fn parse(line: &str) -> Self {
        let (key, value) = split_keyword(line);
        Self {
            name: canonical_directive(key),
            value: unquote(value).to_string(),
            raw: Some(line.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn render(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None if self.value.chars().any(char::is_whitespace) => {
                format!("{INDENT}{} \"{}\"", self.name, self.value)
            }
            None => format!("{INDENT}{} {}", self.name, self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Directive(Directive),
    Comment(String),
}

/// A `Host <pattern>` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBlock {
    alias: String,
    /// Header text as read from disk.
    header: Option<String>,
    /// Comment lines directly above the header.
    leading: Vec<String>,
    lines: Vec<Line>,
}

impl HostBlock {
    /// Create a block with the given directives, in order.
    pub fn new<I, K, V>(alias: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            alias: alias.into(),
            header: None,
            leading: Vec::new(),
            lines: options
                .into_iter()
                .map(|(k, v)| Line::Directive(Directive::new(k.as_ref(), v)))
                .collect(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Value of the first directive named `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.directives()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .map(|d| d.value.as_str())
    }

    /// Directives in file order.
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.lines.iter().filter_map(|line| match line {
            Line::Directive(d) => Some(d),
            Line::Comment(_) => None,
        })
    }

    fn render(&self, out: &mut Vec<String>) {
        out.extend(self.leading.iter().cloned());
        out.push(
            self.header
                .clone()
                .unwrap_or_else(|| format!("Host {}", self.alias)),
        );
        for line in &self.lines {
            match line {
                Line::Directive(d) => out.push(d.render()),
                Line::Comment(c) => out.push(c.clone()),
            }
        }
    }
}

/// A top-level section of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Host(HostBlock),
    /// `Match` sections are carried through untouched.
    Opaque { leading: Vec<String>, lines: Vec<String> },
}

impl Section {
    fn host(&self) -> Option<&HostBlock> {
        match self {
            Section::Host(block) => Some(block),
            Section::Opaque { .. } => None,
        }
    }

    fn push_line(&mut self, line: &str, is_comment: bool) {
        match self {
            Section::Host(block) if is_comment => block.lines.push(Line::Comment(line.to_string())),
            Section::Host(block) => block.lines.push(Line::Directive(Directive::parse(line))),
            Section::Opaque { lines, .. } => lines.push(line.to_string()),
        }
    }

    fn render(&self) -> Vec<String> {
        let mut out = Vec::new();
        match self {
            Section::Host(block) => block.render(&mut out),
            Section::Opaque { leading, lines } => {
                out.extend(leading.iter().cloned());
                out.extend(lines.iter().cloned());
            }
        }
        out
    }
}

/// The whole configuration file: global lines followed by ordered sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    preamble: Vec<String>,
    sections: Vec<Section>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration text.
    ///
    /// A run of comments that starts after a blank line and ends at a header
    /// is attached to that header, so it moves (or disappears) with its block.
    pub fn parse(content: &str) -> Self {
        let mut doc = ConfigDocument::new();
        let mut pending: Vec<String> = Vec::new();
        let mut after_blank = true;

        for raw in content.lines() {
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                doc.flush_comments(&mut pending);
                after_blank = true;
                continue;
            }

            if trimmed.starts_with('#') {
                if after_blank || !pending.is_empty() {
                    pending.push(raw.to_string());
                } else {
                    doc.push_line(raw, true);
                }
                continue;
            }

            after_blank = false;
            let (keyword, value) = split_keyword(trimmed);

            if keyword.eq_ignore_ascii_case("host") {
                doc.sections.push(Section::Host(HostBlock {
                    alias: value.to_string(),
                    header: Some(raw.to_string()),
                    leading: std::mem::take(&mut pending),
                    lines: Vec::new(),
                }));
            } else if keyword.eq_ignore_ascii_case("match") {
                doc.sections.push(Section::Opaque {
                    leading: std::mem::take(&mut pending),
                    lines: vec![raw.to_string()],
                });
            } else {
                doc.flush_comments(&mut pending);
                doc.push_line(raw, false);
            }
        }

        doc.flush_comments(&mut pending);
        doc
    }

    fn flush_comments(&mut self, pending: &mut Vec<String>) {
        for comment in pending.drain(..) {
            self.push_line(&comment, true);
        }
    }

    fn push_line(&mut self, line: &str, is_comment: bool) {
        match self.sections.last_mut() {
            Some(section) => section.push_line(line, is_comment),
            None => self.preamble.push(line.to_string()),
        }
    }

    /// Render the document.
    ///
    /// Trailing whitespace is trimmed, blank lines inside sections are
    /// dropped and sections are separated by exactly one blank line.
    pub fn render(&self) -> String {
        let mut chunks: Vec<Vec<String>> = Vec::new();
        if !self.preamble.is_empty() {
            chunks.push(self.preamble.clone());
        }
        chunks.extend(self.sections.iter().map(Section::render));

        let chunks: Vec<String> = chunks
            .into_iter()
            .map(|lines| {
                lines
                    .iter()
                    .map(|line| line.trim_end())
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .filter(|chunk| !chunk.is_empty())
            .collect();

        if chunks.is_empty() {
            String::new()
        } else {
            let mut text = chunks.join("\n\n");
            text.push('\n');
            text
        }
    }

    /// Host aliases in document order.
    pub fn hosts(&self) -> Vec<&str> {
        self.blocks().map(HostBlock::alias).collect()
    }

    /// Host blocks in document order.
    pub fn blocks(&self) -> impl Iterator<Item = &HostBlock> {
        self.sections.iter().filter_map(Section::host)
    }

    /// Get a block by alias
    pub fn block(&self, alias: &str) -> Option<&HostBlock> {
        self.blocks().find(|b| b.alias == alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.block(alias).is_some()
    }

    /// Insert `block` right before the block aliased `before`, or at the end
    /// when `before` is `None` or unknown.
    pub fn add_block(&mut self, block: HostBlock, before: Option<&str>) -> Result<()> {
        if self.contains(&block.alias) {
            return Err(SshdError::DuplicateAlias(block.alias));
        }

        let position = before.and_then(|anchor| {
            self.sections
                .iter()
                .position(|s| s.host().is_some_and(|b| b.alias == anchor))
        });

        match position {
            Some(index) => self.sections.insert(index, Section::Host(block)),
            None => self.sections.push(Section::Host(block)),
        }
        Ok(())
    }

    /// Remove every block aliased `alias`. Returns how many were removed.
    pub fn remove_block(&mut self, alias: &str) -> usize {
        let before = self.sections.len();
        self.sections
            .retain(|s| !s.host().is_some_and(|b| b.alias == alias));
        before - self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_hosts() {
        let config = r#"
Host web
    HostName web.example.com
    User www

Host db
    hostname=db.example.com
    Port 5432
"#;
        let doc = ConfigDocument::parse(config);
        assert_eq!(doc.hosts(), vec!["web", "db"]);
        assert_eq!(doc.block("web").unwrap().get("hostname"), Some("web.example.com"));
        assert_eq!(doc.block("db").unwrap().get("HostName"), Some("db.example.com"));

        let names: Vec<&str> = doc.block("db").unwrap().directives().map(Directive::name).collect();
        assert_eq!(names, vec!["HostName", "Port"]);
    }

    #[test]
    fn test_multi_pattern_header_is_one_block() {
        let doc = ConfigDocument::parse("Host foo bar\n    HostName shared.example.com\n");
        assert_eq!(doc.hosts(), vec!["foo bar"]);
    }

    #[test]
    fn test_untouched_lines_pass_through() {
        let config = "\
# global settings
ServerAliveInterval 60

Host legacy
  HostName old.example.com
  # keep me
  SomeUnknownDirective=value

Match host *.internal exec \"true\"
  User ops
";
        let doc = ConfigDocument::parse(config);
        assert_eq!(doc.render(), config);
    }

    #[test]
    fn test_render_collapses_blank_lines_and_trailing_space() {
        let config = "Host a   \n    HostName a.example.com  \n\n\n\nHost b\n\n    HostName b.example.com\n\n\n";
        let doc = ConfigDocument::parse(config);
        let text = doc.render();
        assert_eq!(
            text,
            "Host a\n    HostName a.example.com\n\nHost b\n    HostName b.example.com\n"
        );
        assert!(!text.contains("\n\n\n"));
        assert!(text.lines().all(|l| l.trim_end() == l));
    }

    #[test]
    fn test_leading_comment_moves_with_block() {
        let config = "Host a\n    HostName a\n\n# the database\nHost db\n    HostName db\n";
        let mut doc = ConfigDocument::parse(config);
        doc.remove_block("db");
        assert_eq!(doc.render(), "Host a\n    HostName a\n");
    }

    #[test]
    fn test_add_block_before_anchor() {
        let mut doc = ConfigDocument::parse("Host a\n    HostName a\n\nHost b\n    HostName b\n");
        doc.add_block(HostBlock::new("new", [("hostname", "n")]), Some("b"))
            .unwrap();
        assert_eq!(doc.hosts(), vec!["a", "new", "b"]);

        doc.add_block(HostBlock::new("last", [("HostName", "l")]), Some("missing"))
            .unwrap();
        assert_eq!(doc.hosts(), vec!["a", "new", "b", "last"]);
        assert!(doc.render().contains("Host new\n    HostName n\n"));
    }

    #[test]
    fn test_add_duplicate_alias_fails() {
        let mut doc = ConfigDocument::parse("Host a\n    HostName a\n");
        let err = doc
            .add_block(HostBlock::new("a", [("HostName", "b")]), None)
            .unwrap_err();
        assert!(matches!(err, SshdError::DuplicateAlias(alias) if alias == "a"));
        assert_eq!(doc.block("a").unwrap().get("HostName"), Some("a"));
    }

    #[test]
    fn test_remove_block_is_idempotent() {
        let mut doc = ConfigDocument::parse("Host a\n    HostName a\n\nHost a\n    HostName b\n");
        assert_eq!(doc.remove_block("a"), 2);
        assert_eq!(doc.remove_block("a"), 0);
        assert!(doc.hosts().is_empty());
        assert_eq!(doc.render(), "");
    }

    #[test]
    fn test_values_with_spaces_are_quoted() {
        let block = HostBlock::new("k", [("IdentityFile", "/home/me/my keys/id")]);
        let mut doc = ConfigDocument::new();
        doc.add_block(block, None).unwrap();
        let text = doc.render();
        assert!(text.contains("IdentityFile \"/home/me/my keys/id\""));

        let reparsed = ConfigDocument::parse(&text);
        assert_eq!(
            reparsed.block("k").unwrap().get("identityfile"),
            Some("/home/me/my keys/id")
        );
    }

    #[test]
    fn test_canonical_directive() {
        assert_eq!(canonical_directive("stricthostkeychecking"), "StrictHostKeyChecking");
        assert_eq!(canonical_directive("XAuthLocation"), "XAuthLocation");
    }
}
