use mime::Mime;

/// A shell style glob paired with the content type it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeRule {
    glob: String,
    mime: Mime,
}

impl MimeRule {
    pub fn new(glob: impl Into<String>, mime: Mime) -> Self {
        Self { glob: glob.into(), mime }
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn mime(&self) -> &Mime {
        &self.mime
    }

    pub fn matches(&self, path: &str) -> bool {
        glob_match(self.glob.as_bytes(), path.as_bytes())
    }
}

/// Ordered MIME rules; the first rule whose glob matches the whole path wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeTable {
    rules: Vec<MimeRule>,
}

impl MimeTable {
    pub fn builder() -> MimeTableBuilder {
        MimeTableBuilder { rules: Vec::new() }
    }

    pub fn lookup(&self, path: &str) -> Option<&Mime> {
        self.rules.iter().find(|rule| rule.matches(path)).map(MimeRule::mime)
    }

    pub fn rules(&self) -> &[MimeRule] {
        &self.rules
    }
}

impl Default for MimeTable {
    /// `*.html` as `text/html`, `*.txt` as `text/plain`.
    fn default() -> Self {
        Self::builder().rule("*.html", mime::TEXT_HTML).rule("*.txt", mime::TEXT_PLAIN).build()
    }
}

#[derive(Debug)]
pub struct MimeTableBuilder {
    rules: Vec<MimeRule>,
}

impl MimeTableBuilder {
    pub fn rule(mut self, glob: impl Into<String>, mime: Mime) -> Self {
        self.rules.push(MimeRule::new(glob, mime));
        self
    }

    pub fn build(self) -> MimeTable {
        MimeTable { rules: self.rules }
    }
}

/// `*` matches any run of bytes, `/` included, and `?` any single byte.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    // position after the last `*` seen, and the text position it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(b'*') => {
                p += 1;
                backtrack = Some((p, t));
            }
            Some(b'?') => {
                p += 1;
                t += 1;
            }
            Some(c) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p.min(pattern.len())..].iter().all(|c| *c == b'*')
}
