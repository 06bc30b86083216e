/// A named HTTP message used as benchmark input.
#[derive(Debug, Copy, Clone)]
pub struct Fixture {
    name: &'static str,
    content: &'static str,
}

impl Fixture {
    pub const fn new(name: &'static str, content: &'static str) -> Self {
        Self { name, content }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    /// Wire form of the message: fixture files are stored with plain `\n`
    /// line endings and converted to CRLF here.
    pub fn wire(&self) -> String {
        self.content.replace('\n', "\r\n")
    }

    /// Header lines of the message, start line and blank line excluded.
    pub fn header_lines(&self) -> impl Iterator<Item = &'static str> {
        self.content.lines().skip(1).take_while(|line| !line.is_empty())
    }
}

pub static SMALL_REQUEST: Fixture = Fixture::new("get_small", include_str!("../resources/request/get_small.txt"));
pub static LARGE_REQUEST: Fixture = Fixture::new("get_large", include_str!("../resources/request/get_large.txt"));

pub fn request_fixtures() -> [Fixture; 2] {
    [SMALL_REQUEST, LARGE_REQUEST]
}
