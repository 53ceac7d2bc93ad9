//! Indentation-aware source writer shared by the emitters

const INDENT: &str = "    ";

/// Line-oriented Rust source builder
#[derive(Debug, Default)]
pub struct SourceWriter {
    output: String,
    depth: usize,
}

impl SourceWriter {
    /// Create a new empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current depth
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.output.push_str(INDENT);
            }
            self.output.push_str(text);
        }
        self.output.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.output.push('\n');
        self
    }

    /// Write a line, then indent what follows
    pub fn open(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(text);
        self.depth += 1;
        self
    }

    /// Dedent, then write a line
    pub fn close(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(text)
    }

    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    /// Append pre-rendered text as-is
    pub fn raw(&mut self, text: &str) -> &mut Self {
        self.output.push_str(text);
        self
    }

    pub fn finish(self) -> String {
        self.output
    }
}
