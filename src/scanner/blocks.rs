/// Finds named blocks such as `required_providers { ... }` in raw HCL text.
///
/// This is a best-effort extractor, not an HCL parser: braces are counted
/// without regard for strings or comments, so a `{` inside a quoted value
/// shifts the depth.
pub struct BlockExtractor<'a> {
    keyword: &'a str,
}

impl<'a> BlockExtractor<'a> {
    pub fn new(keyword: &'a str) -> Self {
        Self { keyword }
    }

    /// Every occurrence of the block, from the keyword through its matching
    /// closing brace. Occurrences with no opening brace or no matching close
    /// are skipped.
    pub fn extract<'t>(&self, content: &'t str) -> Vec<&'t str> {
        let mut blocks = Vec::new();
        if self.keyword.is_empty() {
            return blocks;
        }

        let mut cursor = 0;
        while let Some(offset) = content[cursor..].find(self.keyword) {
            let start = cursor + offset;
            let after_keyword = start + self.keyword.len();

            match Self::matching_close(content, after_keyword) {
                Some(end) => {
                    blocks.push(&content[start..=end]);
                    cursor = end + 1;
                }
                None => cursor = after_keyword,
            }
        }

        blocks
    }

    /// Byte index of the `}` closing the first `{` at or after `from`.
    fn matching_close(content: &str, from: usize) -> Option<usize> {
        let open = from + content[from..].find('{')?;
        let mut depth = 0usize;

        for (index, byte) in content.as_bytes()[open..].iter().enumerate() {
            match byte {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + index);
                    }
                }
                _ => {}
            }
        }

        None
    }
}
