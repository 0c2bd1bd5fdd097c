/// A non-empty, non-comment line split into whitespace-separated tokens.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TokenLine<'a> {
    pub number: usize, // 1-based line number in the source file
    pub tokens: Vec<&'a str>,
}

/// Yields the significant lines of a table: text after `#` is dropped and blank lines
/// are skipped.
pub(crate) fn token_lines(content: &str) -> impl Iterator<Item = TokenLine<'_>> {
    content.lines().enumerate().filter_map(|(i, raw)| {
        let text = raw.split_once('#').map_or(raw, |(head, _)| head);
        let tokens: Vec<&str> = text.split_whitespace().collect();
        (!tokens.is_empty()).then_some(TokenLine {
            number: i + 1,
            tokens,
        })
    })
}
