//! Word wrapping of raw character codes into display rows.

/// Splits a line into spans that fit the display rows.
///
/// The first span fits in `first_width` columns (the rest of the current
/// row), every following span in `width`. Breaks happen at spaces; a word
/// longer than the row is cut hard. Spaces around a break are dropped, a
/// span that fits is returned untouched.
#[derive(Debug, Clone)]
pub(crate) struct Spans<'a> {
    rest: &'a [u8],
    width: usize,
    next_width: usize,
    first: bool,
}

impl<'a> Spans<'a> {
    pub(crate) fn new(line: &'a [u8], first_width: usize, width: usize) -> Self {
        Spans {
            rest: line,
            width: first_width.max(1),
            next_width: width.max(1),
            first: true,
        }
    }
}

impl<'a> Iterator for Spans<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let rest = if self.first {
            self.rest
        } else {
            trim_start(self.rest)
        };
        if rest.is_empty() {
            return None;
        }

        let width = self.width;
        self.width = self.next_width;
        self.first = false;

        if rest.len() <= width {
            self.rest = &[];
            return Some(rest);
        }
        match rest[..=width].iter().rposition(|&c| c == b' ') {
            Some(space) if !rest[..space].iter().all(|&c| c == b' ') => {
                self.rest = &rest[space..];
                Some(trim_end(&rest[..space]))
            }
            _ => {
                let (span, tail) = rest.split_at(width);
                self.rest = tail;
                Some(span)
            }
        }
    }
}

pub(crate) fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&c| c != b' ').unwrap_or(bytes.len());
    &bytes[start..]
}

pub(crate) fn trim_end(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|c| !c.is_ascii_whitespace())
        .map_or(0, |last| last + 1);
    &bytes[..end]
}
