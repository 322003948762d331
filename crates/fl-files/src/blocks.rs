use std::ops::Range;

/// Named row ranges of a concatenated table, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedBlocks {
    blocks: Vec<(String, Range<usize>)>,
}

impl NamedBlocks {
    pub(crate) fn push(&mut self, name: impl Into<String>, rows: Range<usize>) {
        self.blocks.push((name.into(), rows));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|(n, _)| n.as_str())
    }

    /// Rows of the first block called `name`.
    pub fn range(&self, name: &str) -> Option<Range<usize>> {
        self.blocks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r.clone())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Text between the first and the last double quote of `line`.
pub(crate) fn quoted(line: &str) -> Option<&str> {
    let open = line.find('"')?;
    let close = line.rfind('"')?;
    (close > open).then(|| &line[open + 1..close])
}
