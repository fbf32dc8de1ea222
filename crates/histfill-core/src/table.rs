//! In-memory accumulation of fetched bars.

use crate::Bar;

/// Bars accumulated across requests.
///
/// Each chunk is placed ahead of everything accumulated before it. Since the
/// driver walks backward in time this yields oldest-chunk-first order, but no
/// sort or deduplication is applied: rows appear exactly as the gateway
/// returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    // Stored in arrival order; read back reversed.
    chunks: Vec<Vec<Bar>>,
    rows: usize,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepend(&mut self, chunk: Vec<Bar>) {
        self.rows += chunk.len();
        self.chunks.push(chunk);
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bar> + '_ {
        self.chunks.iter().rev().flatten()
    }

    pub fn head(&self, n: usize) -> Vec<Bar> {
        self.iter().take(n).cloned().collect()
    }

    pub fn into_rows(self) -> Vec<Bar> {
        self.chunks.into_iter().rev().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UtcDateTime;

    fn bar(seconds: i64) -> Bar {
        let date = UtcDateTime::from_unix_seconds(seconds).expect("timestamp");
        Bar::new(date, 1.0, 1.0, 1.0, 1.0, -1.0, -1.0, 0)
    }

    #[test]
    fn later_chunks_come_first() {
        let mut table = ResultTable::new();
        table.prepend(vec![bar(300), bar(400)]);
        table.prepend(Vec::new());
        table.prepend(vec![bar(100), bar(200)]);

        let order: Vec<_> = table.iter().map(|bar| bar.date.unix_seconds()).collect();
        assert_eq!(order, vec![100, 200, 300, 400]);
        assert_eq!(table.len(), 4);
        assert_eq!(table.head(1)[0].date.unix_seconds(), 100);
    }

    #[test]
    fn overlapping_chunks_are_kept_verbatim() {
        let mut table = ResultTable::new();
        table.prepend(vec![bar(200), bar(300)]);
        table.prepend(vec![bar(100), bar(200)]);

        let rows = table.into_rows();
        let order: Vec<_> = rows.iter().map(|bar| bar.date.unix_seconds()).collect();
        assert_eq!(order, vec![100, 200, 200, 300]);
    }
}
