#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffPrefix {
    Added,
    Removed,
    Context,
}

/// One side of a diff row: sanitized text plus its line number, if known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub prefix: DiffPrefix,
    pub line: String,
    pub line_number: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Context,
    Changed,
    Added,
    Removed,
}

/// A row of the split view. Removed lines sit on the left, added lines on
/// the right; a changed row pairs one of each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitDiffRow {
    Context { left: DiffLine, right: DiffLine },
    Changed { left: DiffLine, right: DiffLine },
    Added { right: DiffLine },
    Removed { left: DiffLine },
}

impl SplitDiffRow {
    pub fn kind(&self) -> RowKind {
        match self {
            SplitDiffRow::Context { .. } => RowKind::Context,
            SplitDiffRow::Changed { .. } => RowKind::Changed,
            SplitDiffRow::Added { .. } => RowKind::Added,
            SplitDiffRow::Removed { .. } => RowKind::Removed,
        }
    }

    pub fn left(&self) -> Option<&DiffLine> {
        match self {
            SplitDiffRow::Context { left, .. }
            | SplitDiffRow::Changed { left, .. }
            | SplitDiffRow::Removed { left } => Some(left),
            SplitDiffRow::Added { .. } => None,
        }
    }

    pub fn right(&self) -> Option<&DiffLine> {
        match self {
            SplitDiffRow::Context { right, .. }
            | SplitDiffRow::Changed { right, .. }
            | SplitDiffRow::Added { right } => Some(right),
            SplitDiffRow::Removed { .. } => None,
        }
    }
}

/// Half-open range of char offsets into a [`DiffLine`]'s text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffSpan {
    pub start: usize,
    pub end: usize,
}

impl DiffSpan {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}
