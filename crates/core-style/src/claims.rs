//! Byte-occupancy tracking for the inline pattern passes.
//!
//! Patterns run in a fixed priority order; once a pass claims a byte range no
//! later pass may restyle it. This is what stands in for lookaround: bold
//! claims its `**` delimiters before the italic pass ever sees them.

/// Occupancy bitmap over one line's bytes.
pub(crate) struct Claims {
    taken: Vec<bool>,
}

impl Claims {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            taken: vec![false; len],
        }
    }

    /// True when no byte in `[start, end)` is claimed yet.
    pub(crate) fn is_free(&self, start: usize, end: usize) -> bool {
        self.taken[start..end].iter().all(|&t| !t)
    }

    pub(crate) fn claim(&mut self, start: usize, end: usize) {
        for t in &mut self.taken[start..end] {
            *t = true;
        }
    }

    /// Maximal unclaimed ranges, in order. These become plain text spans.
    pub(crate) fn free_ranges(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let mut start = None;
        for (i, &t) in self.taken.iter().enumerate() {
            match (t, start) {
                (false, None) => start = Some(i),
                (true, Some(s)) => {
                    out.push((s, i));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            out.push((s, self.taken.len()));
        }
        out
    }
}
