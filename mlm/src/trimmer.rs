use crate::TokenId;

/// A trimmer which fills a length budget segment by segment.
///
/// The first segment takes as many tokens as fit, the following segments take whatever budget is
/// left in order. Tokens are always dropped from the end of a segment.
#[derive(Clone, Copy, Debug)]
pub struct WaterfallTrimmer {
    max_len: usize,
}

impl WaterfallTrimmer {
    /// Creates a trimmer with a total length budget.
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Computes the number of tokens kept per segment.
    pub fn allocations(&self, lengths: impl IntoIterator<Item = usize>) -> Vec<usize> {
        lengths
            .into_iter()
            .scan(self.max_len, |budget, len| {
                let kept = len.min(*budget);
                *budget -= kept;
                Some(kept)
            })
            .collect()
    }

    /// Trims the segments.
    pub fn trim<S>(&self, segments: &[S]) -> Vec<Vec<TokenId>>
    where
        S: AsRef<[TokenId]>,
    {
        let allocations = self.allocations(segments.iter().map(|segment| segment.as_ref().len()));
        segments
            .iter()
            .zip(allocations)
            .map(|(segment, kept)| segment.as_ref()[..kept].to_vec())
            .collect()
    }
}
