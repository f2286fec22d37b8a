use std::iter::once;

use crate::{trimmer::WaterfallTrimmer, TokenId};

/// The number of wrapping tokens added to a single segment.
pub const ADDED_TOKENS: usize = 2;

/// Combines the segments into one sequence.
///
/// The sequence starts with the start token and every segment is terminated by the end token:
/// `[BOS] s0 [EOS] s1 [EOS] ...`. Returns the token ids together with the segment ids, which are
/// `0` for the start token and the first segment and `i` for the `i`-th segment and its end token.
pub fn combine_segments<S>(
    segments: &[S],
    bos_id: TokenId,
    eos_id: TokenId,
) -> (Vec<TokenId>, Vec<TokenId>)
where
    S: AsRef<[TokenId]>,
{
    let len = 1 + segments
        .iter()
        .map(|segment| segment.as_ref().len() + 1)
        .sum::<usize>();
    let mut ids = Vec::with_capacity(len);
    let mut segment_ids = Vec::with_capacity(len);

    ids.push(bos_id);
    segment_ids.push(0);
    for (idx, segment) in segments.iter().enumerate() {
        let segment = segment.as_ref();
        ids.extend(segment.iter().copied().chain(once(eos_id)));
        segment_ids.extend((0..=segment.len()).map(|_| idx as TokenId));
    }

    (ids, segment_ids)
}

/// A post-processor which trims a tokenized sequence and wraps it with start and end tokens.
#[derive(Clone, Copy, Debug)]
pub struct PostProcessor {
    trimmer: WaterfallTrimmer,
    bos_id: TokenId,
    eos_id: TokenId,
}

impl PostProcessor {
    /// Creates a post-processor which keeps at most `max_len` tokens besides the wrapping ones.
    pub fn new(max_len: usize, bos_id: TokenId, eos_id: TokenId) -> Self {
        Self {
            trimmer: WaterfallTrimmer::new(max_len),
            bos_id,
            eos_id,
        }
    }

    /// Post-processes a single segment.
    pub fn process(&self, tokens: &[TokenId]) -> Vec<TokenId> {
        self.process_segments(&[tokens]).0
    }

    /// Post-processes several segments into one sequence and its segment ids.
    pub fn process_segments<S>(&self, segments: &[S]) -> (Vec<TokenId>, Vec<TokenId>)
    where
        S: AsRef<[TokenId]>,
    {
        combine_segments(&self.trimmer.trim(segments), self.bos_id, self.eos_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLS: TokenId = 2;
    const SEP: TokenId = 3;

    #[test]
    fn test_combine_single() {
        let (ids, segment_ids) = combine_segments(&[vec![5, 6, 7]], CLS, SEP);
        assert_eq!(ids, [CLS, 5, 6, 7, SEP]);
        assert_eq!(segment_ids, [0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_combine_pair() {
        let (ids, segment_ids) = combine_segments(&[vec![5, 6], vec![7, 8, 9]], CLS, SEP);
        assert_eq!(ids, [CLS, 5, 6, SEP, 7, 8, 9, SEP]);
        assert_eq!(segment_ids, [0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_combine_empty() {
        let (ids, segment_ids) = combine_segments(&[Vec::<TokenId>::new()], CLS, SEP);
        assert_eq!(ids, [CLS, SEP]);
        assert_eq!(segment_ids, [0, 0]);
    }

    #[test]
    fn test_process() {
        let processor = PostProcessor::new(5, CLS, SEP);
        assert_eq!(processor.process(&[5, 6]), [CLS, 5, 6, SEP]);
        assert_eq!(
            processor.process(&[5, 6, 7, 8, 9, 10, 11]),
            [CLS, 5, 6, 7, 8, 9, SEP],
        );
        assert_eq!(processor.process(&[]), [CLS, SEP]);
    }

    #[test]
    fn test_process_segments() {
        let processor = PostProcessor::new(4, CLS, SEP);
        let (ids, segment_ids) = processor.process_segments(&[vec![5, 6, 7], vec![8, 9, 10]]);
        assert_eq!(ids, [CLS, 5, 6, 7, SEP, 8, SEP]);
        assert_eq!(segment_ids, [0, 0, 0, 0, 0, 1, 1]);
    }
}
