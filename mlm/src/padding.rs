use ndarray::Array2;

use crate::TokenId;

/// Pads or truncates the ragged rows to `max_len`.
///
/// Returns the padded rows together with a mask which is `1` for real entries and `0` for
/// padding entries.
pub fn pad_model_inputs<S>(
    rows: &[S],
    max_len: usize,
    pad_id: TokenId,
) -> (Array2<TokenId>, Array2<TokenId>)
where
    S: AsRef<[TokenId]>,
{
    let shape = (rows.len(), max_len);
    let padded = Array2::from_shape_fn(shape, |(i, j)| {
        rows[i].as_ref().get(j).copied().unwrap_or(pad_id)
    });
    let mask = Array2::from_shape_fn(shape, |(i, j)| (j < rows[i].as_ref().len()) as TokenId);

    (padded, mask)
}
