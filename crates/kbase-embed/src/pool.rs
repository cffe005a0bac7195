use anyhow::{bail, Result};
use candle_core::{DType, Tensor, D};

/// Sentence vector from token states: average the states whose mask entry is
/// set, then scale each row to unit length.
///
/// `hidden` is `[batch, seq, width]`; `attention_mask` is `[batch, seq]` in any
/// numeric dtype. Returns `[batch, width]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let &[batch, seq, _width] = hidden.dims() else {
        bail!("expected [batch, seq, width] token states, got {:?}", hidden.dims());
    };
    if attention_mask.dims() != [batch, seq] {
        bail!("attention mask {:?} does not fit token states [{batch}, {seq}, _]", attention_mask.dims());
    }

    let weights = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&weights.unsqueeze(D::Minus1)?)?.sum(1)?;
    let counts = weights.sum_keepdim(1)?;
    let mean = summed.broadcast_div(&counts)?;

    let eps = if hidden.dtype() == DType::F16 { 1e-6 } else { 1e-12 };
    let norms = mean.sqr()?.sum_keepdim(1)?.sqrt()?.affine(1.0, eps)?;
    Ok(mean.broadcast_div(&norms)?)
}
