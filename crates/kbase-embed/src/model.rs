//! XLM-RoBERTa sentence encoder (e5 / bge-m3 family) running on candle.

use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;

use kbase_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_on_device;

/// Hard cap on sequence length; XLM-R has 514 positions, two are reserved.
const MAX_SEQ_LEN: usize = 512;

pub struct SentenceEncoder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    model_id: String,
    dim: usize,
    max_len: usize,
}

impl SentenceEncoder {
    /// Load tokenizer, config and weights from `model_dir`. Weights are read from
    /// `model.safetensors` when present, else from `pytorch_model.bin`.
    pub fn load(model_dir: &Path, model_id: &str) -> Result<Self> {
        let started = Instant::now();
        let device = select_device();

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config_raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let config: XLMRobertaConfig = serde_json::from_str(&config_raw)?;
        let raw: serde_json::Value = serde_json::from_str(&config_raw)?;
        let dim = raw.get("hidden_size").and_then(|v| v.as_u64()).ok_or_else(|| anyhow!("config.json has no hidden_size"))? as usize;
        let max_positions = raw.get("max_position_embeddings").and_then(|v| v.as_u64()).unwrap_or(514) as usize;
        let max_len = max_positions.saturating_sub(2).clamp(1, MAX_SEQ_LEN);

        let dtype = DType::F32;
        let safetensors = model_dir.join("model.safetensors");
        let vb = if safetensors.exists() {
            // SAFETY: the weights file is not modified while mapped.
            unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], dtype, &device)? }
        } else {
            let weights_path = model_dir.join("pytorch_model.bin");
            let weights = candle_core::pickle::read_all(&weights_path)
                .with_context(|| format!("reading {}", weights_path.display()))?;
            let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
            VarBuilder::from_tensors(weights_map, dtype, &device)
        };
        let model = XLMRobertaModel::new(&config, vb)?;

        tracing::info!(
            model = model_id,
            dir = %model_dir.display(),
            dim,
            max_len,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sentence encoder loaded"
        );
        Ok(Self { model, tokenizer, device, model_id: model_id.to_string(), dim, max_len })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let v: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if v.len() != self.dim {
            bail!("model produced {} components, expected {}", v.len(), self.dim);
        }
        Ok(v)
    }
}

impl Embedder for SentenceEncoder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}
