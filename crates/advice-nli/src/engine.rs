//! The backing zero-shot/MNLI model behind one interface: a real ONNX
//! session (feature `onnx`) or a fail-open stub when the feature is off or
//! no model files are configured (spec §4.11: "Wraps a local inference
//! engine... behind one interface"). Grounded on `crates/rag/src/reranker.rs`'s
//! `EarlyExitReranker` cfg-gated session pattern.

use crate::error::NliError;
use std::path::Path;

#[cfg(feature = "onnx")]
use ndarray::Array2;
#[cfg(feature = "onnx")]
use ort::{session::builder::GraphOptimizationLevel, session::Session, value::Tensor};
#[cfg(feature = "onnx")]
use tokenizers::Tokenizer;

/// Softmax'd entailment/contradiction/neutral triple for one premise/
/// hypothesis pair (spec §4.11: "a stable softmax (optional temperature)").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NliOutcome {
    pub entail: f64,
    pub contra: f64,
    pub neutral: f64,
}

/// MNLI's canonical ORT label order is `[contradiction, neutral, entailment]`;
/// kept as an explicit constant since exported ONNX checkpoints vary
/// (spec §4.11: "ORT-label-order aware").
const LABEL_ORDER: [&str; 3] = ["contradiction", "neutral", "entailment"];

pub struct NliEngine {
    #[cfg(feature = "onnx")]
    session: Session,
    #[cfg(feature = "onnx")]
    tokenizer: Tokenizer,
    max_seq_len: usize,
    temperature: f64,
}

impl NliEngine {
    #[cfg(feature = "onnx")]
    pub fn load(model_path: impl AsRef<Path>, tokenizer_path: impl AsRef<Path>, temperature: f64) -> Result<Self, NliError> {
        let session = Session::builder()
            .map_err(|e| NliError::Inference(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| NliError::Inference(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| NliError::Inference(e.to_string()))?;
        let tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| NliError::Tokenize(e.to_string()))?;
        Ok(Self {
            session,
            tokenizer,
            max_seq_len: 256,
            temperature: temperature.max(1e-3),
        })
    }

    #[cfg(not(feature = "onnx"))]
    pub fn load(_model_path: impl AsRef<Path>, _tokenizer_path: impl AsRef<Path>, _temperature: f64) -> Result<Self, NliError> {
        Err(NliError::ModelUnavailable)
    }

    /// Score `(premise, hypothesis)`, blocking the calling thread — callers
    /// wrap this in `spawn_blocking` (spec §5: the suspension point is the
    /// `await`, not the inference itself).
    #[cfg(feature = "onnx")]
    pub fn score(&self, premise: &str, hypothesis: &str) -> Result<NliOutcome, NliError> {
        let encoding = self
            .tokenizer
            .encode((premise, hypothesis), true)
            .map_err(|e| NliError::Tokenize(e.to_string()))?;

        let ids: Vec<i64> = encoding.get_ids().iter().take(self.max_seq_len).map(|&id| id as i64).collect();
        let mut padded_ids = vec![0i64; self.max_seq_len];
        let mut padded_mask = vec![0i64; self.max_seq_len];
        padded_ids[..ids.len()].copy_from_slice(&ids);
        padded_mask[..ids.len()].fill(1);

        let input_ids =
            Array2::from_shape_vec((1, self.max_seq_len), padded_ids).map_err(|e| NliError::Inference(e.to_string()))?;
        let attention_mask =
            Array2::from_shape_vec((1, self.max_seq_len), padded_mask).map_err(|e| NliError::Inference(e.to_string()))?;

        let input_ids_tensor = Tensor::from_array(input_ids).map_err(|e| NliError::Inference(e.to_string()))?;
        let attention_mask_tensor = Tensor::from_array(attention_mask).map_err(|e| NliError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
            ])
            .map_err(|e| NliError::Inference(e.to_string()))?;

        let (_, logits) = outputs
            .get("logits")
            .ok_or_else(|| NliError::Inference("missing logits output".to_string()))?
            .try_extract_tensor::<f32>()
            .map_err(|e| NliError::Inference(e.to_string()))?;

        Ok(self.softmax_labels(logits))
    }

    #[cfg(feature = "onnx")]
    fn softmax_labels(&self, logits: &[f32]) -> NliOutcome {
        let temp = self.temperature as f32;
        let scaled: Vec<f32> = logits.iter().take(3).map(|v| v / temp).collect();
        let max = scaled.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = scaled.iter().map(|v| (v - max).exp()).collect();
        let sum: f32 = exps.iter().sum::<f32>().max(1e-9);
        let probs: Vec<f64> = exps.iter().map(|v| (v / sum) as f64).collect();

        let mut by_label = std::collections::HashMap::new();
        for (label, p) in LABEL_ORDER.iter().zip(probs.iter()) {
            by_label.insert(*label, *p);
        }
        NliOutcome {
            entail: *by_label.get("entailment").unwrap_or(&0.0),
            contra: *by_label.get("contradiction").unwrap_or(&0.0),
            neutral: *by_label.get("neutral").unwrap_or(&0.0),
        }
    }

    #[cfg(not(feature = "onnx"))]
    pub fn score(&self, _premise: &str, _hypothesis: &str) -> Result<NliOutcome, NliError> {
        Err(NliError::ModelUnavailable)
    }
}
