use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation,
};

use crate::data::batcher::NliBatch;

/// Large negative fill for padded positions before max pooling.
const MASKED_MAX_FILL: f32 = -1.0e4;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct NliModelConfig {
    /// Width of the pretrained word vectors
    pub embedding_dim: usize,
    /// Tokens per sentence after padding/truncation
    pub max_len:       usize,
    pub num_classes:   usize,
    #[config(default = 256)]
    pub d_model:       usize,
    #[config(default = 4)]
    pub num_heads:     usize,
    #[config(default = 2)]
    pub num_layers:    usize,
    #[config(default = 512)]
    pub d_ff:          usize,
    /// Width of the hidden layer in the classifier head
    #[config(default = 256)]
    pub d_hidden:      usize,
    #[config(default = 0.1)]
    pub dropout:       f64,
}

impl NliModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> NliModel<B> {
        let encoder = self.build_sentence_encoder(device);
        // [u; v; |u-v|; u*v], each u/v is mean ++ max pooled (2 * d_model)
        let features = 4 * 2 * self.d_model;
        let hidden   = LinearConfig::new(features, self.d_hidden).init(device);
        let output   = LinearConfig::new(self.d_hidden, self.num_classes).init(device);
        let dropout  = DropoutConfig::new(self.dropout).init();
        NliModel { encoder, hidden, output, dropout }
    }

    fn build_sentence_encoder<B: Backend>(&self, device: &B::Device) -> SentenceEncoder<B> {
        let input_proj         = LinearConfig::new(self.embedding_dim, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        SentenceEncoder { input_proj, position_embedding, layers, final_norm, dropout }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// x: [batch, len, d_model], mask_pad: [batch, len] (true = padding)
    pub fn forward(&self, x: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_input  = MhaInput::self_attn(x.clone()).mask_pad(mask_pad);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

/// Encodes one sentence (as embedding vectors) into a fixed vector.
/// Shared between premise and hypothesis.
#[derive(Module, Debug)]
pub struct SentenceEncoder<B: Backend> {
    pub input_proj:         Linear<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub dropout:            Dropout,
}

impl<B: Backend> SentenceEncoder<B> {
    /// x: [batch, len, emb_dim] → [batch, 2 * d_model]
    pub fn forward(&self, x: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 2> {
        let [batch_size, seq_len, _] = x.dims();
        let device = x.device();

        let h = self.input_proj.forward(x);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mut h = self.dropout.forward(h + pos_emb);
        for layer in &self.layers {
            h = layer.forward(h, mask_pad.clone());
        }
        let h = self.final_norm.forward(h);

        masked_mean_max(h, mask_pad)
    }
}

/// Mean and max over the non-padding positions, concatenated.
/// h: [batch, len, d], mask_pad: [batch, len] → [batch, 2 * d]
pub fn masked_mean_max<B: Backend>(h: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 2> {
    let [batch_size, seq_len, d] = h.dims();
    let pad  = mask_pad.unsqueeze_dim::<3>(2).expand([batch_size, seq_len, d]);
    let keep = pad.clone().bool_not().float();

    let summed = (h.clone() * keep.clone()).sum_dim(1);
    let counts = keep.sum_dim(1).clamp_min(1.0);
    let mean   = (summed / counts).squeeze_dim::<2>(1);

    let max = h.mask_fill(pad, MASKED_MAX_FILL).max_dim(1).squeeze_dim::<2>(1);

    Tensor::cat(vec![mean, max], 1)
}

#[derive(Module, Debug)]
pub struct NliModel<B: Backend> {
    pub encoder: SentenceEncoder<B>,
    pub hidden:  Linear<B>,
    pub output:  Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> NliModel<B> {
    /// Returns logits [batch, num_classes].
    pub fn forward(
        &self,
        premise:         Tensor<B, 3>,
        premise_mask:    Tensor<B, 2, Bool>,
        hypothesis:      Tensor<B, 3>,
        hypothesis_mask: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 2> {
        let u = self.encoder.forward(premise, premise_mask);
        let v = self.encoder.forward(hypothesis, hypothesis_mask);

        let features = Tensor::cat(
            vec![u.clone(), v.clone(), (u.clone() - v.clone()).abs(), u * v],
            1,
        );
        let h = activation::relu(self.hidden.forward(features));
        self.output.forward(self.dropout.forward(h))
    }

    /// Forward pass plus mean cross-entropy against the batch labels.
    /// Returns (loss [1], logits [batch, classes], labels [batch]).
    pub fn forward_loss(&self, batch: NliBatch<B>) -> (Tensor<B, 1>, Tensor<B, 2>, Tensor<B, 1, Int>) {
        let logits = self.forward(
            batch.premise,
            batch.premise_mask,
            batch.hypothesis,
            batch.hypothesis_mask,
        );
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), batch.labels.clone());
        (loss, logits, batch.labels)
    }
}
