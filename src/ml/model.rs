use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        BiLstm, BiLstmConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{relu, softmax, tanh},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SannConfig {
    pub vocab_size:      usize,
    pub embedding_size:  usize,
    pub sequence_length: usize,
    pub num_classes:     usize,
    #[config(default = 256)]
    pub lstm_hidden_size: usize,
    #[config(default = 350)]
    pub attention_unit_size: usize,
    #[config(default = 10)]
    pub attention_hops_size: usize,
    #[config(default = 1024)]
    pub fc_hidden_size: usize,
    #[config(default = 1)]
    pub top_k: usize,
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl SannConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SannModel<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_size).init(device);
        let bilstm    = BiLstmConfig::new(self.embedding_size, self.lstm_hidden_size, true).init(device);

        // A = softmax(W2 · tanh(W1 · Hᵀ)), neither projection has a bias
        let attention_w1 = LinearConfig::new(2 * self.lstm_hidden_size, self.attention_unit_size)
            .with_bias(false)
            .init(device);
        let attention_w2 = LinearConfig::new(self.attention_unit_size, self.attention_hops_size)
            .with_bias(false)
            .init(device);

        let fc      = LinearConfig::new(2 * self.side_features(), self.fc_hidden_size).init(device);
        let output  = LinearConfig::new(self.fc_hidden_size, self.num_classes).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();

        SannModel {
            embedding, bilstm, attention_w1, attention_w2, fc, output, dropout,
            top_k: self.top_k.clamp(1, self.num_classes.max(1)),
        }
    }

    /// Width of the flattened attention matrix for one side of the pair.
    pub fn side_features(&self) -> usize {
        self.attention_hops_size * 2 * self.lstm_hidden_size
    }
}

#[derive(Module, Debug)]
pub struct SannModel<B: Backend> {
    pub embedding:    Embedding<B>,
    pub bilstm:       BiLstm<B>,
    pub attention_w1: Linear<B>,
    pub attention_w2: Linear<B>,
    pub fc:           Linear<B>,
    pub output:       Linear<B>,
    pub dropout:      Dropout,
    pub top_k:        usize,
}

/// The tensors an evaluation run fetches from the model.
pub struct SannOutput<B: Backend> {
    /// Raw class logits — [batch, num_classes]
    pub logits:       Tensor<B, 2>,
    /// argmax(softmax(logits)) — [batch]
    pub predictions:  Tensor<B, 1, Int>,
    /// Largest k softmax scores per row, descending — [batch, k]
    pub top_k_scores: Tensor<B, 2>,
}

impl<B: Backend> SannModel<B> {
    /// tokens: [batch, seq_len] → [batch, hops * 2 * hidden]
    fn encode_side(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let embedded    = self.embedding.forward(tokens);     // [b, s, e]
        let (hidden, _) = self.bilstm.forward(embedded, None); // [b, s, 2h]

        let energy = self
            .attention_w2
            .forward(tanh(self.attention_w1.forward(hidden.clone()))); // [b, s, hops]
        let weights  = softmax(energy.swap_dims(1, 2), 2);              // [b, hops, s]
        let attended = weights.matmul(hidden);                          // [b, hops, 2h]

        let [batch, hops, width] = attended.dims();
        attended.reshape([batch, hops * width])
    }

    pub fn forward(&self, front: Tensor<B, 2, Int>, behind: Tensor<B, 2, Int>) -> SannOutput<B> {
        let front  = self.encode_side(front);
        let behind = self.encode_side(behind);

        let x = Tensor::cat(vec![front, behind], 1);
        let x = self.dropout.forward(relu(self.fc.forward(x)));
        let logits = self.output.forward(x);

        let scores       = softmax(logits.clone(), 1);
        let predictions  = scores.clone().argmax(1).flatten::<1>(0, 1);
        let top_k_scores = scores.topk(self.top_k, 1);

        SannOutput { logits, predictions, top_k_scores }
    }

    /// Mean cross-entropy of the logits against class ids.
    pub fn loss(&self, logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_support::{tiny_config, TestBackend};

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model: SannModel<TestBackend> = tiny_config().init(&device);

        let front  = Tensor::<TestBackend, 2, Int>::zeros([3, 6], &device);
        let behind = Tensor::<TestBackend, 2, Int>::ones([3, 6], &device);
        let out = model.forward(front, behind);

        assert_eq!(out.logits.dims(), [3, 2]);
        assert_eq!(out.predictions.dims(), [3]);
        assert_eq!(out.top_k_scores.dims(), [3, 1]);
    }

    #[test]
    fn test_top_k_is_the_max_score() {
        let device = Default::default();
        let model: SannModel<TestBackend> = tiny_config().init(&device);

        let tokens = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![1i64, 2, 3, 4, 5, 6], [1, 6]),
            &device,
        );
        let out = model.forward(tokens.clone(), tokens);

        let scores: Vec<f32> = softmax(out.logits, 1).into_data().convert::<f32>().to_vec().unwrap();
        let top: Vec<f32>    = out.top_k_scores.into_data().convert::<f32>().to_vec().unwrap();
        let max = scores.iter().cloned().fold(f32::MIN, f32::max);
        assert!((top[0] - max).abs() < 1e-6);
        assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_top_k_is_clamped_to_class_count() {
        let device = Default::default();
        let model: SannModel<TestBackend> = tiny_config().with_top_k(5).init(&device);
        assert_eq!(model.top_k, 2);
    }
}
