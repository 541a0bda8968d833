// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Key backend split:
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on EvalBackend (NdArray),
//     where dropout is inert and BatchNorm uses running statistics
//   - The validation batcher must also use EvalBackend
//
// Per-epoch bookkeeping lives in an explicit TrainingRun value,
// reset each epoch and summarized into an EpochMetrics row, so
// the loop stays restartable and testable in isolation.
//
// A non-finite batch loss halts the run immediately — silent
// continuation would corrupt every subsequent gradient step.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::BinaryCrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::activation::sigmoid,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::SpeechBatcher, dataset::SpeechDataset};
use crate::domain::errors::ScreenError;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::SpeechClassifier;
use crate::ml::{EvalBackend, TrainBackend};

// ─── TrainingRun ──────────────────────────────────────────────────────────────
/// Running accumulators for one epoch: loss sum, batch counter,
/// and correct/total prediction counts. Discarded after the epoch
/// except for the EpochMetrics summary.
#[derive(Debug)]
pub struct TrainingRun {
    epoch: usize,
    loss_sum: f64,
    batches: usize,
    correct: usize,
    total: usize,
}

impl TrainingRun {
    pub fn new(epoch: usize) -> Self {
        Self { epoch, loss_sum: 0.0, batches: 0, correct: 0, total: 0 }
    }

    /// Fold one batch into the accumulators. A NaN or infinite loss
    /// aborts with the epoch and batch index, before the value can
    /// contaminate the averages.
    pub fn record_batch(
        &mut self,
        loss: f64,
        correct: usize,
        batch_size: usize,
    ) -> Result<(), ScreenError> {
        if !loss.is_finite() {
            return Err(ScreenError::NonFiniteLoss { epoch: self.epoch, batch: self.batches });
        }
        self.loss_sum += loss;
        self.batches += 1;
        self.correct += correct;
        self.total += batch_size;
        Ok(())
    }

    pub fn avg_loss(&self) -> f64 {
        if self.batches > 0 { self.loss_sum / self.batches as f64 } else { f64::NAN }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total > 0 { self.correct as f64 / self.total as f64 } else { 0.0 }
    }
}

// ─── Training entry point ─────────────────────────────────────────────────────
/// Run the configured number of epochs, returning the per-epoch
/// summaries. `stop` is a cooperative stop-after-current-epoch
/// signal: when set, the loop finishes the epoch it is in (so the
/// parameters are never left mid-update) and returns early.
pub fn run_training(
    cfg: &TrainConfig,
    train_dataset: SpeechDataset,
    val_dataset: SpeechDataset,
    ckpt_manager: CheckpointManager,
    stop: Option<Arc<AtomicBool>>,
) -> Result<Vec<EpochMetrics>> {
    // Seed both backends so initialization, dropout, and shuffling
    // reproduce across runs with the same configuration
    TrainBackend::seed(cfg.seed);
    EvalBackend::seed(cfg.seed);

    let device = Default::default();

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = cfg.model_config();
    let mut model: SpeechClassifier<TrainBackend> = model_cfg.init(&device);
    ckpt_manager.save_model_config(&model_cfg)?;
    tracing::info!(
        "Model ready: {} heads, {}x2 recurrent layers, hidden={}",
        cfg.num_heads,
        cfg.num_layers,
        cfg.hidden_size,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    let bce = BinaryCrossEntropyLossConfig::new()
        .with_logits(true)
        .init(&device);

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = SpeechBatcher::<TrainBackend>::new(device);
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (inner backend — no autodiff overhead) ─────────
    let val_batcher = SpeechBatcher::<EvalBackend>::new(device);
    let val_loader = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let logger = MetricsLogger::new(&cfg.checkpoint_dir)?;
    let mut history = Vec::with_capacity(cfg.epochs);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut run = TrainingRun::new(epoch);

        // ── Training phase ────────────────────────────────────────────────────
        for batch in train_loader.iter() {
            let batch_size = batch.labels.dims()[0];

            let logits = model.forward(batch.features);
            let loss = bce.forward(logits.clone(), batch.labels.clone());
            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

            let preds = sigmoid(logits).greater_elem(0.5).int();
            let correct: i64 = preds
                .equal(batch.labels)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();

            run.record_batch(loss_val, correct as usize, batch_size)?;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → SpeechClassifier<EvalBackend>, no gradient
        // tracking and no parameter updates
        let model_valid = model.valid();
        let mut val_correct = 0usize;
        let mut val_total = 0usize;

        for batch in val_loader.iter() {
            let logits = model_valid.forward(batch.features);
            let preds = sigmoid(logits).greater_elem(0.5).int();
            let correct: i64 = preds
                .equal(batch.labels.clone())
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            val_correct += correct as usize;
            val_total += batch.labels.dims()[0];
        }

        let val_acc = if val_total > 0 { val_correct as f64 / val_total as f64 } else { 0.0 };
        let metrics = EpochMetrics::new(epoch, run.avg_loss(), run.accuracy(), val_acc);

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | val_acc={:.1}%",
            epoch,
            cfg.epochs,
            metrics.train_loss,
            metrics.train_acc * 100.0,
            metrics.val_acc * 100.0,
        );

        logger.log(&metrics)?;
        ckpt_manager.save_model(&model, epoch)?;
        history.push(metrics);

        if stop.as_ref().is_some_and(|s| s.load(Ordering::Relaxed)) {
            tracing::info!("Stop requested — halting after epoch {}", epoch);
            break;
        }
    }

    tracing::info!("Training complete");
    Ok(history)
}
