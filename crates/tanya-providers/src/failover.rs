//! Synthesizer failover: try each client in order, skipping unhealthy
//! ones.
//!
//! Lightweight: a consecutive-failure counter and a cooldown timestamp
//! per slot, no circuit-breaker machinery. A chain-wide failure is still
//! just `SynthesisUnavailable`.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tanya_core::error::{Result, TanyaError};
use tanya_core::traits::{GenerateParams, Synthesizer};

/// Skip a slot after this many consecutive failures…
const MAX_FAILURES: u32 = 3;
/// …until this many seconds have passed since the last one.
const COOLDOWN_SECS: u64 = 60;

struct SynthesizerSlot {
    synthesizer: Box<dyn Synthesizer>,
    /// Consecutive failure count.
    failures: AtomicU32,
    /// Unix seconds of the last failure (0 = never failed).
    last_failure: AtomicU64,
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl SynthesizerSlot {
    fn new(synthesizer: Box<dyn Synthesizer>) -> Self {
        Self {
            synthesizer,
            failures: AtomicU32::new(0),
            last_failure: AtomicU64::new(0),
        }
    }

    fn is_healthy(&self) -> bool {
        if self.failures.load(Ordering::Relaxed) < MAX_FAILURES {
            return true;
        }
        unix_now().saturating_sub(self.last_failure.load(Ordering::Relaxed)) > COOLDOWN_SECS
    }

    fn record_success(&self) {
        self.failures.store(0, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.last_failure.store(unix_now(), Ordering::Relaxed);
    }
}

/// Ordered chain of synthesizers; first healthy one that answers wins.
pub struct FailoverSynthesizer {
    slots: Vec<SynthesizerSlot>,
}

impl FailoverSynthesizer {
    /// First synthesizer is primary, the rest are fallbacks.
    pub fn new(synthesizers: Vec<Box<dyn Synthesizer>>) -> Self {
        assert!(!synthesizers.is_empty(), "Need at least one synthesizer");
        Self {
            slots: synthesizers.into_iter().map(SynthesizerSlot::new).collect(),
        }
    }

    pub fn chain_len(&self) -> usize {
        self.slots.len()
    }

    /// (name, healthy, consecutive failures) per slot.
    pub fn health_status(&self) -> Vec<(&str, bool, u32)> {
        self.slots
            .iter()
            .map(|s| {
                (
                    s.synthesizer.name(),
                    s.is_healthy(),
                    s.failures.load(Ordering::Relaxed),
                )
            })
            .collect()
    }
}

#[async_trait]
impl Synthesizer for FailoverSynthesizer {
    fn name(&self) -> &str {
        self.slots
            .first()
            .map(|s| s.synthesizer.name())
            .unwrap_or("failover")
    }

    async fn generate(&self, prompt: &str, params: &GenerateParams) -> Result<String> {
        let mut last_error = None;

        for (idx, slot) in self.slots.iter().enumerate() {
            if !slot.is_healthy() {
                tracing::debug!(
                    "Skipping unhealthy synthesizer {} ({} failures)",
                    slot.synthesizer.name(),
                    slot.failures.load(Ordering::Relaxed)
                );
                continue;
            }

            match slot.synthesizer.generate(prompt, params).await {
                Ok(text) => {
                    if idx > 0 {
                        tracing::info!(
                            "Failover: {} answered after {} failed",
                            slot.synthesizer.name(),
                            self.slots[0].synthesizer.name()
                        );
                    }
                    slot.record_success();
                    return Ok(text);
                }
                Err(e) => {
                    slot.record_failure();
                    tracing::warn!(
                        "Synthesizer {} failed (attempt {}): {}",
                        slot.synthesizer.name(),
                        slot.failures.load(Ordering::Relaxed),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            TanyaError::SynthesisUnavailable("all synthesizers unhealthy".into())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, &'static str);

    #[async_trait]
    impl Synthesizer for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        async fn generate(&self, _prompt: &str, _params: &GenerateParams) -> Result<String> {
            Ok(self.1.to_string())
        }
    }

    struct Broken;

    #[async_trait]
    impl Synthesizer for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        async fn generate(&self, _prompt: &str, _params: &GenerateParams) -> Result<String> {
            Err(TanyaError::SynthesisUnavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn test_falls_over_to_second_slot() {
        let chain = FailoverSynthesizer::new(vec![
            Box::new(Broken),
            Box::new(Fixed("backup", "jawapan")),
        ]);
        let text = chain
            .generate("soalan", &GenerateParams::default())
            .await
            .unwrap();
        assert_eq!(text, "jawapan");

        let status = chain.health_status();
        assert_eq!(status[0], ("broken", true, 1));
        assert_eq!(status[1], ("backup", true, 0));
    }

    #[tokio::test]
    async fn test_all_broken_surfaces_unavailable() {
        let chain = FailoverSynthesizer::new(vec![Box::new(Broken), Box::new(Broken)]);
        let err = chain
            .generate("soalan", &GenerateParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TanyaError::SynthesisUnavailable(_)));
    }

    #[tokio::test]
    async fn test_slot_skipped_after_max_failures() {
        let chain = FailoverSynthesizer::new(vec![
            Box::new(Broken),
            Box::new(Fixed("backup", "jawapan")),
        ]);
        for _ in 0..MAX_FAILURES {
            let _ = chain.generate("soalan", &GenerateParams::default()).await;
        }
        let status = chain.health_status();
        assert_eq!(status[0].1, false, "primary should be in cooldown");
        assert_eq!(status[0].2, MAX_FAILURES);

        // The chain still answers through the healthy backup.
        let text = chain
            .generate("soalan", &GenerateParams::default())
            .await
            .unwrap();
        assert_eq!(text, "jawapan");
        // Primary was skipped, so its failure count is unchanged.
        assert_eq!(chain.health_status()[0].2, MAX_FAILURES);
    }

    #[test]
    fn test_success_resets_counter() {
        let slot = SynthesizerSlot::new(Box::new(Broken));
        slot.record_failure();
        slot.record_failure();
        assert!(slot.is_healthy());
        slot.record_failure();
        assert!(!slot.is_healthy());
        slot.record_success();
        assert!(slot.is_healthy());
    }
}
