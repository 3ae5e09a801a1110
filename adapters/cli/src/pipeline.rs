//! Sample generation pipeline with seed-increment retry.
//!
//! The generator itself is a pure function of its seed; all seed mutation
//! happens here. An attempt that fails validation is logged and retried at
//! the next seed, and only after `max_retries` attempts does the pipeline
//! surface a terminal error naming the seed range it tried.

use std::path::Path;

use synthmap_core::{
    partition_for_scene, ConfigError, DrawStream, RegionId, RegionPartition, RenderConfig,
    SampleId, SceneConfig,
};
use synthmap_raster::{RasterRenderer, RenderError, RenderOutput, RenderPhase};
use synthmap_system_analytics::attach_derived_state;
use synthmap_system_change_ops::{standard_operators, ChangeLog};
use synthmap_system_generation::generate_world_state;
use synthmap_world::{constraints::validate_world_state, WorldState};
use thiserror::Error;
use tracing::{info, warn};

/// Default number of seeds tried before giving up on a sample.
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 10;

/// Errors surfaced by the generation pipeline.
#[derive(Debug, Error)]
pub(crate) enum PipelineError {
    /// Every attempted seed produced a state that failed validation.
    #[error(
        "no valid sample after {attempts} attempts (seeds {first_seed}..={last_seed} exhausted)"
    )]
    RetriesExhausted {
        /// Number of generation attempts made.
        attempts: u32,
        /// First seed tried.
        first_seed: u64,
        /// Last seed tried.
        last_seed: u64,
    },
    /// Every (region, operator) combination failed for the T1 state.
    #[error("no applicable change found for seed {seed}: all (region, operator) pairs failed")]
    NoApplicableChange {
        /// Seed of the T1 state the operators were applied to.
        seed: u64,
    },
    /// The run configuration is unusable; never retried.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Rendering failed; carries the offending path.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A validated, rendered T1 sample.
#[derive(Debug)]
pub(crate) struct GeneratedSample {
    /// The accepted world state, derived stats attached.
    pub(crate) state: WorldState,
    /// References to the written T1 images.
    pub(crate) render: RenderOutput,
}

/// A rendered T1/T2 change pair with its ground-truth change log.
#[derive(Debug)]
pub(crate) struct ChangePair {
    /// The accepted T1 sample.
    pub(crate) t1: GeneratedSample,
    /// The changed state, derived stats recomputed.
    pub(crate) state_t2: WorldState,
    /// References to the written T2 images.
    pub(crate) render_t2: RenderOutput,
    /// Record of what changed between T1 and T2.
    pub(crate) change_log: ChangeLog,
}

/// Generates one valid T1 sample, retrying with incremented seeds.
pub(crate) fn generate_one_t1(
    scene: &SceneConfig,
    render_config: &RenderConfig,
    seed: u64,
    sample_id: &SampleId,
    assets_dir: &Path,
    max_retries: u32,
) -> Result<GeneratedSample, PipelineError> {
    let renderer = RasterRenderer::new(render_config)?;
    let partition = partition_for_scene(scene)?;
    run_retry_loop(
        &renderer,
        partition.as_ref(),
        scene,
        seed,
        sample_id,
        assets_dir,
        max_retries,
    )
}

/// Generates a T1 sample plus a localized T2 change derived from it.
///
/// Operator failure is data: failed (region, operator) pairs are skipped and
/// the next shuffled pair is tried. Only when every pair fails does the
/// pipeline return [`PipelineError::NoApplicableChange`].
pub(crate) fn generate_change_pair(
    scene: &SceneConfig,
    render_config: &RenderConfig,
    seed: u64,
    sample_id: &SampleId,
    assets_dir: &Path,
    max_retries: u32,
) -> Result<ChangePair, PipelineError> {
    let renderer = RasterRenderer::new(render_config)?;
    let partition = partition_for_scene(scene)?;
    let t1 = run_retry_loop(
        &renderer,
        partition.as_ref(),
        scene,
        seed,
        sample_id,
        assets_dir,
        max_retries,
    )?;
    let t1_seed = t1.state.provenance().seed();

    let mut changes_rng = DrawStream::from_seed(t1_seed).split("changes");
    let operators = standard_operators();

    let mut combos: Vec<(RegionId, usize)> = Vec::new();
    for region in partition.regions() {
        for op_index in 0..operators.len() {
            combos.push((region, op_index));
        }
    }
    let combos = changes_rng.shuffle(&combos);

    for (attempt, (region, op_index)) in combos.iter().enumerate() {
        let operator = &operators[*op_index];
        let mut op_rng = changes_rng.split(&format!("op_{attempt:02}"));
        let result = operator.apply(&t1.state, &mut op_rng, *region, partition.as_ref());

        if result.is_failed() {
            warn!(
                seed = t1_seed,
                attempt,
                region = %region,
                operator = %operator.change_type(),
                reason = result
                    .params
                    .get(synthmap_system_change_ops::PARAM_REASON)
                    .map(String::as_str)
                    .unwrap_or("exhausted"),
                "change operator failed, skipping"
            );
            continue;
        }

        let change_log = ChangeLog::from_applied(operator.change_type(), *region, &result);
        let state_t2 = attach_derived_state(&result.state_t2, partition.as_ref());
        let render_t2 = renderer.render(&state_t2, assets_dir, sample_id, RenderPhase::T2)?;
        info!(
            seed = t1_seed,
            region = %region,
            operator = %change_log.change_type,
            "change applied"
        );

        return Ok(ChangePair {
            t1,
            state_t2,
            render_t2,
            change_log,
        });
    }

    Err(PipelineError::NoApplicableChange { seed: t1_seed })
}

fn run_retry_loop(
    renderer: &RasterRenderer,
    partition: &dyn RegionPartition,
    scene: &SceneConfig,
    seed: u64,
    sample_id: &SampleId,
    assets_dir: &Path,
    max_retries: u32,
) -> Result<GeneratedSample, PipelineError> {
    for attempt in 0..max_retries {
        let attempt_seed = seed + u64::from(attempt);
        let state = generate_world_state(scene, attempt_seed, partition);

        let issues = validate_world_state(&state);
        if !issues.is_empty() {
            warn!(
                seed = attempt_seed,
                attempt = attempt + 1,
                max_retries,
                "invalid sample, retrying at next seed"
            );
            for issue in &issues {
                warn!(%issue, seed = attempt_seed, "constraint violation");
            }
            continue;
        }

        let render = renderer.render(&state, assets_dir, sample_id, RenderPhase::T1)?;
        info!(seed = attempt_seed, sample = %sample_id, "sample valid");
        return Ok(GeneratedSample { state, render });
    }

    Err(PipelineError::RetriesExhausted {
        attempts: max_retries,
        first_seed: seed,
        last_seed: seed + u64::from(max_retries.saturating_sub(1)),
    })
}

#[cfg(test)]
mod tests {
    use super::{generate_change_pair, generate_one_t1, PipelineError, DEFAULT_MAX_RETRIES};
    use std::path::PathBuf;
    use synthmap_core::{RenderConfig, SampleId, SceneConfig};

    fn temp_assets_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("synthmap_pipeline_{tag}"))
    }

    #[test]
    fn seed_42_produces_a_valid_sample_within_default_retries() {
        let assets_dir = temp_assets_dir("t1");
        let sample = generate_one_t1(
            &SceneConfig::default(),
            &RenderConfig::default(),
            42,
            &SampleId::new("e2e_00001"),
            &assets_dir,
            DEFAULT_MAX_RETRIES,
        )
        .expect("seed 42 must validate within 10 attempts");

        assert_eq!(sample.render.width_px, 512);
        assert_eq!(sample.render.height_px, 512);
        assert!(sample.render.rgb_path.is_file());
        assert!(sample.render.semantic_mask_path.is_file());
        assert!(sample.state.derived().is_some());

        // The written mask must only contain known class ids.
        let mask = image::open(&sample.render.semantic_mask_path)
            .expect("readable mask")
            .to_luma8();
        assert_eq!(mask.dimensions(), (512, 512));
        assert!(mask.pixels().all(|pixel| pixel.0[0] <= 4));

        let _ = std::fs::remove_dir_all(&assets_dir);
    }

    #[test]
    fn generation_with_same_seed_is_reproducible() {
        let assets_dir = temp_assets_dir("repro");
        let run = |tag: &str| {
            generate_one_t1(
                &SceneConfig::default(),
                &RenderConfig::default(),
                42,
                &SampleId::new(tag),
                &assets_dir,
                DEFAULT_MAX_RETRIES,
            )
            .expect("valid sample")
        };

        let first = run("repro_a");
        let second = run("repro_b");
        assert_eq!(first.state, second.state);

        let _ = std::fs::remove_dir_all(&assets_dir);
    }

    #[test]
    fn change_pair_writes_t2_assets_and_log() {
        let assets_dir = temp_assets_dir("pair");
        let pair = generate_change_pair(
            &SceneConfig::default(),
            &RenderConfig::default(),
            42,
            &SampleId::new("pair_00001"),
            &assets_dir,
            DEFAULT_MAX_RETRIES,
        )
        .expect("a standard operator must apply to a valid scene");

        assert!(pair.render_t2.rgb_path.is_file());
        assert!(pair
            .render_t2
            .semantic_mask_path
            .ends_with("pair_00001_t2_semantic.png"));

        let log = &pair.change_log;
        let touched =
            log.added_ids.len() + log.removed_ids.len() + log.modified_ids.len();
        assert!(touched > 0, "an applied change names the entities it touched");
        assert_ne!(pair.state_t2, pair.t1.state);
        assert!(pair.state_t2.derived().is_some());

        let _ = std::fs::remove_dir_all(&assets_dir);
    }

    #[test]
    fn exhausted_retries_name_the_seed_range() {
        let assets_dir = temp_assets_dir("exhausted");
        let err = generate_one_t1(
            &SceneConfig::default(),
            &RenderConfig::default(),
            42,
            &SampleId::new("never"),
            &assets_dir,
            0,
        )
        .expect_err("zero retries can never produce a sample");

        match err {
            PipelineError::RetriesExhausted {
                attempts,
                first_seed,
                last_seed,
            } => {
                assert_eq!(attempts, 0);
                assert_eq!(first_seed, 42);
                assert_eq!(last_seed, 42);
            }
            other => panic!("expected RetriesExhausted, got {other}"),
        }
    }

    #[test]
    fn unsupported_style_fails_before_generation() {
        let assets_dir = temp_assets_dir("style");
        let err = generate_one_t1(
            &SceneConfig::default(),
            &RenderConfig::new("sar"),
            42,
            &SampleId::new("styled"),
            &assets_dir,
            DEFAULT_MAX_RETRIES,
        )
        .expect_err("unknown style is a fatal configuration error");
        assert!(err.to_string().contains("unsupported render style"));
        assert!(!assets_dir.exists(), "no output is produced on config errors");
    }
}
