#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates synthmap samples.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use synthmap_core::SampleId;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod pipeline;

use config::AppConfig;
use pipeline::DEFAULT_MAX_RETRIES;

/// Deterministic procedural scene generator.
#[derive(Debug, Parser)]
#[command(name = "synthmap", version, about)]
struct Args {
    /// Root seed of the run; sample `i` starts at `seed + i * max_retries`.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of samples to generate.
    #[arg(long, default_value_t = 1)]
    samples: u32,

    /// Directory receiving the rendered image files.
    #[arg(long, default_value = "data/out/assets")]
    out_dir: PathBuf,

    /// Also derive a localized T2 change for every sample.
    #[arg(long)]
    change_pairs: bool,

    /// Seeds tried per sample before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Optional TOML file overriding the scene/render configuration.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let app: AppConfig = match &args.config {
        Some(path) => config::load_app_config(path)?,
        None => AppConfig::default(),
    };

    for index in 0..args.samples {
        let sample_id = SampleId::new(format!("sample_{index:05}"));
        // Disjoint retry ranges keep samples independent of each other's
        // retry behavior.
        let sample_seed = args.seed + u64::from(index) * u64::from(args.max_retries.max(1));

        if args.change_pairs {
            let pair = pipeline::generate_change_pair(
                &app.scene,
                &app.render,
                sample_seed,
                &sample_id,
                &args.out_dir,
                args.max_retries,
            )
            .with_context(|| format!("sample {sample_id} failed"))?;
            let t2_buildings = pair
                .state_t2
                .derived()
                .map_or(0, |derived| derived.global_stats.building_count);
            info!(
                sample = %sample_id,
                change = %pair.change_log.change_type,
                region = %pair.change_log.region,
                t2_buildings,
                t1_rgb = %pair.t1.render.rgb_path.display(),
                t2_rgb = %pair.render_t2.rgb_path.display(),
                "change pair written"
            );
        } else {
            let sample = pipeline::generate_one_t1(
                &app.scene,
                &app.render,
                sample_seed,
                &sample_id,
                &args.out_dir,
                args.max_retries,
            )
            .with_context(|| format!("sample {sample_id} failed"))?;
            info!(
                sample = %sample_id,
                seed = sample.state.provenance().seed(),
                rgb = %sample.render.rgb_path.display(),
                mask = %sample.render.semantic_mask_path.display(),
                "sample written"
            );
        }
    }

    Ok(())
}
