// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use std::env;
use std::sync::Arc;
use the_pipes::backends::YamlWorkspace;
use the_pipes::config::RunOptions;
use the_pipes::engine::Pipes;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: the-pipes <manifest.yaml> <pipeline> [component ...] [--parallelism N] [--no-topo]";

/// Command line arguments after parsing.
struct Args {
    manifest: String,
    pipeline: String,
    components: Vec<String>,
    options: RunOptions,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut options = RunOptions::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--parallelism" | "-j" => {
                let value = iter.next().context("--parallelism needs a value")?;
                let parallelism = value
                    .parse::<usize>()
                    .with_context(|| format!("invalid parallelism '{}'", value))?;
                options = options.with_parallelism(parallelism);
            }
            "--no-topo" => options = options.with_topological_sort(false),
            flag if flag.starts_with("--") => bail!("unknown flag '{}'\n{}", flag, USAGE),
            _ => positional.push(arg.clone()),
        }
    }

    if positional.len() < 2 {
        bail!(USAGE);
    }
    let mut positional = positional.into_iter();
    let manifest = positional.next().unwrap_or_default();
    let pipeline = positional.next().unwrap_or_default();
    Ok(Args {
        manifest,
        pipeline,
        components: positional.collect(),
        options,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&raw)?;

    let workspace = Arc::new(
        YamlWorkspace::load(&args.manifest)
            .with_context(|| format!("failed to load workspace '{}'", args.manifest))?,
    );
    let mut pipes = Pipes::new(workspace.clone(), workspace.clone())
        .with_default_options(workspace.default_options());
    for script in workspace.scripts() {
        pipes.register_script(&script.extension, &script.task, script.path);
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling run");
                cancel.cancel();
            }
        });
    }

    let report = pipes
        .run_with_cancellation(&args.pipeline, &args.components, Some(args.options), cancel)
        .await
        .with_context(|| format!("pipeline '{}' failed", args.pipeline))?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_success() || report.cancelled {
        std::process::exit(1);
    }
    Ok(())
}
