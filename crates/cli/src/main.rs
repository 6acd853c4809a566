//! `bagmerge` command-line entry point.

mod commands;
mod defaults;
mod info;
mod parse;

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing_subscriber::EnvFilter;

use bagmerge_core::TopicFilter;
use bagmerge_merge::{topics, MergeConfig};

fn main() {
    let matches = commands::build_cli().get_matches();
    let debug = matches.get_flag("debug");
    init_tracing(debug);

    let result = match matches.subcommand() {
        Some(("merge", sub)) => run_merge(sub, debug),
        Some(("info", sub)) => run_info(sub),
        Some(("set-root-dir", sub)) => run_set_root_dir(sub),
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_merge(sub: &ArgMatches, debug: bool) -> Result<()> {
    let output = sub
        .get_one::<String>("output")
        .map(PathBuf::from)
        .context("--output is required")?;

    let mut config = MergeConfig::new(root_dir_from(sub)?, output);
    config.start = sub
        .get_one::<String>("start")
        .map(|s| parse::parse_instant(s))
        .transpose()?;
    config.end = sub
        .get_one::<String>("end")
        .map(|s| parse::parse_instant(s))
        .transpose()?;
    config.relative_secs = sub.get_one::<u64>("time-range").copied();
    config.include_topics = collect_strings(sub, "include-topics");
    config.exclude_topics = collect_strings(sub, "exclude-topics");
    config.include_topic_files = collect_paths(sub, "include-topics-file");
    config.exclude_topic_files = collect_paths(sub, "exclude-topics-file");
    config.latched_transient_msgs = sub
        .get_one::<u64>("latched-transient-output-msgs")
        .copied()
        .unwrap_or(1) as usize;
    config.debug = debug;

    let started = Instant::now();
    let summary = bagmerge_merge::run(&config)?;

    println!(
        "Merged into {} in {:.2} s",
        config.output.display(),
        started.elapsed().as_secs_f64()
    );
    println!("{summary}");
    Ok(())
}

fn run_info(sub: &ArgMatches) -> Result<()> {
    let root_dir = root_dir_from(sub)?;
    let filter = filter_from(sub)?;
    info::run(&root_dir, &filter)
}

fn run_set_root_dir(sub: &ArgMatches) -> Result<()> {
    let root_dir = sub
        .get_one::<String>("path")
        .map(PathBuf::from)
        .context("path is required")?;
    let written = defaults::set_default_root_dir(&root_dir)?;
    println!(
        "Default root directory set to {} ({})",
        root_dir.display(),
        written.display()
    );
    Ok(())
}

fn root_dir_from(sub: &ArgMatches) -> Result<PathBuf> {
    match sub.get_one::<String>("root-dir") {
        Some(path) => Ok(PathBuf::from(path)),
        None => defaults::default_root_dir(),
    }
}

fn filter_from(sub: &ArgMatches) -> Result<TopicFilter> {
    let mut include = topics::split_topic_args(&collect_strings(sub, "include-topics"));
    let mut exclude = topics::split_topic_args(&collect_strings(sub, "exclude-topics"));

    for path in collect_paths(sub, "include-topics-file") {
        include.extend(
            topics::read_topics_file(&path)
                .with_context(|| format!("cannot read topic file {}", path.display()))?,
        );
    }
    for path in collect_paths(sub, "exclude-topics-file") {
        exclude.extend(
            topics::read_topics_file(&path)
                .with_context(|| format!("cannot read topic file {}", path.display()))?,
        );
    }
    Ok(TopicFilter::new(include, exclude))
}

fn collect_strings(sub: &ArgMatches, id: &str) -> Vec<String> {
    sub.get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn collect_paths(sub: &ArgMatches, id: &str) -> Vec<PathBuf> {
    sub.get_many::<String>(id)
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default()
}
