//! Clap command tree definition.

use clap::{Arg, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("bagmerge")
        .about("Merge and filter timestamped multi-channel log containers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_merge())
        .subcommand(build_info())
        .subcommand(build_set_root_dir())
}

fn build_merge() -> Command {
    Command::new("merge")
        .about("Merge container files under a root directory into one output file")
        .arg(
            Arg::new("root-dir")
                .help("Directory scanned recursively for container files (default: configured root)")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Path of the merged output file")
                .required(true),
        )
        .arg(
            Arg::new("start")
                .long("start")
                .help("Keep messages logged at or after this instant (RFC 3339)")
                .conflicts_with("time-range"),
        )
        .arg(
            Arg::new("end")
                .long("end")
                .help("Keep messages logged strictly before this instant (RFC 3339)")
                .conflicts_with("time-range"),
        )
        .arg(
            Arg::new("time-range")
                .long("time-range")
                .value_name("SECS")
                .help("Keep only the trailing window of this many seconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("include-topics")
                .long("include-topics")
                .help("Topics to keep (comma separated, repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("exclude-topics")
                .long("exclude-topics")
                .help("Topics to drop (comma separated, repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("include-topics-file")
                .long("include-topics-file")
                .help("File with one topic to keep per line (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("exclude-topics-file")
                .long("exclude-topics-file")
                .help("File with one topic to drop per line (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("latched-transient-output-msgs")
                .long("latched-transient-output-msgs")
                .value_name("N")
                .help("How many latched messages to retain per transient channel")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("1"),
        )
}

fn build_info() -> Command {
    Command::new("info")
        .about("Summarize the container files under a root directory")
        .arg(
            Arg::new("root-dir")
                .help("Directory scanned recursively for container files (default: configured root)")
                .index(1),
        )
        .arg(
            Arg::new("include-topics")
                .long("include-topics")
                .help("Topics to keep (comma separated, repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("exclude-topics")
                .long("exclude-topics")
                .help("Topics to drop (comma separated, repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("include-topics-file")
                .long("include-topics-file")
                .help("File with one topic to keep per line (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("exclude-topics-file")
                .long("exclude-topics-file")
                .help("File with one topic to drop per line (repeatable)")
                .action(clap::ArgAction::Append),
        )
}

fn build_set_root_dir() -> Command {
    Command::new("set-root-dir")
        .about("Persist the default root directory in the defaults file")
        .arg(
            Arg::new("path")
                .help("Directory to use when no root is given on the command line")
                .index(1)
                .required(true),
        )
}
