//! Topic list assembly.
//!
//! Inline topic arguments may repeat and may carry comma-separated entries;
//! topic files hold one topic per line with blank lines and surrounding
//! whitespace ignored. Everything is merged into a single include set and a
//! single exclude set before any filtering happens.

use std::fs;
use std::io;
use std::path::Path;

use bagmerge_core::{Error, Result, TopicFilter};

use crate::config::MergeConfig;

/// Split inline topic arguments on commas, trimming each entry.
pub fn split_topic_args(values: &[String]) -> Vec<String> {
    let mut topics = Vec::new();
    for value in values {
        for part in value.split(',') {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                topics.push(trimmed.to_string());
            }
        }
    }
    topics
}

/// Read one topic per line from a text file.
pub fn read_topics_file(path: &Path) -> io::Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Build the run's topic filter from the configuration.
///
/// An unreadable topic file is a configuration error, as is an include file
/// set that produces no topics at all (silently including everything would
/// invert the caller's intent).
pub fn build_filter(config: &MergeConfig) -> Result<TopicFilter> {
    let mut include = split_topic_args(&config.include_topics);
    let mut exclude = split_topic_args(&config.exclude_topics);

    if !config.include_topic_files.is_empty() {
        let mut from_files = Vec::new();
        for path in &config.include_topic_files {
            from_files.extend(load(path)?);
        }
        if from_files.is_empty() {
            return Err(Error::Configuration(
                "no topics specified in include topic files".to_string(),
            ));
        }
        include.extend(from_files);
    }

    for path in &config.exclude_topic_files {
        exclude.extend(load(path)?);
    }

    Ok(TopicFilter::new(include, exclude))
}

fn load(path: &Path) -> Result<Vec<String>> {
    read_topics_file(path)
        .map_err(|e| Error::Configuration(format!("cannot read topic file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_split_comma_separated_args() {
        let topics = split_topic_args(&owned(&["/a,/b", " /c ", "", " , "]));
        assert_eq!(topics, owned(&["/a", "/b", "/c"]));
    }

    #[test]
    fn test_read_topics_file_trims_and_skips_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("topics.txt");
        fs::write(&path, "  /a  \n\n/b\n   \n/c").unwrap();

        let topics = read_topics_file(&path).unwrap();
        assert_eq!(topics, owned(&["/a", "/b", "/c"]));
    }

    #[test]
    fn test_build_filter_merges_args_and_files() {
        let dir = tempdir().unwrap();
        let inc = dir.path().join("inc.txt");
        let exc = dir.path().join("exc.txt");
        fs::write(&inc, "/from_file\n").unwrap();
        fs::write(&exc, "/banned\n").unwrap();

        let mut config = MergeConfig::new(dir.path(), dir.path().join("out.bag"));
        config.include_topics = owned(&["/inline"]);
        config.include_topic_files = vec![inc];
        config.exclude_topic_files = vec![exc];

        let filter = build_filter(&config).unwrap();
        assert!(filter.passes("/inline"));
        assert!(filter.passes("/from_file"));
        assert!(!filter.passes("/banned"));
        assert!(!filter.passes("/other"));
    }

    #[test]
    fn test_missing_topic_file_is_configuration_error() {
        let dir = tempdir().unwrap();
        let mut config = MergeConfig::new(dir.path(), dir.path().join("out.bag"));
        config.exclude_topic_files = vec![dir.path().join("gone.txt")];

        assert!(build_filter(&config).is_err());
    }

    #[test]
    fn test_empty_include_files_are_rejected() {
        let dir = tempdir().unwrap();
        let inc = dir.path().join("inc.txt");
        fs::write(&inc, "\n   \n").unwrap();

        let mut config = MergeConfig::new(dir.path(), dir.path().join("out.bag"));
        config.include_topic_files = vec![inc];

        assert!(build_filter(&config).is_err());
    }
}
