//! Pre-publish checks on tracked style counts.

use std::path::Path;

use serde::Serialize;

use stylesync_core::{SyncConfig, VersionControl};

use crate::error::{SyncError, ValidationError};

/// Tracked style counts of both repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleCounts {
    pub source: usize,
    pub distribution: usize,
}

/// Number of tracked styles in `repo`.
pub fn count_tracked_styles(
    config: &SyncConfig,
    vcs: &dyn VersionControl,
    repo: &Path,
) -> Result<usize, SyncError> {
    Ok(vcs
        .tracked_files(repo)?
        .iter()
        .filter(|name| config.is_style_name(name))
        .count())
}

/// Reject the distribution when counts differ or fall below `floor`.
pub fn check_counts(counts: StyleCounts, floor: usize) -> Result<(), ValidationError> {
    if counts.source != counts.distribution {
        return Err(ValidationError::CountMismatch {
            source_count: counts.source,
            distribution_count: counts.distribution,
        });
    }
    if counts.distribution < floor {
        return Err(ValidationError::BelowFloor {
            count: counts.distribution,
            floor,
        });
    }
    Ok(())
}

/// Count tracked styles in both repositories and apply [`check_counts`].
pub fn validate(config: &SyncConfig, vcs: &dyn VersionControl) -> Result<StyleCounts, SyncError> {
    let counts = StyleCounts {
        source: count_tracked_styles(config, vcs, &config.source_root)?,
        distribution: count_tracked_styles(config, vcs, &config.distribution_root)?,
    };
    tracing::info!("Original styles: {}", counts.source);
    tracing::info!("Distribution styles: {}", counts.distribution);

    check_counts(counts, config.min_styles)?;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(source: usize, distribution: usize) -> StyleCounts {
        StyleCounts {
            source,
            distribution,
        }
    }

    #[test]
    fn equal_counts_above_floor_pass() {
        assert_eq!(check_counts(counts(6000, 6000), 6000), Ok(()));
        assert_eq!(check_counts(counts(9000, 9000), 6000), Ok(()));
    }

    #[test]
    fn mismatch_is_reported_first() {
        assert_eq!(
            check_counts(counts(10, 9), 6000),
            Err(ValidationError::CountMismatch {
                source_count: 10,
                distribution_count: 9
            })
        );
    }

    #[test]
    fn equal_counts_below_floor_fail() {
        assert_eq!(
            check_counts(counts(5999, 5999), 6000),
            Err(ValidationError::BelowFloor {
                count: 5999,
                floor: 6000
            })
        );
    }

    #[test]
    fn zero_floor_accepts_empty_repositories() {
        assert_eq!(check_counts(counts(0, 0), 0), Ok(()));
    }
}
