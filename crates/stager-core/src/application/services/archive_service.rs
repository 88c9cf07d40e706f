//! Archive Service - the `archive` use case.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{ArchiveWriter, Filesystem, output::ArchiveReport},
    },
    domain::{EngineConfig, SourcePolicy},
    error::{Context, StagerResult},
};

/// Packages a finished staging directory into a single archive.
pub struct ArchiveService {
    filesystem: Arc<dyn Filesystem>,
    writer: Box<dyn ArchiveWriter>,
    config: EngineConfig,
}

impl ArchiveService {
    pub fn new(
        filesystem: Arc<dyn Filesystem>,
        writer: Box<dyn ArchiveWriter>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            filesystem,
            writer,
            config: config.clone(),
        }
    }

    /// Archive `source` into `archive`, replacing any existing file there.
    #[instrument(
        skip_all,
        fields(source = %source.as_ref().display(), archive = %archive.as_ref().display())
    )]
    pub fn archive(
        &self,
        source: impl AsRef<Path>,
        archive: impl AsRef<Path>,
    ) -> StagerResult<ArchiveReport> {
        let source = source.as_ref();
        let archive = archive.as_ref();

        if self.config.source_policy == SourcePolicy::Strict
            && self.filesystem.exists(source)
            && !self.filesystem.is_dir(source)
        {
            return Err(ApplicationError::SourceNotDirectory {
                path: source.to_path_buf(),
            })
            .with_context(|| format!("archiving {}", source.display()));
        }

        let report = self
            .writer
            .write(source, archive, &self.config.archive.normalized())
            .with_context(|| format!("archiving {}", source.display()))?;

        info!(entries = report.entries, "Archive written");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::output::{MockArchiveWriter, MockFilesystem};
    use crate::domain::{ArchiveSettings, Compression};
    use crate::error::StagerError;
    use mockall::predicate::*;
    use std::path::PathBuf;

    #[test]
    fn delegates_with_normalized_settings() {
        let fs = MockFilesystem::new();
        let mut writer = MockArchiveWriter::new();
        writer
            .expect_write()
            .with(
                eq(Path::new("/staging")),
                eq(Path::new("/app.zip")),
                eq(ArchiveSettings {
                    compression: Compression::Deflated,
                    level: 9,
                }),
            )
            .times(1)
            .returning(|_, archive, _| {
                Ok(ArchiveReport {
                    path: archive.to_path_buf(),
                    entries: 3,
                })
            });

        let mut config = EngineConfig::default();
        config.archive.level = 200;
        let service = ArchiveService::new(Arc::new(fs), Box::new(writer), &config);

        let report = service.archive("/staging", "/app.zip").unwrap();
        assert_eq!(report.path, PathBuf::from("/app.zip"));
        assert_eq!(report.entries, 3);
    }

    #[test]
    fn strict_policy_refuses_file_source() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_is_dir().return_const(false);
        let mut writer = MockArchiveWriter::new();
        writer.expect_write().never();

        let config = EngineConfig {
            source_policy: SourcePolicy::Strict,
            ..EngineConfig::default()
        };
        let err = ArchiveService::new(Arc::new(fs), Box::new(writer), &config)
            .archive("/staging/file.txt", "/app.zip")
            .unwrap_err();
        assert!(matches!(
            err.root(),
            StagerError::Application(ApplicationError::SourceNotDirectory { .. })
        ));
    }

    #[test]
    fn writer_errors_carry_context() {
        let fs = MockFilesystem::new();
        let mut writer = MockArchiveWriter::new();
        writer.expect_write().returning(|source, _, _| {
            Err(ApplicationError::SourceNotFound {
                path: source.to_path_buf(),
            }
            .into())
        });

        let err = ArchiveService::new(Arc::new(fs), Box::new(writer), &EngineConfig::default())
            .archive("/missing", "/app.zip")
            .unwrap_err();
        assert_eq!(err.operations(), vec!["archiving /missing"]);
    }
}
