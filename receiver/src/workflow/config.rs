use crate::generator::{GeneratorConfig, SyntheticSource};
use anyhow::{bail, Context};
use std::path::PathBuf;
use std::time::Duration;
use trailcore::transport::{open_replay, open_serial, LineSource};
use trailcore::SessionConfig;

/// Where the producer thread reads lines from.
#[derive(Debug, Clone)]
pub enum SourceKind {
    Serial { port: String, baud: u32 },
    Replay { path: PathBuf, pace: Duration },
    Synthetic(GeneratorConfig),
}

impl SourceKind {
    /// Synthetic wins over replay, replay over the serial port.
    pub fn select(config: &SessionConfig, synthetic: Option<GeneratorConfig>) -> anyhow::Result<Self> {
        if let Some(generator) = synthetic {
            return Ok(SourceKind::Synthetic(generator));
        }
        if let Some(path) = &config.replay {
            return Ok(SourceKind::Replay {
                path: path.clone(),
                pace: Duration::from_millis(config.replay_pace_ms),
            });
        }
        match &config.port {
            Some(port) => Ok(SourceKind::Serial {
                port: port.clone(),
                baud: config.baud,
            }),
            None => bail!("no telemetry source: pass --port, --replay or --simulate"),
        }
    }

    pub fn open(&self, read_timeout: Duration) -> anyhow::Result<Box<dyn LineSource>> {
        let source: Box<dyn LineSource> = match self {
            SourceKind::Serial { port, baud } => Box::new(
                open_serial(port, *baud, read_timeout)
                    .with_context(|| format!("opening serial port {port}"))?,
            ),
            SourceKind::Replay { path, pace } => Box::new(
                open_replay(path, *pace)
                    .with_context(|| format!("opening replay log {}", path.display()))?,
            ),
            SourceKind::Synthetic(generator) => {
                Box::new(SyntheticSource::new(generator.clone(), read_timeout))
            }
        };
        Ok(source)
    }
}

/// Session settings from a YAML file, or from command-line values.
pub fn load_session_config(
    path: Option<&PathBuf>,
    from_args: SessionConfig,
) -> anyhow::Result<SessionConfig> {
    let config = match path {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading session config {}", path.display()))?,
        None => from_args,
    };
    config.validate().context("validating session config")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_source_is_an_error() {
        assert!(SourceKind::select(&SessionConfig::default(), None).is_err());
    }

    #[test]
    fn synthetic_then_replay_then_serial() {
        let config = SessionConfig {
            port: Some("/dev/ttyUSB0".into()),
            replay: Some(PathBuf::from("capture.log")),
            ..Default::default()
        };
        assert!(matches!(
            SourceKind::select(&config, Some(GeneratorConfig::default())).unwrap(),
            SourceKind::Synthetic(_)
        ));
        assert!(matches!(
            SourceKind::select(&config, None).unwrap(),
            SourceKind::Replay { .. }
        ));
        let serial_only = SessionConfig {
            replay: None,
            ..config
        };
        assert!(matches!(
            SourceKind::select(&serial_only, None).unwrap(),
            SourceKind::Serial { baud: 115_200, .. }
        ));
    }

    #[test]
    fn yaml_file_overrides_arguments() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"max_points: 42\ninterval_secs: 0.25\n").unwrap();
        let path = temp.path().to_path_buf();
        let cfg = load_session_config(Some(&path), SessionConfig::default()).unwrap();
        assert_eq!(cfg.max_points, 42);
        assert_eq!(cfg.interval_secs, 0.25);
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let from_args = SessionConfig {
            max_points: 0,
            ..Default::default()
        };
        assert!(load_session_config(None, from_args).is_err());
    }

    #[test]
    fn missing_replay_file_fails_to_open() {
        let kind = SourceKind::Replay {
            path: PathBuf::from("/nonexistent/capture.log"),
            pace: Duration::ZERO,
        };
        assert!(kind.open(Duration::from_millis(10)).is_err());
    }
}
