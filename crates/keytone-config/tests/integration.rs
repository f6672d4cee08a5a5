//! Integration tests for keytone-config.
//!
//! File round trips and rendering through a generator built from a config.

use keytone_config::{ConfigError, SynthConfig, WaveformKind};
use keytone_synth::{Generator, ParamMessage, Waveform};
use tempfile::TempDir;

#[test]
fn save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("keytone.toml");

    let mut config = SynthConfig::default();
    config.voice.waveform = WaveformKind::Triangle;
    config.voice.band_limited = true;
    config.envelope.zero_cross_release = false;
    config.save(&path).unwrap();

    let loaded = SynthConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.waveform(), Waveform::Triangle { band_limited: true });
}

#[test]
fn missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    match SynthConfig::load(&path) {
        Err(ConfigError::ReadFile { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected ReadFile, got {other:?}"),
    }
}

#[test]
fn invalid_file_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "block_size = 0\n").unwrap();
    assert!(matches!(
        SynthConfig::load(&path),
        Err(ConfigError::Invalid {
            field: "block_size",
            ..
        })
    ));
}

#[test]
fn generator_from_config_renders_blocks() {
    let config = SynthConfig::from_toml(
        r#"
sample_rate = 44100
channels = 2
block_size = 64

[voice]
waveform = "square"
duty = 0.25
"#,
    )
    .unwrap();

    let (mut generator, params) = Generator::with_channel(&config.generator_config());
    params.send(ParamMessage::new().with_active(true)).unwrap();

    let mut block = vec![0.0f32; config.block_samples()];
    assert_eq!(generator.process(&mut block), 64);
    assert_eq!(generator.sample_rate(), 44100.0);
    assert_eq!(generator.voice().oscillator().effective_duty(), Some(0.25));
    assert!(block.iter().any(|&s| s != 0.0));
}
