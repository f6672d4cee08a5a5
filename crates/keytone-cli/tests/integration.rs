//! Integration tests for the keytone binary.

use std::process::Command;
use tempfile::TempDir;

fn keytone_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_keytone"))
}

fn read_samples(path: &std::path::Path) -> (hound::WavSpec, Vec<f32>) {
    let reader = hound::WavReader::open(path).expect("output should be a WAV file");
    let spec = reader.spec();
    let samples = reader
        .into_samples::<f32>()
        .collect::<Result<Vec<_>, _>>()
        .expect("float samples");
    (spec, samples)
}

#[test]
fn help_lists_subcommands() {
    let output = keytone_bin().arg("--help").output().expect("failed to run keytone");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("render"));
    assert!(stdout.contains("play"));
}

#[test]
fn render_writes_float_wav() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("scale.wav");

    let output = keytone_bin()
        .args(["render", "--notes", "C4:100,E4:100,-:50,G4:100", "--tail", "30"])
        .arg(&out)
        .output()
        .expect("failed to run keytone render");
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let (spec, samples) = read_samples(&out);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 48000);
    // 350 ms script + 20 ms release + 30 ms tail
    assert_eq!(samples.len(), 400 * 48 * 2);
    assert!(samples.iter().all(|s| s.abs() <= 1.0));
    assert!(samples.iter().any(|&s| s != 0.0));
    // stereo frames carry the same sample on both channels
    assert!(samples.chunks(2).all(|f| f[0] == f[1]));
}

#[test]
fn render_honours_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("mono.toml");
    std::fs::write(
        &config,
        "sample_rate = 22050\nchannels = 1\n\n[voice]\nwaveform = \"triangle\"\nband_limited = true\n",
    )
    .unwrap();
    let out = dir.path().join("tri.wav");

    let status = keytone_bin()
        .args(["render", "--notes", "A4:200", "--source", "device", "--config"])
        .arg(&config)
        .arg(&out)
        .status()
        .expect("failed to run keytone render");
    assert!(status.success());

    let (spec, samples) = read_samples(&out);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 22050);
    assert!(samples.iter().any(|&s| s > 0.5));
}

#[test]
fn render_rejects_bad_script() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("bad.wav");
    let output = keytone_bin()
        .args(["render", "--notes", "C4:fast"])
        .arg(&out)
        .output()
        .expect("failed to run keytone render");
    assert!(!output.status.success());
    assert!(!out.exists());
}

#[test]
fn render_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "block_size = 0\n").unwrap();
    let output = keytone_bin()
        .args(["render", "--notes", "C4:100", "--config"])
        .arg(&config)
        .arg(dir.path().join("never.wav"))
        .output()
        .expect("failed to run keytone render");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("block_size"));
}
