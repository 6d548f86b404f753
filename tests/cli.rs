use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn regioncap_cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("regioncap").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home).env_remove("RUST_LOG");
    cmd
}

fn write_png(path: &Path, width: i32, height: i32) {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
    let ctx = cairo::Context::new(&surface).unwrap();
    ctx.set_source_rgb(1.0, 1.0, 1.0);
    ctx.paint().unwrap();
    drop(ctx);
    let mut file = std::fs::File::create(path).unwrap();
    surface.write_to_png(&mut file).unwrap();
}

fn png_size(path: &Path) -> (i32, i32) {
    let mut file = std::fs::File::open(path).unwrap();
    let surface = cairo::ImageSurface::create_from_png(&mut file).unwrap();
    (surface.width(), surface.height())
}

#[test]
fn help_prints_usage() {
    let temp = TempDir::new().unwrap();
    regioncap_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Region capture and annotation overlay tools",
        ));
}

#[test]
fn map_rect_scales_to_physical_pixels() {
    let temp = TempDir::new().unwrap();
    regioncap_cmd(temp.path())
        .args([
            "map-rect",
            "--query",
            "origin_x=0&origin_y=0&width=2880&height=1800&scale=2",
            "10",
            "10",
            "200",
            "150",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"x\": 20"))
        .stdout(predicate::str::contains("\"width\": 400"))
        .stdout(predicate::str::contains("\"height\": 300"));
}

#[test]
fn map_rect_requires_monitor_size() {
    let temp = TempDir::new().unwrap();
    regioncap_cmd(temp.path())
        .args(["map-rect", "--query", "origin_x=0&height=900", "0", "0", "10", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing 'width'"));
}

#[test]
fn flatten_writes_annotated_png() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("base.png");
    let ops = temp.path().join("ops.json");
    let out = temp.path().join("out.png");
    write_png(&base, 120, 80);
    std::fs::write(
        &ops,
        r#"[
            {"kind": "rectangle", "color": {"r": 1.0, "g": 0.0, "b": 0.0, "a": 1.0},
             "width": 3.0, "start": {"x": 10.0, "y": 10.0}, "end": {"x": 60.0, "y": 50.0}},
            {"kind": "mosaic", "size": 12.0, "points": [{"x": 90.0, "y": 40.0}]}
        ]"#,
    )
    .unwrap();

    regioncap_cmd(temp.path())
        .arg("flatten")
        .arg("--base")
        .arg(&base)
        .arg("--ops")
        .arg(&ops)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(png_size(&out), (120, 80));
}

#[test]
fn flatten_rejects_malformed_operations() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("base.png");
    let ops = temp.path().join("ops.json");
    write_png(&base, 10, 10);
    std::fs::write(&ops, r#"[{"kind": "hexagon"}]"#).unwrap();

    regioncap_cmd(temp.path())
        .arg("flatten")
        .arg("--base")
        .arg(&base)
        .arg("--ops")
        .arg(&ops)
        .arg("--out")
        .arg(temp.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse operations"));
}

#[test]
fn replay_session_finalizes_capture() {
    let temp = TempDir::new().unwrap();
    let screen = temp.path().join("screen.png");
    let script = temp.path().join("session.json");
    let out_dir = temp.path().join("captures");
    write_png(&screen, 400, 300);
    std::fs::write(
        &script,
        r#"{
            "events": [
                {"type": "pointer_down", "x": 10, "y": 10},
                {"type": "pointer_move", "x": 110, "y": 60},
                {"type": "pointer_up", "x": 110, "y": 60},
                {"type": "tool", "tool": "arrow"},
                {"type": "pointer_down", "x": 20, "y": 20},
                {"type": "pointer_move", "x": 90, "y": 50},
                {"type": "pointer_up", "x": 90, "y": 50},
                {"type": "key", "key": "Enter"}
            ]
        }"#,
    )
    .unwrap();

    regioncap_cmd(temp.path())
        .arg("replay")
        .arg("--screen")
        .arg(&screen)
        .arg("--script")
        .arg(&script)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"finalized\""))
        .stdout(predicate::str::contains("\"width\": 100"));

    let saved: Vec<_> = std::fs::read_dir(&out_dir).unwrap().collect();
    assert_eq!(saved.len(), 1);
    let path = saved[0].as_ref().unwrap().path();
    assert_eq!(png_size(&path), (100, 50));
}

#[test]
fn replay_reports_tiny_selection() {
    let temp = TempDir::new().unwrap();
    let screen = temp.path().join("screen.png");
    let script = temp.path().join("session.json");
    write_png(&screen, 200, 200);
    std::fs::write(
        &script,
        r#"{"events": [
            {"type": "pointer_down", "x": 50, "y": 50},
            {"type": "pointer_up", "x": 53, "y": 53}
        ]}"#,
    )
    .unwrap();

    regioncap_cmd(temp.path())
        .arg("replay")
        .arg("--screen")
        .arg(&screen)
        .arg("--script")
        .arg(&script)
        .arg("--out-dir")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"phase\": \"idle\""))
        .stderr(predicate::str::contains("too small"));
}

#[test]
fn init_config_writes_example_once() {
    let temp = TempDir::new().unwrap();
    regioncap_cmd(temp.path())
        .arg("init-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
    assert!(temp.path().join("regioncap").join("config.toml").exists());

    regioncap_cmd(temp.path())
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
