use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::path::Path;
use tempfile::tempdir;

const EVENTS: &str = r#"{"event_id": 0, "collections": {"CrystalHitsCollection": [{"track_id": 7, "time": 3.4, "energy_deposit": 1.2, "position": [0, 0, 0], "ion": {"z": 32, "a": 77}, "volume_name": "Ge_log"}]}, "trajectories": [{"track_id": 7, "parent_id": 3, "pdg_encoding": 11, "particle_name": "e-", "vertex_volume": "Ge_log", "vertex_position": [0, 0, 0], "points": [[0, 0, 0], [1, 0, 0]]}, {"track_id": 3, "parent_id": 0, "pdg_encoding": -13, "particle_name": "mu+", "vertex_volume": "Lar_log", "vertex_position": [0, 0, 5000], "points": [[0, 0, 5000]]}]}
{"event_id": 1, "collections": {"CrystalHitsCollection": []}, "trajectories": []}
{"event_id": 2, "collections": {"CrystalHitsCollection": [{"track_id": 4, "time": 10.0, "energy_deposit": 0.5, "position": [10, 20, 30]}]}, "trajectories": [{"track_id": 1, "parent_id": 0, "pdg_encoding": 13, "vertex_volume": "Cavern_log", "vertex_position": [0, 0, 0]}, {"track_id": 4, "parent_id": 1, "pdg_encoding": 22, "vertex_volume": "Water_log", "vertex_position": [0, 0, 0]}, {"track_id": 4, "parent_id": 1, "pdg_encoding": 22, "vertex_volume": "Water_log", "vertex_position": [0, 0, 0], "points": [[0, 0, 0], [0, 0, 1]], "continuation": true}]}
"#;

const BAD_EVENTS: &str = r#"{"event_id": 5, "collections": {"CrystalHitsCollection": [{"track_id": 1, "time": 1.0, "energy_deposit": 1.0, "position": [0, 0, 0]}]}, "trajectories": [{"track_id": 1, "parent_id": 0, "pdg_encoding": 13, "vertex_volume": "Nowhere_log", "vertex_position": [0, 0, 0]}]}
"#;

fn muar(dir: &Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("muar")?;
    // Keep user and local config files out of the test
    cmd.current_dir(dir).env_remove("MUAR_CONFIG").env("RUST_LOG", "warn");
    Ok(cmd)
}

#[test]
fn process_then_verify_binary() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("events.jsonl"), EVENTS)?;

    muar(tmp.path())?
        .args(["process", "events.jsonl", "--output", "out/run.muar", "--points", "-j", "2", "--no-progress"])
        .assert()
        .success();
    assert!(tmp.path().join("out/run.muar").exists());

    muar(tmp.path())?
        .args(["inspect", "out/run.muar", "--verify", "--against", "events.jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hits"))
        .stdout(predicate::str::contains("2 events with hits"))
        .stdout(predicate::str::contains("consistent"));
    Ok(())
}

#[test]
fn process_json_output() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("events.jsonl"), EVENTS)?;

    muar(tmp.path())?
        .args(["process", "events.jsonl", "--output", "run.json", "--no-progress"])
        .assert()
        .success();

    let text = std::fs::read_to_string(tmp.path().join("run.json"))?;
    let tables: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(tables["hits"].as_array().map(|a| a.len()), Some(2));
    // 7 -> [7, 3] and 4 -> [4, 1]
    assert_eq!(tables["trajectories"].as_array().map(|a| a.len()), Some(4));
    assert_eq!(tables["trajectories"][0]["parent_id"], 3);
    assert_eq!(tables["trajectories"][1]["pdg"], -13);
    Ok(())
}

#[test]
fn unknown_volume_fails_the_run() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("bad.jsonl"), BAD_EVENTS)?;

    muar(tmp.path())?
        .args(["process", "bad.jsonl", "--output", "bad.muar", "--no-progress"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nowhere_log"));
    assert!(!tmp.path().join("bad.muar").exists());
    Ok(())
}

#[test]
fn corrupted_file_fails_inspection() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("events.jsonl"), EVENTS)?;
    muar(tmp.path())?
        .args(["process", "events.jsonl", "--output", "run.muar", "--no-progress"])
        .assert()
        .success();

    let path = tmp.path().join("run.muar");
    let mut bytes = std::fs::read(&path)?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&path, bytes)?;

    muar(tmp.path())?.args(["inspect", "run.muar"]).assert().failure();
    Ok(())
}

#[test]
fn geometry_and_init() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;

    muar(tmp.path())?
        .args(["geometry", "cryostat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TPC_log"));

    muar(tmp.path())?.args(["init"]).assert().success();
    assert!(tmp.path().join("muar.toml").exists());
    muar(tmp.path())?.args(["init"]).assert().failure();

    // The local file now drives the geometry listing
    std::fs::write(tmp.path().join("muar.toml"), "[run]\ngeometry = \"cryostat\"\n")?;
    muar(tmp.path())?
        .args(["geometry"])
        .assert()
        .success()
        .stdout(predicate::str::contains("World_log"));
    Ok(())
}
