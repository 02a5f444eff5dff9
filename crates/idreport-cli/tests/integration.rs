//! Subcommands run against a throwaway registry and project

use std::path::Path;

use idreport_cli::input::ExportArgs;
use idreport_cli::output::Format;
use idreport_cli::runner::Runner;
use serde_json::json;

fn write_project(path: &Path) -> anyhow::Result<()> {
    let peptide = |sequence: &str| json!({ "sequence": sequence, "proteins": ["P1"] });
    let assumption = |key: &str, sequence: &str, e_value: f64| {
        json!({
            "key": key,
            "engine": "Sage",
            "peptide": peptide(sequence),
            "charge": 2,
            "e_value": e_value,
        })
    };
    let project = json!({
        "project": { "name": "Demo", "sample": "HeLa", "replicate": 1 },
        "parameters": {
            "enzyme": { "missed_cleavages": 0 },
            "decoy_tag": "DECOY_",
        },
        "proteins": [
            { "key": "pg1", "accessions": ["P1"], "peptides": ["pep1", "pep2"] }
        ],
        "peptides": [
            { "key": "pep1", "peptide": peptide("AEGILSK"), "spectra": ["s1"] },
            { "key": "pep2", "peptide": peptide("DFHLMTK"), "spectra": ["s2"] }
        ],
        "spectra": [
            {
                "key": "s1", "file": "run.mgf", "title": "scan=1", "precursor_mz": 360.2,
                "best": assumption("a1", "AEGILSK", 0.001),
                "assumptions": [assumption("a1", "AEGILSK", 0.001)]
            },
            {
                "key": "s2", "file": "run.mgf", "title": "scan=2", "precursor_mz": 425.7,
                "best": assumption("a2", "DFHLMTK", 0.3),
                "assumptions": [assumption("a2", "DFHLMTK", 0.3)]
            }
        ],
        "validation": {
            "pg1": { "score": 1.0, "confidence": 100.0, "validated": true, "decoy": false },
            "pep1": { "score": 1.0, "confidence": 100.0, "validated": true, "decoy": false },
            "pep2": { "score": 0.1, "confidence": 20.0, "validated": false, "decoy": false },
            "s1": { "score": 1.0, "confidence": 100.0, "validated": true, "decoy": false },
            "s2": { "score": 0.1, "confidence": 20.0, "validated": false, "decoy": false }
        },
        "sequences": { "P1": "AEGILSKDFHLMTKEGHNQVK" }
    });
    std::fs::write(path, serde_json::to_vec_pretty(&project)?)?;
    Ok(())
}

fn export_args(dir: &Path, scheme: &str, output: &str) -> ExportArgs {
    ExportArgs {
        scheme: scheme.into(),
        input: dir.join("project.json"),
        output: dir.join(output),
        validated_only: false,
        include_decoys: false,
        format: Format::Text,
    }
}

#[test]
fn export_text_report() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_project(&dir.path().join("project.json"))?;
    let runner = Runner::open(dir.path().join("schemes.json"));

    let args = export_args(dir.path(), "Default PSM Report", "psms.txt");
    let (summary, paths) = runner.export(&args)?;
    assert_eq!(summary.total_rows(), 2);
    assert_eq!(paths, vec![dir.path().join("psms.txt")]);

    let validated = ExportArgs {
        validated_only: true,
        ..args
    };
    let (summary, _) = runner.export(&validated)?;
    assert_eq!(summary.total_rows(), 1);
    let text = std::fs::read_to_string(dir.path().join("psms.txt"))?;
    assert!(text.contains("scan=1"));
    assert!(!text.contains("scan=2"));
    Ok(())
}

#[test]
fn export_sheets_by_index() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_project(&dir.path().join("project.json"))?;
    let runner = Runner::open(dir.path().join("schemes.json"));

    let index = runner
        .registry
        .names()
        .iter()
        .position(|name| name == "Certificate of Analysis")
        .map(|ix| ix + 1)
        .unwrap();

    let args = ExportArgs {
        format: Format::Sheets,
        ..export_args(dir.path(), &index.to_string(), "certificate")
    };
    let (summary, paths) = runner.export(&args)?;
    assert_eq!(summary.rows.len(), 3);
    assert_eq!(paths.len(), 3);
    for path in &paths {
        assert!(path.exists());
        assert_eq!(path.parent(), Some(dir.path().join("certificate").as_path()));
    }

    let project = std::fs::read_to_string(dir.path().join("certificate/Project Details.csv"))?;
    assert!(project.contains("Demo"));
    Ok(())
}

#[test]
fn failed_export_leaves_no_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_project(&dir.path().join("project.json"))?;
    let mut runner = Runner::open(dir.path().join("schemes.json"));

    let scheme = dir.path().join("bad.json");
    std::fs::write(
        &scheme,
        r#"{"name": "Unscored", "sections": ["Peptide Identification Summary"],
            "features": {"Peptide Identification Summary": ["probabilistic_score"]}}"#,
    )?;
    runner.add(&scheme)?;

    let mut project: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("project.json"))?)?;
    project["parameters"]["localization_score"] = json!("D-score");
    std::fs::write(dir.path().join("project.json"), serde_json::to_vec(&project)?)?;

    let args = export_args(dir.path(), "Unscored", "peptides.txt");
    assert!(runner.export(&args).is_err());
    assert!(!dir.path().join("peptides.txt").exists());
    Ok(())
}

#[test]
fn add_show_remove() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let registry = dir.path().join("config").join("schemes.json");
    let scheme = dir.path().join("mine.json");
    std::fs::write(
        &scheme,
        r#"{"name": "Mine", "sections": ["Protein Identification Summary"],
            "features": {"Protein Identification Summary": ["accession", "coverage"]},
            "include_sub_features": true}"#,
    )?;

    let mut runner = Runner::open(&registry);
    assert_eq!(runner.add(&scheme)?, "Mine");
    assert!(runner.list().iter().any(|line| line.ends_with("Mine (user)")));

    // a fresh process sees the same registry
    let mut runner = Runner::open(&registry);
    let shown = runner.show("Mine")?;
    assert!(shown.starts_with("Protein Identification Summary\n  Main Accession"));
    assert!(shown.contains("    Possible Coverage"));

    runner.remove("Mine")?;
    assert!(runner.remove("Mine").is_err());
    assert!(runner.remove("Default PSM Report").is_err());
    assert!(Runner::open(&registry).registry.get("Mine").is_none());
    Ok(())
}

#[test]
fn unknown_scheme() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_project(&dir.path().join("project.json"))?;
    let runner = Runner::open(dir.path().join("schemes.json"));
    assert!(runner
        .export(&export_args(dir.path(), "No Such Report", "out.txt"))
        .is_err());
    assert!(runner.show("999").is_err());
    Ok(())
}
