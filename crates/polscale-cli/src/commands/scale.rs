use crate::cli::ScaleArgs;
use crate::config::builder::build_config;
use crate::error::{CliError, Result};
use crate::summary::Summary;
use polscale::core::io::xml::XmlDocument;
use polscale::engine::error::EngineError;
use polscale::workflows;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

pub fn run(args: ScaleArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_config(&args.inputs, args.output.as_deref(), args.pairs_csv.as_deref())?;

    info!("Loading force field from {:?}", &config.forcefield_path);
    let mut document = XmlDocument::load(&config.forcefield_path).map_err(EngineError::from)?;

    println!("Scaling Lennard-Jones parameters...");
    let report = workflows::scale::run(&mut document, &config.core_config)?;

    let bytes = document.to_bytes().map_err(EngineError::from)?;
    let pair_table = match &config.pairs_csv {
        Some(csv_path) => {
            let mut buffer = Vec::new();
            report
                .write_pairs_csv(&mut buffer)
                .map_err(|e| CliError::Output {
                    path: csv_path.clone(),
                    source: e.into(),
                })?;
            Some((csv_path, buffer))
        }
        None => None,
    };

    // Both files are staged before either is moved into place.
    let staged_output = stage(&config.output_path, &bytes)?;
    let staged_pairs = pair_table
        .map(|(path, buffer)| stage(path, &buffer).map(|file| (path, file)))
        .transpose()?;

    persist(staged_output, &config.output_path)?;
    info!("Scaled force field written to {:?}", &config.output_path);
    if let Some((csv_path, file)) = staged_pairs {
        persist(file, csv_path)?;
        println!("✓ Pair table written to: {}", csv_path.display());
    }

    print!("{}", Summary(&report));
    println!(
        "✓ Scaled force field written to: {}",
        config.output_path.display()
    );
    Ok(())
}

fn output_error(path: &Path, source: anyhow::Error) -> CliError {
    CliError::Output {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes `bytes` to a temporary file in the directory of `path`.
fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut file = NamedTempFile::new_in(dir).map_err(|e| output_error(path, e.into()))?;
    file.write_all(bytes)
        .map_err(|e| output_error(path, e.into()))?;
    Ok(file)
}

/// Renames a staged file into place.
fn persist(file: NamedTempFile, path: &Path) -> Result<()> {
    file.persist(path)
        .map_err(|e| output_error(path, e.error.into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::InputArgs;
    use std::fs;
    use tempfile::tempdir;

    const FIELD: &str = r#"<ForceField>
 <AtomTypes>
  <Type name="c2c1im_NA" class="NA" element="N"/>
  <Type name="dca_N3A" class="N3A" element="N"/>
 </AtomTypes>
 <LennardJonesForce>
  <Atom class="NA" sigma="0.325" epsilon="0.71128"/>
  <Atom class="N3A" sigma="0.33" epsilon="0.71128"/>
  <NBFixPair class1="NA" class2="N3A" sigma="0.325" epsilon="0.71128"/>
 </LennardJonesForce>
</ForceField>
"#;

    fn args(dir: &Path, reference: bool) -> ScaleArgs {
        fs::write(dir.join("field.xml"), FIELD).unwrap();
        fs::write(dir.join("alpha.ff"), "NA 0 0 0 1.094\nN3A 0 0 0 0.9\n").unwrap();
        fs::write(
            dir.join("fragment.inp"),
            "MONOMERS\nc2c1im+ 1 1.1558\ndca- -1 2.7805\nDIMERS\nc2c1im dca 4.2636 0.64\n",
        )
        .unwrap();
        fs::write(dir.join("fragment.ff"), "c2c1im NA\ndca N3A\n").unwrap();
        ScaleArgs {
            inputs: InputArgs {
                forcefield: Some(dir.join("field.xml")),
                polarizability: Some(dir.join("alpha.ff")),
                monomers: Some(dir.join("fragment.inp")),
                fragments: Some(dir.join("fragment.ff")),
                structures_dir: Some(dir.to_path_buf()),
                reference,
                ..InputArgs::default()
            },
            output: None,
            pairs_csv: Some(dir.join("pairs.csv")),
        }
    }

    #[test]
    fn scale_writes_output_and_pair_table() {
        let dir = tempdir().unwrap();
        run(args(dir.path(), true)).unwrap();

        let written = fs::read_to_string(dir.path().join("field-sc.xml")).unwrap();
        assert!(written.contains(
            r#"<NBFixPair class1="NA" class2="N3A" sigma="0.32500000" epsilon="0.45521920"/>"#
        ));
        assert!(written.contains(r#"<Atom class="NA" sigma="0.3250" epsilon="0.71128"/>"#));

        let csv = fs::read_to_string(dir.path().join("pairs.csv")).unwrap();
        assert!(csv.starts_with("first,second,distance,k_sapt,k_sapt_applied,k_pred\n"));
        assert!(csv.contains("c2c1im,dca,4.2636,0.64,0.64,"));
    }

    #[test]
    fn failed_run_leaves_no_output() {
        let dir = tempdir().unwrap();
        // predicted factors need structure files, which are absent
        let result = run(args(dir.path(), false));
        assert!(matches!(result, Err(CliError::Core(_))));
        assert!(!dir.path().join("field-sc.xml").exists());
        assert!(!dir.path().join("pairs.csv").exists());
    }

    #[test]
    fn unwritable_pair_table_leaves_no_scaled_output() {
        let dir = tempdir().unwrap();
        let mut scale_args = args(dir.path(), true);
        scale_args.pairs_csv = Some(dir.path().join("missing-dir").join("pairs.csv"));

        let result = run(scale_args);
        assert!(matches!(result, Err(CliError::Output { .. })));
        assert!(!dir.path().join("field-sc.xml").exists());
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xml");
        fs::write(&path, "old").unwrap();
        let staged = stage(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        persist(staged, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
