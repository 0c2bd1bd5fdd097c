//! Per-fragment structure files.
//!
//! The only information taken from a structure file is its sequence of atom labels, which
//! is used to sum atomic polarizabilities over a fragment. The file for fragment `name` is
//! `<dir>/<name>.<ext>`, with extensions probed in a fixed priority order: z-matrix, XYZ,
//! MDL molecule table, then PDB.

use phf::{Set, phf_set};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

static PDB_ATOM_RECORDS: Set<&'static str> = phf_set! {
    "ATOM",
    "HETATM",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureFormat {
    ZMatrix,
    Xyz,
    MolTable,
    Pdb,
}

impl StructureFormat {
    /// Formats in the order they are probed.
    pub const PRIORITY: [StructureFormat; 4] = [
        StructureFormat::ZMatrix,
        StructureFormat::Xyz,
        StructureFormat::MolTable,
        StructureFormat::Pdb,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            StructureFormat::ZMatrix => "zmat",
            StructureFormat::Xyz => "xyz",
            StructureFormat::MolTable => "mol",
            StructureFormat::Pdb => "pdb",
        }
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StructureFormat::ZMatrix => "z-matrix",
            StructureFormat::Xyz => "XYZ",
            StructureFormat::MolTable => "MDL molfile",
            StructureFormat::Pdb => "PDB",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum StructureError {
    #[error(
        "No structure file for fragment '{fragment}' (tried: {})",
        tried.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
    )]
    MissingStructureFile {
        fragment: String,
        tried: Vec<PathBuf>,
    },

    #[error("File I/O error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{format} parse error in '{}' (line {line}): {reason}", path.display())]
    Parse {
        path: PathBuf,
        format: StructureFormat,
        line: usize,
        reason: String,
    },
}

/// Atom labels read from a fragment's structure file.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureFile {
    pub path: PathBuf,
    pub format: StructureFormat,
    pub labels: Vec<String>,
}

/// Finds the structure file of a fragment, honouring the format priority.
pub fn locate(dir: &Path, fragment: &str) -> Result<(PathBuf, StructureFormat), StructureError> {
    let mut tried = Vec::with_capacity(StructureFormat::PRIORITY.len());
    for format in StructureFormat::PRIORITY {
        let candidate = dir.join(format!("{}.{}", fragment, format.extension()));
        if candidate.is_file() {
            return Ok((candidate, format));
        }
        tried.push(candidate);
    }
    Err(StructureError::MissingStructureFile {
        fragment: fragment.to_string(),
        tried,
    })
}

pub fn read(dir: &Path, fragment: &str) -> Result<StructureFile, StructureError> {
    let (path, format) = locate(dir, fragment)?;
    let content = std::fs::read_to_string(&path).map_err(|e| StructureError::Io {
        path: path.clone(),
        source: e,
    })?;
    let labels = parse_labels(&content, format, &path)?;
    debug!(
        fragment,
        atoms = labels.len(),
        "Read {} structure from {:?}.",
        format,
        path
    );
    Ok(StructureFile {
        path,
        format,
        labels,
    })
}

pub fn parse_labels(
    content: &str,
    format: StructureFormat,
    path: &Path,
) -> Result<Vec<String>, StructureError> {
    let err = |line: usize, reason: String| StructureError::Parse {
        path: path.to_path_buf(),
        format,
        line,
        reason,
    };
    let labels = match format {
        StructureFormat::ZMatrix => parse_zmat(content, &err)?,
        StructureFormat::Xyz => parse_xyz(content, &err)?,
        StructureFormat::MolTable => parse_mol(content, &err)?,
        StructureFormat::Pdb => parse_pdb(content, &err)?,
    };
    if labels.is_empty() {
        return Err(err(1, "no atoms found".to_string()));
    }
    Ok(labels)
}

type ErrFn<'a> = dyn Fn(usize, String) -> StructureError + 'a;

// Title line, then `index label [ref dist [ref angle [ref dihedral]]]` rows up to the
// first blank line. Anything after that (variables, connects, force field) is ignored.
fn parse_zmat(content: &str, err: &ErrFn) -> Result<Vec<String>, StructureError> {
    let mut labels = Vec::new();
    let mut seen_title = false;
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.starts_with('#') {
            continue;
        }
        if !seen_title {
            if !line.is_empty() {
                seen_title = true;
            }
            continue;
        }
        if line.is_empty() {
            if labels.is_empty() {
                continue;
            }
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 || tokens[0].parse::<usize>().is_err() {
            return Err(err(
                i + 1,
                format!("expected 'index label ...', found '{}'", line),
            ));
        }
        labels.push(tokens[1].to_string());
    }
    Ok(labels)
}

fn parse_xyz(content: &str, err: &ErrFn) -> Result<Vec<String>, StructureError> {
    let lines: Vec<&str> = content.lines().collect();
    let count_line = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .ok_or_else(|| err(1, "file is empty".to_string()))?;
    let num_atoms: usize = lines[count_line]
        .trim()
        .parse()
        .map_err(|_| err(count_line + 1, "first line must be the number of atoms".to_string()))?;

    let first_atom = count_line + 2;
    let mut labels = Vec::with_capacity(num_atoms);
    for (offset, raw) in lines.iter().skip(first_atom).take(num_atoms).enumerate() {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(err(
                first_atom + offset + 1,
                format!("expected 'label x y z', found '{}'", raw.trim()),
            ));
        }
        labels.push(tokens[0].to_string());
    }
    if labels.len() != num_atoms {
        return Err(err(
            count_line + 1,
            format!("header says {} atoms but found {}", num_atoms, labels.len()),
        ));
    }
    Ok(labels)
}

// MDL V2000: three header lines, the counts line, then one row per atom whose fourth
// field is the atom label.
fn parse_mol(content: &str, err: &ErrFn) -> Result<Vec<String>, StructureError> {
    let lines: Vec<&str> = content.lines().collect();
    let counts = lines
        .get(3)
        .ok_or_else(|| err(4, "missing counts line".to_string()))?;
    if counts.contains("V3000") {
        return Err(err(4, "V3000 is not supported".to_string()));
    }
    let num_atoms = counts
        .get(0..3)
        .and_then(|field| field.trim().parse::<usize>().ok())
        .or_else(|| counts.split_whitespace().next()?.parse().ok())
        .ok_or_else(|| err(4, "invalid atom count".to_string()))?;

    let mut labels = Vec::with_capacity(num_atoms);
    for i in 0..num_atoms {
        let line_no = 5 + i;
        let raw = lines
            .get(4 + i)
            .ok_or_else(|| err(line_no, "atom block ended early".to_string()))?;
        let label = raw
            .split_whitespace()
            .nth(3)
            .ok_or_else(|| err(line_no, "atom row has no label field".to_string()))?;
        labels.push(label.to_string());
    }
    Ok(labels)
}

fn parse_pdb(content: &str, err: &ErrFn) -> Result<Vec<String>, StructureError> {
    let mut labels = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let record = line.get(0..6).unwrap_or(line).trim();
        if !PDB_ATOM_RECORDS.contains(record) {
            continue;
        }
        let name = line.get(12..16).unwrap_or("").trim();
        if name.is_empty() {
            return Err(err(i + 1, "atom name in columns 13-16 is empty".to_string()));
        }
        labels.push(name.to_string());
    }
    Ok(labels)
}
