use crate::diagnostics::Diagnostics;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Seek, Write};
use std::path::Path;
use zip::ZipArchive;

pub const INDEX_FILE: &str = "index.html";
const ASSET_PATTERN: &str = r"(?i)\.(svg|png|jpe?g|bmp|gif|wav|mp3)$";

#[derive(Debug, Clone, Default)]
pub struct Sb3Archive {
    pub project_json: String,
    pub entries: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn read_sb3(input: &Path) -> Result<Sb3Archive> {
    let file =
        fs::File::open(input).with_context(|| format!("Failed to open '{}'.", input.display()))?;
    read_sb3_from(file, &input.display().to_string())
}

pub fn read_sb3_from<R: Read + Seek>(reader: R, label: &str) -> Result<Sb3Archive> {
    let mut zip = ZipArchive::new(reader)
        .with_context(|| format!("'{}' is not a valid zip/.sb3 file.", label))?;

    let mut project_json = String::new();
    {
        let mut entry = zip
            .by_name("project.json")
            .map_err(|_| anyhow!("project.json not found in '{}'.", label))?;
        entry
            .read_to_string(&mut project_json)
            .with_context(|| format!("project.json in '{}' is not valid UTF-8.", label))?;
    }

    let mut entries = BTreeMap::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let name = entry.name().to_string();
        if name == "project.json" || name.ends_with('/') {
            continue;
        }
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        entries.insert(name, bytes);
    }
    tracing::debug!(archive = label, entries = entries.len(), "read sb3");

    Ok(Sb3Archive {
        project_json,
        entries,
    })
}

pub fn select_assets(
    entries: &BTreeMap<String, Vec<u8>>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Asset>> {
    let asset_re = Regex::new(ASSET_PATTERN)?;
    let mut assets = Vec::new();
    for (name, bytes) in entries {
        if !asset_re.is_match(name) {
            diagnostics.warn(format!("Skipping non-asset archive entry '{}'", name));
            continue;
        }
        let file_name = name.replace('/', "_");
        if let Some(expected) = content_hash_of(&file_name) {
            let actual = format!("{:x}", md5::compute(bytes));
            if !expected.eq_ignore_ascii_case(&actual) {
                diagnostics.warn(format!(
                    "Asset '{}' does not match its md5 name (content hash {})",
                    name, actual
                ));
            }
        }
        assets.push(Asset {
            file_name,
            bytes: bytes.clone(),
        });
    }
    Ok(assets)
}

fn content_hash_of(file_name: &str) -> Option<&str> {
    let (stem, _) = file_name.rsplit_once('.')?;
    (stem.len() == 32 && stem.chars().all(|c| c.is_ascii_hexdigit())).then_some(stem)
}

/// Writes `index.html` and the assets into `dir`. Everything is staged in a sibling
/// temporary directory first, so a failed write leaves `dir` as it was. An existing
/// `dir` receives the staged files one rename at a time.
pub fn write_output(dir: &Path, document: &str, assets: &[Asset]) -> Result<()> {
    let parent = match dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .with_context(|| format!("Failed to create '{}'.", parent.display()))?;
    let staging = tempfile::Builder::new()
        .prefix(".sb3js-")
        .tempdir_in(&parent)
        .with_context(|| format!("Failed to create a staging directory in '{}'.", parent.display()))?;

    fs::write(staging.path().join(INDEX_FILE), document)?;
    for asset in assets {
        fs::write(staging.path().join(&asset.file_name), &asset.bytes)
            .with_context(|| format!("Failed to write asset '{}'.", asset.file_name))?;
    }

    if dir.exists() {
        if !dir.is_dir() {
            return Err(anyhow!("Output path '{}' is not a directory.", dir.display()));
        }
        for entry in fs::read_dir(staging.path())? {
            let entry = entry?;
            fs::rename(entry.path(), dir.join(entry.file_name())).with_context(|| {
                format!("Failed to move '{}' into place.", entry.path().display())
            })?;
        }
    } else {
        fs::rename(staging.path(), dir)
            .with_context(|| format!("Failed to move output into '{}'.", dir.display()))?;
    }
    tracing::debug!(output = %dir.display(), assets = assets.len(), "output written");
    Ok(())
}

pub fn stage_file(path: &Path, contents: &str) -> Result<tempfile::NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".sb3js-")
        .tempfile_in(parent)
        .with_context(|| format!("Failed to stage '{}'.", path.display()))?;
    staged
        .write_all(contents.as_bytes())
        .with_context(|| format!("Failed to stage '{}'.", path.display()))?;
    Ok(staged)
}
