pub mod codegen;
pub mod diagnostics;
pub mod error;
pub mod opcode;
pub mod project;
pub mod sanitize;
pub mod template;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(not(target_arch = "wasm32"))]
pub mod package;

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

use anyhow::{Context, Result};
use diagnostics::{Diagnostics, Severity};
use project::Project;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: String,
    pub code: String,
    pub diagnostics: Diagnostics,
}

pub fn compile_project_json(project_json: &str) -> Result<(String, Diagnostics)> {
    let project = Project::from_json_str(project_json).context("Failed to read project.json.")?;
    let mut diagnostics = Diagnostics::new();
    let code = codegen::compile_project(&project, &mut diagnostics)
        .context("Compilation aborted.")?;
    Ok((code, diagnostics))
}

pub fn convert_project_json(project_json: &str, template: &str) -> Result<Conversion> {
    let (code, diagnostics) = compile_project_json(project_json)?;
    Ok(Conversion {
        document: template::render_template(template, &code),
        code,
        diagnostics,
    })
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub template: Option<PathBuf>,
    pub emit_js: Option<PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
impl From<&cli::Args> for ConvertOptions {
    fn from(args: &cli::Args) -> Self {
        Self {
            input: args.input.clone(),
            output: args.output.clone(),
            template: args.template.clone(),
            emit_js: args.emit_js.clone(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    let diagnostics = convert_sb3(&ConvertOptions::from(args))?;
    for diagnostic in diagnostics.notable() {
        eprintln!("{}", diagnostic);
    }
    eprintln!(
        "Done: {} error(s), {} warning(s). Output in '{}'.",
        diagnostics.count(Severity::Error),
        diagnostics.count(Severity::Warning),
        args.output.display()
    );
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn convert_sb3(options: &ConvertOptions) -> Result<Diagnostics> {
    let total_stages = 5 + usize::from(options.emit_js.is_some());
    let progress = CliProgress::new("Convert", total_stages);
    let mut stage = 0usize;

    stage += 1;
    progress.emit(stage, "Resolving input path");
    let input = canonicalize_file(&options.input)?;
    let template = match &options.template {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template '{}'.", path.display()))?,
        None => template::DEFAULT_TEMPLATE.to_string(),
    };

    stage += 1;
    progress.emit(stage, "Reading archive");
    let archive = package::read_sb3(&input)?;

    stage += 1;
    progress.emit(stage, "Parsing project.json");
    let project = Project::from_json_str(&archive.project_json)
        .with_context(|| format!("Invalid project.json inside '{}'.", input.display()))?;
    tracing::info!(targets = project.targets.len(), "project parsed");

    stage += 1;
    progress.emit(stage, "Compiling targets");
    let mut diagnostics = Diagnostics::new();
    let code = codegen::compile_project(&project, &mut diagnostics)
        .with_context(|| format!("Failed to compile '{}'.", input.display()))?;
    let assets = package::select_assets(&archive.entries, &mut diagnostics)?;
    let document = template::render_template(&template, &code);

    let staged_js = match &options.emit_js {
        Some(path) => Some((path, package::stage_file(path, &code)?)),
        None => None,
    };

    stage += 1;
    progress.emit(stage, "Writing output");
    package::write_output(&options.output, &document, &assets)?;

    if let Some((emit_path, staged)) = staged_js {
        stage += 1;
        progress.emit(stage, "Writing generated JavaScript");
        staged
            .persist(emit_path)
            .with_context(|| format!("Failed to write '{}'.", emit_path.display()))?;
    }

    tracing::info!(
        errors = diagnostics.count(Severity::Error),
        warnings = diagnostics.count(Severity::Warning),
        "conversion finished"
    );
    Ok(diagnostics)
}

pub fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!("Input file not found: '{}'.", path.display()));
    }
    Ok(path.canonicalize()?)
}

#[cfg(not(target_arch = "wasm32"))]
struct CliProgress {
    prefix: &'static str,
    total: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl CliProgress {
    fn new(prefix: &'static str, total: usize) -> Self {
        Self {
            prefix,
            total: total.max(1),
        }
    }

    fn emit(&self, step: usize, label: &str) {
        let total = self.total;
        let step = step.clamp(1, total);
        let bar = render_progress_bar(step, total, 14);
        tracing::debug!(stage = step, total, "{}", label);
        eprintln!("[{}] {}... ({}/{}) {}", self.prefix, label, step, total, bar);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn render_progress_bar(step: usize, total: usize, width: usize) -> String {
    let width = width.max(1);
    let filled = ((step * width) + (total / 2)) / total;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < filled { '=' } else { '-' });
    }
    s.push(']');
    s
}
