use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use opf_tools_lib::export::{self, ExportFormat, TextureExportOptions};
use opf_tools_lib::opf::{self, OpfProject, SceneObject, CAN_BUILD_UNIT};

#[derive(Parser)]
#[command(name = "opf-cli", version, about = "Inspect and convert Outforce packed project files")]
struct Cli {
    /// More log output (repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the header and section counts
    Info { file: PathBuf },
    /// Print the object hierarchy
    Tree { file: PathBuf },
    /// Print the custom settings of one object, by unique id or name
    Settings { file: PathBuf, object: String },
    /// Parse and re-encode, then compare with the input byte for byte
    Roundtrip {
        file: PathBuf,
        /// Write the re-encoded project here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode every embedded texture to image files
    ExportTextures {
        file: PathBuf,
        out_dir: PathBuf,
        #[arg(long, value_enum, default_value_t = FormatArg::Png)]
        format: FormatArg,
        /// Output size in percent of the stored size
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=400))]
        scale: u32,
        #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,
    },
    /// Write the JSON manifest (stdout when no output is given)
    Manifest {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a text report of the project contents
    Report { file: PathBuf },
    /// Recover what can be read from a damaged file
    Salvage { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Png => ExportFormat::Png,
            FormatArg::Jpeg => ExportFormat::Jpeg,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Info { file } => info(&file),
        Command::Tree { file } => {
            let project = load(&file)?;
            ptree::print_tree(&export::object_tree(&project))?;
            Ok(())
        }
        Command::Settings { file, object } => settings(&file, &object),
        Command::Roundtrip { file, output } => roundtrip(&file, output.as_deref()),
        Command::ExportTextures {
            file,
            out_dir,
            format,
            scale,
            quality,
        } => {
            let project = load(&file)?;
            let options = TextureExportOptions {
                format: format.into(),
                scale_percent: scale,
                jpeg_quality: quality,
            };
            let summary = export::export_textures(&project, &out_dir, &options)?;
            println!(
                "Exported {} textures to {} ({} without color data, {} failed)",
                summary.written.len(),
                out_dir.display(),
                summary.skipped.len(),
                summary.failed.len()
            );
            for (name, reason) in &summary.failed {
                println!("  {}: {}", name, reason);
            }
            Ok(())
        }
        Command::Manifest { file, output } => {
            let project = load(&file)?;
            let source = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let manifest = export::build_manifest(&project, &source);
            match output {
                Some(path) => manifest.save(&path),
                None => {
                    println!("{}", manifest.to_json()?);
                    Ok(())
                }
            }
        }
        Command::Report { file } => {
            print!("{}", export::asset_report(&load(&file)?));
            Ok(())
        }
        Command::Salvage { file } => salvage(&file),
    }
}

fn load(path: &Path) -> anyhow::Result<OpfProject> {
    opf::load_opf(path).with_context(|| format!("failed to load {}", path.display()))
}

fn info(path: &Path) -> anyhow::Result<()> {
    let (project, warnings) = opf::load_opf_with_warnings(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let totals = project.totals();

    println!("Project:      {}", project.project_name);
    println!("Author:       {}", project.author);
    println!("Email:        {}", project.email);
    println!("Project ID:   {}", project.project_id);
    if !project.description.is_empty() {
        println!("Description:  {}", project.description);
    }
    println!("Dependencies: {}", project.dependencies.len());
    for dep in &project.dependencies {
        println!("  {}", dep);
    }
    println!("Events:       {}", project.events.len());
    println!("Textures:     {}", project.textures.len());
    println!("Materials:    {}", project.materials.len());
    println!(
        "Objects:      {} top-level, {} total",
        project.objects.len(),
        totals.objects
    );
    println!("Meshes:       {} ({} vertices, {} faces)", totals.meshes, totals.vertices, totals.faces);
    if !warnings.is_empty() {
        println!("Warnings:     {}", warnings.len());
        for warning in &warnings {
            println!("  {}", warning);
        }
    }
    Ok(())
}

fn find_object<'a>(project: &'a OpfProject, key: &str) -> Option<&'a SceneObject> {
    if let Ok(id) = key.parse::<i32>() {
        if let Some(object) = project.find_object_in_tree(id) {
            return Some(object);
        }
    }
    if let Some(object) = project.find_object_by_name(key) {
        return Some(object);
    }
    let mut found = None;
    for root in &project.objects {
        root.walk(&mut |o, _| {
            if found.is_none() && o.name == key {
                found = Some(o);
            }
        });
    }
    found
}

fn settings(path: &Path, key: &str) -> anyhow::Result<()> {
    let project = load(path)?;
    let Some(object) = find_object(&project, key) else {
        bail!("no object with id or name '{}'", key);
    };

    println!("{} [{}] id={}", object.name, object.class_name, object.unique_id);
    for setting in object
        .custom_settings
        .iter()
        .filter(|s| s.name != CAN_BUILD_UNIT)
    {
        println!("  {} = {}", setting.name, setting.value);
    }
    let units = object.can_build_units();
    if !units.is_empty() {
        println!("Can build ({}):", units.len());
        for unit in units {
            println!("  {}", unit);
        }
    }
    Ok(())
}

fn roundtrip(path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let original = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let project = opf::parse_opf(&original)?;
    let rewritten = opf::write_opf(&project)?;

    if let Some(output) = output {
        std::fs::write(output, &rewritten)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    match original.iter().zip(&rewritten).position(|(a, b)| a != b) {
        None if original.len() == rewritten.len() => {
            println!("Identical: {} bytes", original.len());
            Ok(())
        }
        None => bail!(
            "lengths differ: {} bytes read, {} bytes written",
            original.len(),
            rewritten.len()
        ),
        Some(offset) => bail!(
            "first difference at offset {:#x} ({} bytes read, {} bytes written)",
            offset,
            original.len(),
            rewritten.len()
        ),
    }
}

fn salvage(path: &Path) -> anyhow::Result<()> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let salvage = opf::salvage_opf(&data)?;
    let project = &salvage.project;

    println!("Project:      {}", project.project_name);
    println!("Dependencies: {}", project.dependencies.len());
    println!("Events:       {}", project.events.len());
    println!("Textures:     {}", project.textures.len());
    println!("Materials:    {}", project.materials.len());
    println!("Objects:      {}", project.objects.len());
    for warning in &salvage.warnings {
        println!("Skipped: {}", warning);
    }
    match &salvage.error {
        Some(err) => println!("Stopped: {}", err),
        None => println!("File parsed completely"),
    }
    Ok(())
}
