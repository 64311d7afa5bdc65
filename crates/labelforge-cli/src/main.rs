// this_file: crates/labelforge-cli/src/main.rs

//! labelforge CLI: batch label renderer.
//!
//! Reads a product sheet, composes one label per record and writes
//! `quantity` copies of each as PNG files or PDF pages.

use anyhow::{bail, Context};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use labelforge_core::LabelTemplate;
use labelforge_fontdb::FontConfig;
use labelforge_input::{read_sheet, SheetLayout};
use labelforge_render::{
    BatchComposer, BatchOptions, OutputMode, Renderer, ResourceConfig, Resources,
};
use std::sync::Arc;

mod progress;

/// labelforge: barcode and bilingual text label composer
#[derive(Parser)]
#[command(name = "labelforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every record of a sheet
    Render {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Output directory
        #[arg(short, long)]
        output: Utf8PathBuf,

        /// Write one PDF inside the output directory instead of PNG files
        #[arg(long, num_args = 0..=1, default_missing_value = "labels.pdf")]
        pdf: Option<String>,

        #[command(flatten)]
        resources: ResourceArgs,

        /// Number of parallel worker threads (0 = auto)
        #[arg(long = "jobs", default_value = "0", alias = "workers")]
        jobs: usize,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Read a sheet and lay out every record without rendering
    Check {
        #[command(flatten)]
        sheet: SheetArgs,

        #[command(flatten)]
        resources: ResourceArgs,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the default label template as JSON
    Template,

    /// Print version information
    Version,
}

#[derive(clap::Args)]
struct SheetArgs {
    /// Input sheet: CSV, or an xlsx/xls/ods workbook (first worksheet)
    #[arg(short, long)]
    input: Utf8PathBuf,

    /// Sheet layout
    #[arg(long, value_enum, default_value_t = LayoutArg::Flat)]
    layout: LayoutArg,
}

#[derive(clap::Args)]
struct ResourceArgs {
    /// Label template JSON (defaults to the built-in template)
    #[arg(long)]
    template: Option<Utf8PathBuf>,

    /// Bold font used for brand, fields and static lines
    #[arg(long)]
    font: Option<Utf8PathBuf>,

    /// Regular font used for the footer
    #[arg(long)]
    footer_font: Option<Utf8PathBuf>,

    /// Brand logo image (PNG or JPEG)
    #[arg(long)]
    logo: Option<Utf8PathBuf>,

    /// Fail instead of falling back to the built-in bitmap font
    #[arg(long)]
    no_builtin_font: bool,

    /// Disable Arabic reshaping (right-to-left lines are still reordered)
    #[arg(long)]
    no_reshape: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Flat,
    Supplier,
}

impl From<LayoutArg> for SheetLayout {
    fn from(layout: LayoutArg) -> Self {
        match layout {
            LayoutArg::Flat => SheetLayout::Flat,
            LayoutArg::Supplier => SheetLayout::Supplier,
        }
    }
}

impl ResourceArgs {
    fn into_config(self) -> anyhow::Result<ResourceConfig> {
        let template = match &self.template {
            Some(path) => LabelTemplate::from_json_file(path.as_std_path())
                .with_context(|| format!("loading template {path}"))?,
            None => LabelTemplate::default(),
        };

        let mut fonts = FontConfig::default();
        if let Some(font) = self.font {
            fonts.primary = font.into_std_path_buf();
        }
        if let Some(font) = self.footer_font {
            fonts.footer = font.into_std_path_buf();
        }
        fonts.allow_builtin = !self.no_builtin_font;

        Ok(ResourceConfig {
            template,
            fonts,
            logo: self.logo.map(Utf8PathBuf::into_std_path_buf),
            no_reshape: self.no_reshape,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            sheet,
            output,
            pdf,
            resources,
            jobs,
            verbose,
        } => {
            init_logging(verbose);
            run_render(sheet, output, pdf, resources, jobs)?;
        }
        Commands::Check {
            sheet,
            resources,
            verbose,
        } => {
            init_logging(verbose);
            run_check(sheet, resources)?;
        }
        Commands::Template => {
            println!("{}", LabelTemplate::default().to_json_pretty()?);
        }
        Commands::Version => {
            println!("labelforge {}", env!("CARGO_PKG_VERSION"));
            println!("Code 128 and bilingual label composer");
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn run_render(
    sheet: SheetArgs,
    output: Utf8PathBuf,
    pdf: Option<String>,
    resources: ResourceArgs,
    jobs: usize,
) -> anyhow::Result<()> {
    let records = read_sheet(sheet.input.as_std_path(), sheet.layout.into())?.records;
    let resources = Arc::new(Resources::load(resources.into_config()?)?);

    std::fs::create_dir_all(&output)
        .with_context(|| format!("creating output directory {output}"))?;
    let mode = match pdf {
        Some(name) => OutputMode::Pdf {
            path: output.join(name).into_std_path_buf(),
        },
        None => OutputMode::Files {
            dir: output.into_std_path_buf(),
        },
    };

    log::info!("Rendering {} records", records.len());
    let composer =
        BatchComposer::new(resources).with_progress(Arc::new(progress::StderrProgress::new()));
    let report = composer.run(&records, &BatchOptions { mode, jobs })?;

    print!("{report}");
    Ok(())
}

/// Lay out every record and list the ones that would fail.
fn run_check(sheet: SheetArgs, resources: ResourceArgs) -> anyhow::Result<()> {
    let input = sheet.input;
    let sheet = read_sheet(input.as_std_path(), sheet.layout.into())?;
    let resources = Arc::new(Resources::load(resources.into_config()?)?);
    let renderer = Renderer::new(resources);

    let mut failed = 0usize;
    for record in &sheet.records {
        if let Some(coercion) = record.quantity.coercion() {
            println!("  {}: {coercion}", record.describe());
        }
        if let Err(err) = renderer.compose(record) {
            if !err.is_record_scoped() {
                return Err(err.into());
            }
            failed += 1;
            println!("✗ {}: {err}", record.describe());
        }
    }

    println!(
        "Checked {} records ({} labels): {} would be skipped",
        sheet.records.len(),
        sheet.label_count(),
        failed
    );
    if failed == sheet.records.len() && failed > 0 {
        bail!("no record in {input} can be rendered");
    }
    Ok(())
}
