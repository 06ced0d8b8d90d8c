//! CLI logic for the Tessera layout tool.
//!
//! Reads a `.tsr` file, runs the layout pipeline and writes the resulting
//! geometry model as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, PlannerArg};

use std::{
    fs,
    io::{self, Write},
};

use log::{debug, info};

use tessera::{DiagramBuilder, TesseraError, layout::Layout};

/// Run the Tessera CLI application
///
/// This function processes the input file through the layout pipeline
/// and writes the resulting layout as JSON to the output file, or to
/// standard output when no output file is given.
///
/// # Errors
///
/// Returns `TesseraError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Routing and layout errors
pub fn run(args: &Args) -> Result<(), TesseraError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing diagram"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(planner) = args.planner {
        app_config = app_config.with_planner(planner.into());
    }
    debug!(planner = app_config.route().planner().as_str(); "Route planner selected");
    let pretty = args.pretty || app_config.output().pretty();

    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let layout = builder.compile(&source)?;

    match &args.output {
        Some(path) => {
            let file = fs::File::create(path)?;
            write_layout(io::BufWriter::new(file), &layout, pretty)?;
            info!(output_file = path; "Layout exported successfully");
        }
        None => write_layout(io::stdout().lock(), &layout, pretty)?,
    }

    Ok(())
}

fn write_layout(mut writer: impl Write, layout: &Layout, pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, layout)?;
    } else {
        serde_json::to_writer(&mut writer, layout)?;
    }
    writeln!(writer)?;
    writer.flush()
}
