use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use doc_cluster::{AppResult, ClusterResult, LabeledVector};
use tracing::debug;

use crate::cli::OutputFormat;

/// Parse a JSON array of `{"id", "embedding"}` objects, keeping their order.
pub fn read_labeled_vectors<R: Read>(reader: R) -> AppResult<Vec<LabeledVector>> {
    let de = &mut serde_json::Deserializer::from_reader(reader);
    let vectors: Vec<LabeledVector> = serde_path_to_error::deserialize(de)?;
    Ok(vectors)
}

/// Load labeled vectors from `input`, or from stdin when no path is given.
#[tracing::instrument(name = "Loading labeled vectors", level = "debug")]
pub fn load_labeled_vectors(input: Option<&Path>) -> AppResult<Vec<LabeledVector>> {
    match input {
        Some(path) => read_labeled_vectors(BufReader::new(File::open(path)?)),
        None => read_labeled_vectors(io::stdin().lock()),
    }
}

/// One line per cluster slot, then the inertia.
pub fn render_text(result: &ClusterResult) -> String {
    let mut out = String::new();
    for (index, members) in result.assignment.iter().enumerate() {
        let listed = if members.is_empty() {
            "-".to_string()
        } else {
            members.join(", ")
        };
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "Cluster {index} ({} documents): {listed}",
            members.len()
        );
    }
    let _ = writeln!(out, "Inertia: {:.6}", result.inertia);
    out
}

fn render(format: &OutputFormat, result: &ClusterResult) -> AppResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => Ok(render_text(result)),
    }
}

/// Write the result in the requested format to `output`, or stdout when absent.
#[tracing::instrument(name = "Saving output", level = "debug", skip(result))]
pub fn write_output(
    output: Option<&Path>,
    format: &OutputFormat,
    result: &ClusterResult,
) -> AppResult<()> {
    let rendered = render(format, result)?;
    match output {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            file.write_all(rendered.as_bytes())?;
            file.flush()?;
            debug!("Wrote {} bytes to {}", rendered.len(), path.display());
        }
        None => tracing_indicatif::indicatif_println!("{}", rendered.trim_end()),
    }
    Ok(())
}
