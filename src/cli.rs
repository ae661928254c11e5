use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::aot::{Generator, Shell, generate};
use clap_complete_nushell::Nushell;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use doc_cluster::classify::kmeans::{DEFAULT_K, DEFAULT_MAX_ITERATIONS};
use doc_cluster::classify::linalg::{cosine_distance, cosine_similarity};
use doc_cluster::{AppError, AppResult, ClusterError, Clusterer, KMeans, LabeledVector};
use tracing::info;

use crate::io_utils;

const STYLES: Styles = Styles::styled()
    .header(Style::new().bold())
    .usage(Style::new().bold())
    .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))))
    .literal(
        Style::new()
            .bold()
            .fg_color(Some(Color::Ansi(AnsiColor::Green))),
    )
    .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
    .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
    .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightRed))))
    .context(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta))))
    .context_value(
        Style::new()
            .bold()
            .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
    );

/// Long-form CLI description shown in `--help`.
const LONG_ABOUT: &str = "doc-cluster - Group documents by the direction of their embeddings

Input is a JSON array of objects with an \"id\" and an \"embedding\" (an array of
numbers, all of the same length). Documents are grouped with k-means over cosine
distance, seeded with the first k documents in input order, so the same input
always yields the same groups.";

/// Group document embeddings into similarity clusters.
#[derive(Parser, Debug, Clone)]
#[command(author, version, propagate_version = true, about, long_about = Some(LONG_ABOUT), styles = STYLES)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Output format for a clustering result.
#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Pretty-printed JSON with the assignment, centroids and inertia
    Json,

    /// One line per cluster listing its documents
    Text,
}

/// Where to read labeled vectors from.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// JSON file with the labeled vectors
    /// If not provided, reads from stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

/// Top-level commands supported by the CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Partition the input documents into k clusters
    Cluster {
        #[command(flatten)]
        input: InputArgs,

        /// Number of clusters; clamped to the number of documents
        #[arg(short, default_value_t = DEFAULT_K)]
        k: usize,

        /// Number of refinement iterations; always runs in full
        #[arg(short, long, default_value_t = DEFAULT_MAX_ITERATIONS)]
        max_iterations: usize,

        /// Output format for the result
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file to write the result to
        /// If not provided, prints to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        verbosity: Verbosity<InfoLevel>,
    },

    /// Print the cosine similarity and distance of two documents
    Similarity {
        #[command(flatten)]
        input: InputArgs,

        /// Id of the first document
        left: String,

        /// Id of the second document
        right: String,

        #[command(flatten)]
        verbosity: Verbosity<InfoLevel>,
    },

    /// Generate shell completion for a given shell
    Completion {
        /// Output file to write the completion script to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// The shell to generate the completion for
        #[arg(value_enum)]
        shell: CompletionShell,

        #[command(flatten)]
        verbosity: Verbosity<InfoLevel>,
    },
}

/// Supported completion targets for shell auto-completion.
#[derive(ValueEnum, Clone, Debug)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
    Nushell,
}

impl Display for CompletionShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompletionShell::Bash => "bash",
            CompletionShell::Zsh => "zsh",
            CompletionShell::Fish => "fish",
            CompletionShell::PowerShell => "powershell",
            CompletionShell::Elvish => "elvish",
            CompletionShell::Nushell => "nushell",
        };
        write!(f, "{}", s)
    }
}

impl Generator for &CompletionShell {
    fn generate(&self, cmd: &clap::builder::Command, buf: &mut dyn Write) {
        match self {
            CompletionShell::Bash => Shell::Bash.generate(cmd, buf),
            CompletionShell::Zsh => Shell::Zsh.generate(cmd, buf),
            CompletionShell::Fish => Shell::Fish.generate(cmd, buf),
            CompletionShell::PowerShell => Shell::PowerShell.generate(cmd, buf),
            CompletionShell::Elvish => Shell::Elvish.generate(cmd, buf),
            CompletionShell::Nushell => Nushell.generate(cmd, buf),
        }
    }

    fn file_name(&self, name: &str) -> String {
        match self {
            CompletionShell::Bash => Shell::Bash.file_name(name),
            CompletionShell::Zsh => Shell::Zsh.file_name(name),
            CompletionShell::Fish => Shell::Fish.file_name(name),
            CompletionShell::PowerShell => Shell::PowerShell.file_name(name),
            CompletionShell::Elvish => Shell::Elvish.file_name(name),
            CompletionShell::Nushell => Nushell.file_name(name),
        }
    }
}

/// Helper trait for accessing verbosity flags on commands.
pub trait GetVerbosity {
    fn get_verbosity(&self) -> &Verbosity<InfoLevel>;
}

impl GetVerbosity for Cmd {
    fn get_verbosity(&self) -> &Verbosity<InfoLevel> {
        match self {
            Cmd::Cluster { verbosity, .. } => verbosity,
            Cmd::Similarity { verbosity, .. } => verbosity,
            Cmd::Completion { verbosity, .. } => verbosity,
        }
    }
}

/// Cosine similarity and distance between the documents `left` and `right`.
pub fn document_similarity(
    vectors: &[LabeledVector],
    left: &str,
    right: &str,
) -> AppResult<(f64, f64)> {
    let find = |id: &str| {
        vectors
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| AppError::UnknownDocument(id.to_string()))
    };
    let (a, b) = (find(left)?, find(right)?);
    if a.embedding.len() != b.embedding.len() {
        return Err(ClusterError::DimensionMismatch {
            id: b.id.clone(),
            expected: a.embedding.len(),
            found: b.embedding.len(),
        }
        .into());
    }
    let similarity = cosine_similarity(a.view(), b.view())?;
    let distance = cosine_distance(a.view(), b.view())?;
    Ok((similarity, distance))
}

impl Cmd {
    /// Execute the chosen top-level command.
    #[tracing::instrument(name = "Running command", level = "info", skip(self))]
    pub fn run(&self) -> AppResult<()> {
        match self {
            Cmd::Cluster {
                input: InputArgs { input },
                k,
                max_iterations,
                format,
                output,
                ..
            } => {
                let vectors = io_utils::load_labeled_vectors(input.as_deref())?;
                info!("Loaded {} labeled vectors", vectors.len());

                let mut engine = KMeans::new(*k);
                engine.set_max_iterations(*max_iterations);
                let result = engine.cluster(&vectors)?;
                info!(
                    "Found {} non-empty clusters out of {}",
                    result.non_empty_clusters(),
                    result.len()
                );

                io_utils::write_output(output.as_deref(), format, &result)
            }
            Cmd::Similarity {
                input: InputArgs { input },
                left,
                right,
                ..
            } => {
                let vectors = io_utils::load_labeled_vectors(input.as_deref())?;
                let (similarity, distance) = document_similarity(&vectors, left, right)?;
                tracing_indicatif::indicatif_println!(
                    "similarity: {similarity:.6}\ndistance:   {distance:.6}"
                );
                Ok(())
            }
            Cmd::Completion { shell, output, .. } => {
                let mut cmd = Cli::command();
                if let Some(output_path) = output {
                    let mut file = std::fs::OpenOptions::new()
                        .write(true)
                        .truncate(true)
                        .create(true)
                        .open(output_path)?;
                    generate(shell, &mut cmd, "doc-cluster", &mut file);
                    info!(
                        "Generated completion script for {} at {}",
                        shell,
                        output_path.display()
                    );
                } else {
                    generate(shell, &mut cmd, "doc-cluster", &mut std::io::stdout());
                }
                Ok(())
            }
        }
    }
}
