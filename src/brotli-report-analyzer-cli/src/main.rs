use anyhow::bail;
use argh::FromArgs;
use brotli_report_analyzer::{
    comparison::{compare_many, stats::format_stats, Comparison, ComparisonOrder, Direction},
    csv::write_comparison_csvs,
    report::{
        directory::{summarize_compressed_dir, DEFAULT_COMPRESSED_EXTENSION},
        Report,
    },
    segregate::{collect_buckets, copy_files_to_buckets, SegregateOptions},
    suite::{summarize_suite, write_suite},
};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::Level;

#[derive(Debug, FromArgs)]
/// Buckets benchmark corpora by size and compares Brotli benchmark reports
struct Args {
    /// enable debug logging
    #[argh(switch, short = 'v')]
    verbose: bool,

    #[argh(subcommand)]
    /// the command to execute.
    command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    Segregate(SegregateCommand),
    Compare(CompareCommand),
    CompareDirs(CompareDirsCommand),
    Suite(SuiteCommand),
}

#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "segregate")]
/// Copy the files of a directory into size bucket directories next to it
struct SegregateCommand {
    #[argh(positional)]
    /// path to the directory containing the files to bucket
    directory: PathBuf,

    /// directory to create the bucket directories in. Defaults to the parent of the source.
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "compare")]
/// Compare benchmark reports against a baseline report
struct CompareCommand {
    #[argh(positional)]
    /// path to the baseline report
    baseline: PathBuf,

    #[argh(positional)]
    /// paths to the reports to compare against the baseline
    candidates: Vec<PathBuf>,

    /// directory the comparison CSVs are written to
    #[argh(option, short = 'o', default = "PathBuf::from(\".\")")]
    output: PathBuf,

    /// order of files in the output: Name (baseline order) or Size (ascending original size)
    #[argh(option, default = "ComparisonOrder::Name")]
    order: ComparisonOrder,

    /// report improvement (the negated change, positive when the candidate is smaller)
    #[argh(switch)]
    improvement: bool,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "compare-dirs")]
/// Compare the sizes of compressed files in two output directories
struct CompareDirsCommand {
    #[argh(positional)]
    /// directory with the baseline compressed files
    baseline: PathBuf,

    #[argh(positional)]
    /// directory with the compressed files to compare
    candidate: PathBuf,

    /// extension of the compressed files, without the dot
    #[argh(option, short = 'e', default = "DEFAULT_COMPRESSED_EXTENSION.to_string()")]
    extension: String,

    /// directory the comparison CSV is written to
    #[argh(option, short = 'o', default = "PathBuf::from(\".\")")]
    output: PathBuf,

    /// report improvement (the negated change, positive when the candidate is smaller)
    #[argh(switch)]
    improvement: bool,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "suite")]
/// Write a per-file summary of every report in a suite directory
struct SuiteCommand {
    #[argh(positional)]
    /// path to the suite directory
    directory: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let start_time = Instant::now();
    let mut out = io::stdout().lock();
    match args.command {
        Command::Segregate(cmd) => segregate(cmd, &mut out)?,
        Command::Compare(cmd) => {
            if cmd.candidates.is_empty() {
                bail!("At least one report to compare against the baseline is required.");
            }

            let baseline = Report::load(&cmd.baseline)?;
            let candidates = cmd
                .candidates
                .iter()
                .map(|path| Report::load(path))
                .collect::<Result<Vec<_>, _>>()?;

            let comparisons = compare_many(&baseline, &candidates, cmd.order)?;
            let output = ComparisonOutput {
                dir: &cmd.output,
                direction: direction(cmd.improvement),
                verbose: args.verbose,
            };
            write_and_print_comparisons(&comparisons, &output, &mut out)?;
        }
        Command::CompareDirs(cmd) => {
            let baseline = summarize_compressed_dir(&cmd.baseline, &cmd.extension)?;
            let candidate = summarize_compressed_dir(&cmd.candidate, &cmd.extension)?;
            let comparisons = compare_many(&baseline, &[candidate], ComparisonOrder::Name)?;
            let output = ComparisonOutput {
                dir: &cmd.output,
                direction: direction(cmd.improvement),
                verbose: args.verbose,
            };
            write_and_print_comparisons(&comparisons, &output, &mut out)?;
        }
        Command::Suite(cmd) => {
            let summary = summarize_suite(&cmd.directory)?;
            let written = write_suite(&cmd.directory, &summary)?;
            writeln!(
                out,
                "Summarised {} report(s) into {} file summaries under {}",
                summary.report_count,
                written.len(),
                cmd.directory.display()
            )?;
        }
    }

    writeln!(out, "Completed in {}ms", start_time.elapsed().as_millis())?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn direction(improvement: bool) -> Direction {
    if improvement {
        Direction::Improvement
    } else {
        Direction::Change
    }
}

fn segregate(cmd: SegregateCommand, out: &mut impl Write) -> anyhow::Result<()> {
    let options = SegregateOptions {
        source_dir: cmd.directory,
        output_dir: cmd.output,
    };

    let files = collect_buckets(&options.source_dir)?;
    writeln!(out, "Total files found: {}", files.files_found)?;

    let bucket_root = options.bucket_root()?;
    let summary = copy_files_to_buckets(&bucket_root, &files)?;
    writeln!(out, "Total files copied: {}", summary.files_copied)?;
    writeln!(
        out,
        "Files have been segregated and copied to respective buckets successfully."
    )?;
    Ok(())
}

/// Where and how comparison results are reported.
struct ComparisonOutput<'a> {
    dir: &'a Path,
    direction: Direction,
    /// Also print the quartile spread of every metric.
    verbose: bool,
}

fn write_and_print_comparisons(
    comparisons: &[Comparison],
    output: &ComparisonOutput,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let paths = write_comparison_csvs(comparisons, output.dir, output.direction)?;
    let heading = match output.direction {
        Direction::Change => "Average Percentage Change",
        Direction::Improvement => "Average Percentage Improvement",
    };

    for (comparison, path) in comparisons.iter().zip(&paths) {
        writeln!(
            out,
            "{} -> {} ({} files): {}",
            comparison.baseline_label,
            comparison.candidate_label,
            comparison.files.len(),
            path.display()
        )?;

        for metric in comparison.metrics() {
            if let Some(summary) = comparison.summary(metric, output.direction) {
                writeln!(
                    out,
                    "  {}: {}: {:.2}% | {}",
                    metric,
                    heading,
                    summary.mean,
                    summary.format_percentiles()
                )?;
            }
            if output.verbose {
                if let Some(stats) = comparison.stats(metric, output.direction) {
                    writeln!(out, "    {}", format_stats(&stats))?;
                }
            }
        }
    }

    match output.direction {
        Direction::Change => {
            writeln!(
                out,
                "A negative value indicates a percentage decrease from the baseline."
            )?;
            writeln!(out, "A positive value indicates a percentage increase.")?;
        }
        Direction::Improvement => {
            writeln!(
                out,
                "A positive value indicates the candidate is smaller than the baseline."
            )?;
            writeln!(out, "A negative value indicates the candidate is larger.")?;
        }
    }
    Ok(())
}
