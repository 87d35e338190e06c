//! The `quizport convert` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use quizport_core::ident::UuidIds;
use quizport_core::parser;
use quizport_docx::{answer_key_markdown, questions_markdown, DocumentConverter, PandocConverter};
use quizport_formats::export::{bundle, export, ExportRequest, Format};
use quizport_formats::moodle::{AnswerNumbering, MoodleConfig};
use quizport_formats::qti::QtiConfig;

use crate::config::load_config_from;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Path to the JSON question file
    #[arg(long)]
    pub input: PathBuf,

    /// Output formats: qti, moodle, word, word-key, or all (comma-separated)
    #[arg(long, default_value = "qti,moodle")]
    pub formats: String,

    /// Output directory (default from config: ./quizport-out)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Name prefix for generated items (default: input file stem)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Keep "A) " style labels on option text
    #[arg(long)]
    pub keep_prefixes: bool,

    /// Leave $...$ inline math untouched
    #[arg(long)]
    pub no_math: bool,

    /// Emit answers in fixed order instead of letting the LMS shuffle
    #[arg(long)]
    pub no_shuffle: bool,

    /// Default grade per question (Moodle)
    #[arg(long)]
    pub default_grade: Option<f64>,

    /// Retry penalty factor (Moodle)
    #[arg(long)]
    pub penalty: Option<f64>,

    /// Answer numbering style: abc, ABCD, 123, none (Moodle)
    #[arg(long)]
    pub answer_numbering: Option<String>,

    /// Treat every question as multi-select (Moodle)
    #[arg(long)]
    pub no_auto_single: bool,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// One produced output buffer, pre-write.
struct Output {
    label: &'static str,
    filename: String,
    bytes: Vec<u8>,
}

pub async fn execute(args: ConvertArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let selected = parse_formats(&args.formats)?;

    let questions = parser::load_questions(&args.input)?;
    anyhow::ensure!(!questions.is_empty(), "question file contains no questions");

    let warnings = parser::validate_questions(&questions);
    for w in &warnings {
        eprintln!("  [{}] WARNING: {}", w.index, w.message);
    }

    let prefix = args.prefix.clone().unwrap_or_else(|| {
        args.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Item".to_string())
    });

    // Flags override config-file values.
    let strip_prefixes = config.strip_prefixes && !args.keep_prefixes;
    let convert_math = config.convert_math && !args.no_math;
    let shuffle = config.shuffle && !args.no_shuffle;
    let auto_single = config.auto_single && !args.no_auto_single;
    let default_grade = args.default_grade.unwrap_or(config.default_grade);
    let penalty = args.penalty.unwrap_or(config.penalty);
    let answer_numbering: AnswerNumbering = args
        .answer_numbering
        .as_deref()
        .unwrap_or(&config.answer_numbering)
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    anyhow::ensure!(default_grade >= 0.0, "default grade must not be negative");
    anyhow::ensure!(
        (0.0..=1.0).contains(&penalty),
        "penalty must be between 0.0 and 1.0"
    );

    let request = ExportRequest {
        qti: selected.contains(&"qti").then(|| QtiConfig {
            item_prefix: prefix.clone(),
            strip_prefixes,
            convert_math,
            shuffle,
        }),
        moodle: selected.contains(&"moodle").then(|| MoodleConfig {
            name_prefix: prefix.clone(),
            strip_prefixes,
            convert_math,
            default_grade,
            penalty,
            answer_numbering,
            shuffle,
            auto_single,
        }),
    };

    let mut outputs: Vec<Output> = Vec::new();
    let mut failed = 0usize;

    if !request.is_empty() {
        let mut ids = UuidIds;
        let outcome = export(&questions, &request, &mut ids)?;

        for failure in &outcome.failures {
            eprintln!("{} conversion failed: {}", failure.format, failure.error);
            failed += 1;
        }
        for file in outcome.files {
            outputs.push(Output {
                label: match file.format {
                    Format::Qti => "QTI package",
                    Format::Moodle => "Moodle XML",
                },
                filename: file.filename,
                bytes: file.bytes,
            });
        }
    }

    let want_word = selected.contains(&"word");
    let want_word_key = selected.contains(&"word-key");
    if want_word || want_word_key {
        let mut converter =
            PandocConverter::new().timeout(Duration::from_secs(config.pandoc_timeout_secs));
        if let Some(reference) = &config.reference_doc {
            converter = converter.reference_doc(reference);
        }

        if want_word {
            let md = questions_markdown(&questions, strip_prefixes);
            match converter.convert(&md).await {
                Ok(bytes) => outputs.push(Output {
                    label: "Word (questions only)",
                    filename: format!("{prefix}_questions.docx"),
                    bytes,
                }),
                Err(e) => {
                    eprintln!("word conversion failed: {e}");
                    failed += 1;
                }
            }
        }
        if want_word_key {
            let md = answer_key_markdown(&questions, strip_prefixes);
            match converter.convert(&md).await {
                Ok(bytes) => outputs.push(Output {
                    label: "Word (answer key)",
                    filename: format!("{prefix}_questions_with_answers.docx"),
                    bytes,
                }),
                Err(e) => {
                    eprintln!("word-key conversion failed: {e}");
                    failed += 1;
                }
            }
        }
    }

    anyhow::ensure!(
        !outputs.is_empty(),
        "no output produced ({failed} format(s) failed)"
    );

    let out_dir = args.output.clone().unwrap_or(config.output_dir);
    std::fs::create_dir_all(&out_dir)?;

    for output in &outputs {
        std::fs::write(out_dir.join(&output.filename), &output.bytes)?;
    }
    tracing::info!("wrote {} file(s) to {}", outputs.len(), out_dir.display());

    // More than one output: also offer everything as a single archive.
    if outputs.len() > 1 {
        let bytes = bundle(
            outputs
                .iter()
                .map(|o| (o.filename.as_str(), o.bytes.as_slice())),
        )?;
        let filename = format!("{prefix}_package.zip");
        std::fs::write(out_dir.join(&filename), &bytes)?;
        outputs.push(Output {
            label: "Combined package",
            filename,
            bytes,
        });
    }

    print_summary(&outputs, &out_dir);

    if failed > 0 {
        eprintln!("{failed} format(s) failed; see messages above.");
    }

    Ok(())
}

/// Split and check the `--formats` selection.
fn parse_formats(formats: &str) -> Result<Vec<&str>> {
    if formats == "all" {
        return Ok(vec!["qti", "moodle", "word", "word-key"]);
    }

    let selected: Vec<&str> = formats.split(',').map(str::trim).collect();
    for f in &selected {
        anyhow::ensure!(
            matches!(*f, "qti" | "moodle" | "word" | "word-key"),
            "unknown format: '{}' (expected qti, moodle, word, word-key, or all)",
            f
        );
    }
    anyhow::ensure!(!selected.is_empty(), "no output format selected");
    Ok(selected)
}

fn print_summary(outputs: &[Output], out_dir: &std::path::Path) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Output", "File", "Size"]);

    for output in outputs {
        table.add_row(vec![
            Cell::new(output.label),
            Cell::new(out_dir.join(&output.filename).display()),
            Cell::new(human_size(output.bytes.len())),
        ]);
    }

    eprintln!("\n{table}");
}

fn human_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_formats_accepts_known_names() {
        assert_eq!(parse_formats("qti,moodle").unwrap(), vec!["qti", "moodle"]);
        assert_eq!(parse_formats("word").unwrap(), vec!["word"]);
        assert_eq!(
            parse_formats("all").unwrap(),
            vec!["qti", "moodle", "word", "word-key"]
        );
    }

    #[test]
    fn parse_formats_rejects_unknown() {
        assert!(parse_formats("pdf").is_err());
        assert!(parse_formats("qti,bogus").is_err());
    }

    #[test]
    fn human_size_formats() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KiB");
    }
}
