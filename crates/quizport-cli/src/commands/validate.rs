//! The `quizport validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizport_core::parser;

pub fn execute(input: PathBuf) -> Result<()> {
    let questions = parser::load_questions(&input)?;
    println!(
        "Loaded {} question(s) from {}",
        questions.len(),
        input.display()
    );

    let mut errors = 0usize;
    for (i, q) in questions.iter().enumerate() {
        if let Err(e) = q.validate(i + 1) {
            println!("  ERROR: {e}");
            errors += 1;
        }
    }

    let warnings = parser::validate_questions(&questions);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.index, w.message);
    }

    if errors > 0 {
        anyhow::bail!("{errors} invalid question(s) found");
    }

    if warnings.is_empty() {
        println!("All questions valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
