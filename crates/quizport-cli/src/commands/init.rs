//! The `quizport init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizport.toml
    if std::path::Path::new("quizport.toml").exists() {
        println!("quizport.toml already exists, skipping.");
    } else {
        std::fs::write("quizport.toml", SAMPLE_CONFIG)?;
        println!("Created quizport.toml");
    }

    // Create example question set
    std::fs::create_dir_all("question-sets")?;
    let example_path = std::path::Path::new("question-sets/example.json");
    if example_path.exists() {
        println!("question-sets/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTIONS)?;
        println!("Created question-sets/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Adjust quizport.toml to taste");
    println!("  2. Run: quizport validate --input question-sets/example.json");
    println!("  3. Run: quizport convert --input question-sets/example.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizport configuration

# Text transforms
strip_prefixes = true
convert_math = true

# Delivery
shuffle = true
auto_single = true

# Moodle grading
default_grade = 1.0
penalty = 0.3333333
answer_numbering = "abc"

# Word export
pandoc_timeout_secs = 30
# reference_doc = "custom-reference.docx"

output_dir = "./quizport-out"
"#;

const EXAMPLE_QUESTIONS: &str = r#"[
  {
    "question": "What is $2^3$?",
    "options": {
      "A) 6": false,
      "B) 8": true,
      "C) 9": false
    },
    "success": "Exactly: three factors of two.",
    "error": "Multiply 2 by itself three times."
  },
  {
    "question": "Which of these are prime numbers?",
    "options": {
      "2": true,
      "3": true,
      "4": false,
      "9": false
    },
    "success": "Both primes found.",
    "error": "Remember: a prime has exactly two divisors."
  }
]
"#;
