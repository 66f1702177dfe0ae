//! Interactive prompting for the standalone generator

use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::tree::TreeSpec;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Input ended before a value for {0} was given")]
    EndOfInput(&'static str),

    #[error("Prompt I/O failed: {0}")]
    Io(#[from] io::Error),
}

const DEPTH_PROMPT: &str = "Enter the depth of directories: ";
const BREADTH_PROMPT: &str = "Enter the breadth (number of subdirectories per directory): ";
const FILES_PROMPT: &str = "Enter the number of files per directory: ";

/// Ask for depth, breadth and files per directory, in that order.
///
/// Each answer must be a positive integer; anything else is rejected and the
/// same question is asked again.
pub fn read_tree_spec<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<TreeSpec, PromptError> {
    let depth = read_positive(input, output, DEPTH_PROMPT, "depth")?;
    let breadth = read_positive(input, output, BREADTH_PROMPT, "breadth")?;
    let files_per_dir = read_positive(input, output, FILES_PROMPT, "files per directory")?;
    Ok(TreeSpec::new(depth, breadth, files_per_dir))
}

fn read_positive<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    field: &'static str,
) -> Result<u32, PromptError> {
    let mut line = String::new();
    loop {
        write!(output, "{prompt}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(PromptError::EndOfInput(field));
        }
        match line.trim().parse::<u32>() {
            Ok(value) if value > 0 => return Ok(value),
            _ => writeln!(output, "Please enter a positive integer.")?,
        }
    }
}
