use std::{
    collections::VecDeque,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use tracing::debug;

/// Where the turn loop gets its next line of operator input. `Ok(None)`
/// means the input is exhausted.
pub trait CommandSource {
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Reads one line per turn from standard input.
#[derive(Default)]
pub struct StdinInput;

impl CommandSource for StdinInput {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }
}

/// Replays a fixed list of commands, one per turn.
pub struct ScriptedInput {
    script_commands: VecDeque<String>,
}

impl ScriptedInput {
    /// Loads a command script. Blank lines and `#` comments are skipped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line?);
        }
        let script = Self::from_lines(lines);
        debug!(
            "Loaded {} scripted commands from {}",
            script.remaining(),
            path.as_ref().display()
        );
        Ok(script)
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let script_commands = lines
            .into_iter()
            .filter_map(|line| {
                let trimmed = line.as_ref().trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    None
                } else {
                    Some(trimmed.to_lowercase())
                }
            })
            .collect();
        Self { script_commands }
    }

    pub fn remaining(&self) -> usize {
        self.script_commands.len()
    }
}

impl CommandSource for ScriptedInput {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.script_commands.pop_front())
    }
}
