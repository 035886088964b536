use std::fmt::Write as _;

/// Shell script executed inside a job directory.
///
/// Rendered as: shebang, variable assignments, appended lines in call
/// order, then the solver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunScript {
    shell: String,
    variables: Vec<(String, String)>,
    lines: Vec<String>,
    invocation: Option<String>,
}

impl Default for RunScript {
    fn default() -> Self {
        Self {
            shell: "/bin/bash".to_string(),
            variables: Vec::new(),
            lines: Vec::new(),
            invocation: None,
        }
    }
}

impl RunScript {
    /// Declares `NAME="value"` in the preamble, replacing an earlier value
    /// but keeping its position.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.variables.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.variables.push((name, value)),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn append_block<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    pub fn set_invocation(&mut self, command: impl Into<String>) {
        self.invocation = Some(command.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "#!{}", self.shell);
        out.push('\n');
        if !self.variables.is_empty() {
            for (name, value) in &self.variables {
                let _ = writeln!(out, "{name}=\"{value}\"");
            }
            out.push('\n');
        }
        for line in &self.lines {
            out.push_str(line);
            if !line.ends_with('\n') {
                out.push('\n');
            }
        }
        if let Some(invocation) = &self.invocation {
            let _ = writeln!(out, "{invocation}");
        }
        out
    }
}
