//! Line-oriented patcher for Gradle-style build scripts
//!
//! Closures are located by brace depth: every line containing `{` opens one
//! level and every line containing `}` closes one. This is not a Groovy parser;
//! only the managed blocks and lines are touched and everything else is kept
//! byte for byte.

use std::fs;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::gradle::error::PatchError;
use crate::persist::write_atomically;

/// A named configuration block such as
///
/// ```text
/// applovin {
///     // comment
///     apiKey 'value'
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BlockTemplate {
    /// Literal identifying the block's opening line, also used verbatim when inserting
    pub open_line: String,
    /// Matches the key line inside the block
    pub key_pattern: Regex,
    /// Rendered key line
    pub key_line: String,
    pub comment_lines: Vec<String>,
    /// Lines inserted right after the anchor, before the block
    pub prefix_lines: Vec<String>,
    /// The block is inserted after the first line matching this
    pub anchor: Regex,
}

/// Repository and classpath lines that belong inside an enclosing closure such as `buildscript`
#[derive(Debug, Clone)]
pub struct ClosureInsertion {
    pub closure_literal: String,
    pub repository_anchor: Regex,
    pub repository_line: String,
    pub classpath_anchor: Regex,
    pub classpath_line: String,
}

/// What identifies a managed plugin for removal
#[derive(Debug, Clone)]
pub struct RemovalTemplate {
    pub open_line: String,
    pub repository_literal: String,
    pub classpath_literal: String,
    pub apply_pattern: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureOutcome {
    Inserted,
    AlreadyPresent,
}

/// Which parts of a plugin were removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalSummary {
    pub block: bool,
    pub repository: bool,
    pub classpath: bool,
    pub apply_plugin: bool,
}

impl RemovalSummary {
    pub fn is_empty(&self) -> bool {
        !(self.block || self.repository || self.classpath || self.apply_plugin)
    }
}

/// A build script held as lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildScriptDocument {
    lines: Vec<String>,
}

impl BuildScriptDocument {
    pub fn read(path: &Path) -> Result<Self, PatchError> {
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => PatchError::NotFound(path.to_path_buf()),
            _ => PatchError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Ok(Self::from_text(&content))
    }

    pub fn from_text(content: &str) -> Self {
        Self {
            lines: content.lines().map(String::from).collect(),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines joined with `\n` plus a trailing newline
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Replace the file at `path` through a sibling temp file
    pub fn write(&self, path: &Path) -> Result<(), PatchError> {
        write_atomically(path, &self.to_text()).map_err(|source| PatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote build file {:?}", path);
        Ok(())
    }

    /// Insert or update a named block.
    ///
    /// When the block exists, only its key line is rewritten. Otherwise the
    /// block (with its prefix lines) goes after the anchor line, and the
    /// optional closure lines are inserted too. On error the document is unchanged.
    pub fn upsert_block(
        &mut self,
        block: &BlockTemplate,
        build_script: Option<&ClosureInsertion>,
    ) -> Result<BlockOutcome, PatchError> {
        if let Some(start) = find_line_containing(&self.lines, &block.open_line) {
            return Ok(self.update_block_key(start, block));
        }

        let mut patched = self.clone();
        if let Some(closure) = build_script {
            patched.insert_build_script_lines(closure)?;
        }

        let anchor_index = patched
            .lines
            .iter()
            .position(|line| block.anchor.is_match(line))
            .ok_or_else(|| PatchError::PluginBlockNotAdded {
                anchor: block.anchor.as_str().to_string(),
            })?;

        let rendered = block
            .prefix_lines
            .iter()
            .cloned()
            .chain([String::new(), block.open_line.clone()])
            .chain(block.comment_lines.iter().cloned())
            .chain([block.key_line.clone(), "}".to_string()]);
        patched
            .lines
            .splice(anchor_index + 1..anchor_index + 1, rendered);

        *self = patched;
        Ok(BlockOutcome::Inserted)
    }

    fn update_block_key(&mut self, start: usize, block: &BlockTemplate) -> BlockOutcome {
        let extent = closure_extent(&self.lines, start);
        // A block opened and closed on one line is left as written
        if extent.len() < 2 {
            return BlockOutcome::Unchanged;
        }

        let body = extent.start + 1..extent.end - 1;
        let key_index = self.lines[body.clone()]
            .iter()
            .position(|line| block.key_pattern.is_match(line))
            .map(|offset| body.start + offset);

        match key_index {
            Some(index) if self.lines[index] == block.key_line => BlockOutcome::Unchanged,
            Some(index) => {
                self.lines[index] = block.key_line.clone();
                BlockOutcome::Updated
            }
            // Keyless block: add the key before the closing line
            None => {
                self.lines.insert(body.end, block.key_line.clone());
                BlockOutcome::Updated
            }
        }
    }

    /// Insert the repository and classpath lines into the enclosing closure.
    ///
    /// Several closures with the same name are scanned in turn until both lines
    /// are placed. Lines already present anywhere in the document are not added again.
    pub fn insert_build_script_lines(
        &mut self,
        closure: &ClosureInsertion,
    ) -> Result<ClosureOutcome, PatchError> {
        let mut repository_added = contains_trimmed(&self.lines, &closure.repository_line);
        let mut classpath_added = contains_trimmed(&self.lines, &closure.classpath_line);
        if repository_added && classpath_added {
            return Ok(ClosureOutcome::AlreadyPresent);
        }

        let mut output = Vec::with_capacity(self.lines.len() + 2);
        let mut matched = false;
        let mut inside = false;
        let mut opened = false;
        let mut depth = 0i32;

        for line in &self.lines {
            output.push(line.clone());

            if !matched && line.contains(&closure.closure_literal) {
                matched = true;
                inside = true;
                opened = false;
                depth = 0;
            }

            if inside {
                if line.contains('{') {
                    depth += 1;
                    opened = true;
                }
                if line.contains('}') {
                    depth -= 1;
                }
                if opened && depth <= 0 {
                    inside = false;
                    matched = repository_added && classpath_added;
                }
            }

            if inside {
                if !repository_added && closure.repository_anchor.is_match(line) {
                    output.push(closure.repository_line.clone());
                    repository_added = true;
                } else if !classpath_added && closure.classpath_anchor.is_match(line) {
                    output.push(closure.classpath_line.clone());
                    classpath_added = true;
                }
            }
        }

        if !repository_added {
            return Err(PatchError::RepositoryNotAdded {
                closure: closure.closure_literal.clone(),
                classpath_added,
            });
        }
        if !classpath_added {
            return Err(PatchError::ClasspathNotAdded {
                closure: closure.closure_literal.clone(),
                repository_added,
            });
        }

        self.lines = output;
        Ok(ClosureOutcome::Inserted)
    }

    /// Remove a named block and the first repository, classpath and apply-plugin line
    pub fn remove_block(&mut self, template: &RemovalTemplate) -> RemovalSummary {
        let mut summary = RemovalSummary::default();
        let extent = find_line_containing(&self.lines, &template.open_line)
            .map(|start| closure_extent(&self.lines, start))
            .unwrap_or(0..0);
        summary.block = !extent.is_empty();

        let mut output = Vec::with_capacity(self.lines.len());
        for (index, line) in self.lines.iter().enumerate() {
            if extent.contains(&index) {
                continue;
            }
            if !summary.repository && line.contains(&template.repository_literal) {
                summary.repository = true;
                continue;
            }
            if !summary.classpath && line.contains(&template.classpath_literal) {
                summary.classpath = true;
                continue;
            }
            if !summary.apply_plugin && template.apply_pattern.is_match(line) {
                summary.apply_plugin = true;
                continue;
            }
            output.push(line.clone());
        }

        self.lines = output;
        summary
    }

    /// Replace the first line matching `pattern` with `replacement`
    pub fn replace_first_line(&mut self, pattern: &Regex, replacement: &str) -> bool {
        match self.lines.iter().position(|line| pattern.is_match(line)) {
            Some(index) => {
                self.lines[index] = replacement.to_string();
                true
            }
            None => false,
        }
    }

    /// Replace the first line containing any of `literals` with `replacement`
    pub fn replace_first_containing(&mut self, literals: &[&str], replacement: &str) -> bool {
        let position = self
            .lines
            .iter()
            .position(|line| literals.iter().any(|literal| line.contains(literal)));

        match position {
            Some(index) => {
                self.lines[index] = replacement.to_string();
                true
            }
            None => false,
        }
    }

    /// Insert `line` after the first line matching `anchor` inside the first closure named `closure_literal`.
    ///
    /// Returns `false` when the closure already contains the line.
    pub fn insert_into_closure(
        &mut self,
        closure_literal: &str,
        anchor: &Regex,
        line: &str,
    ) -> Result<bool, PatchError> {
        let not_found = || PatchError::ClosureNotFound(closure_literal.to_string());
        let start = find_line_containing(&self.lines, closure_literal).ok_or_else(not_found)?;
        let extent = closure_extent(&self.lines, start);

        if contains_trimmed(&self.lines[extent.clone()], line) {
            return Ok(false);
        }

        let anchor_index = self.lines[extent.clone()]
            .iter()
            .position(|candidate| anchor.is_match(candidate))
            .map(|offset| extent.start + offset)
            .ok_or_else(not_found)?;

        self.lines.insert(anchor_index + 1, line.to_string());
        Ok(true)
    }

    /// Insert `line` right before the closing line of the first closure named `closure_literal`.
    ///
    /// Returns `false` when the closure already contains the line.
    pub fn insert_before_closure_end(
        &mut self,
        closure_literal: &str,
        line: &str,
    ) -> Result<bool, PatchError> {
        let not_found = || PatchError::ClosureNotFound(closure_literal.to_string());
        let start = find_line_containing(&self.lines, closure_literal).ok_or_else(not_found)?;
        let extent = closure_extent(&self.lines, start);

        let closing_index = extent.end - 1;
        if closing_index == start || !self.lines[closing_index].contains('}') {
            return Err(not_found());
        }
        if contains_trimmed(&self.lines[extent], line) {
            return Ok(false);
        }

        self.lines.insert(closing_index, line.to_string());
        Ok(true)
    }
}

/// Replace the first line of the file matching `pattern`.
///
/// Returns `false` without writing when nothing matches. A missing file is
/// `PatchError::NotFound`.
pub fn replace_line_in_file(
    path: &Path,
    pattern: &Regex,
    replacement: &str,
) -> Result<bool, PatchError> {
    let mut document = BuildScriptDocument::read(path)?;

    if !document.replace_first_line(pattern, replacement) {
        return Ok(false);
    }

    document.write(path)?;
    Ok(true)
}

fn find_line_containing(lines: &[String], literal: &str) -> Option<usize> {
    lines.iter().position(|line| line.contains(literal))
}

fn contains_trimmed(lines: &[String], line: &str) -> bool {
    let needle = line.trim();
    lines.iter().any(|candidate| candidate.contains(needle))
}

/// Line range of the closure opened at `start`, including its closing line.
///
/// An unterminated closure extends to the end of the document.
fn closure_extent(lines: &[String], start: usize) -> Range<usize> {
    let mut depth = 0i32;
    let mut opened = false;

    for (index, line) in lines.iter().enumerate().skip(start) {
        if line.contains('{') {
            depth += 1;
            opened = true;
        }
        if line.contains('}') {
            depth -= 1;
        }
        if opened && depth <= 0 {
            return start..index + 1;
        }
    }

    start..lines.len()
}
