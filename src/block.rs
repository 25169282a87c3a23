// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Marked block layout and text splicing.
//!
//! A __marked block__ is a region of shell source wedged between two literal
//! marker lines. The markers are the only structure that cdj-hook relies on
//! inside of a user's shell configuration file. Everything else in that file
//! is treated as opaque text, because shell configuration files are free-form
//! scripts with no universal grammar to parse.
//!
//! # Block Layout
//!
//! ```text
//! # --- cdj hook (BEGIN) ---
//! <shell function source, verbatim>
//! # --- cdj hook (END) ---
//! ```
//!
//! The marker lines must be reproduced byte-for-byte so that any block
//! installed by an older release can still be found, upgraded, or removed by
//! a newer one.
//!
//! # Splicing Rules
//!
//! An existing block spans from the start of the first begin marker through
//! the end of the first end marker that follows it. A lone begin marker, or
//! an end marker that only appears before the begin marker, does not count as
//! an existing block. Installation then appends a fresh block instead of
//! guessing where a broken one might end.
//!
//! All splicing here is pure string manipulation. File I/O is left to the
//! [`patch`](crate::patch) module.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Range,
};

/// Begin marker line of the cdj hook block.
pub const MARK_BEGIN: &str = "# --- cdj hook (BEGIN) ---";

/// End marker line of the cdj hook block.
pub const MARK_END: &str = "# --- cdj hook (END) ---";

/// Shell function that wraps the cdj binary.
///
/// A spawned process cannot change the working directory of its parent
/// shell. So, the function runs the real binary, captures the directory it
/// prints, and performs the `cd` itself.
pub const HOOK_BODY: &str = r#"cdj() {
  # Pass through alias generation so output can be eval'ed or appended
  if [[ "$1" == "-g" || "$1" == "--gen-aliases" ]]; then
    command cdj "$@"
    return
  fi

  local resolver target
  # Resolve the real binary (avoid recursion into this function)
  resolver="$(type -P cdj 2>/dev/null || true)"
  if [ -n "$resolver" ]; then
    target="$("$resolver" "$@")" || return 1
  else
    # Fallback if the binary isn't on PATH for some reason
    target="$(npx -y cdj "$@")" || return 1
  fi

  # Only cd if we actually got a destination
  [ -n "$target" ] && cd -- "$target" || return 1
}"#;

/// Delimited region of shell source.
///
/// # Invariant
///
/// - Body never starts or ends with a newline, so rendering always places
///   each marker on its own line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedBlock {
    begin: String,
    end: String,
    body: String,
}

impl MarkedBlock {
    /// Construct new marked block.
    pub fn new(
        begin: impl Into<String>,
        end: impl Into<String>,
        body: impl AsRef<str>,
    ) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
            body: body.as_ref().trim_matches(['\r', '\n']).to_owned(),
        }
    }

    pub fn begin(&self) -> &str {
        self.begin.as_str()
    }

    pub fn end(&self) -> &str {
        self.end.as_str()
    }

    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Same markers, different body.
    ///
    /// Useful to describe an upgrade of a block that has already been
    /// installed.
    pub fn with_body(&self, body: impl AsRef<str>) -> Self {
        Self::new(self.begin.clone(), self.end.clone(), body)
    }

    /// Locate existing block inside of given content.
    ///
    /// Returns byte range that starts at the first begin marker, and ends
    /// just past the first end marker that follows it.
    pub fn locate(&self, content: &str) -> Option<Range<usize>> {
        let start = content.find(self.begin.as_str())?;
        let search_from = start + self.begin.len();
        let end = content[search_from..]
            .find(self.end.as_str())
            .map(|offset| search_from + offset + self.end.len())?;

        Some(start..end)
    }

    /// Check if content already contains this block's markers in order.
    pub fn is_present_in(&self, content: &str) -> bool {
        self.locate(content).is_some()
    }

    /// Splice block into content.
    ///
    /// Replaces an existing block in place, or appends a fresh one separated
    /// from prior content by exactly one blank line. Applying the same block
    /// twice yields the same text as applying it once.
    pub fn splice_install(&self, content: &str) -> (String, InstallAction) {
        let block = self.to_string();

        match self.locate(content) {
            Some(span) => {
                let before = content[..span.start].trim_end();
                let after = content[span.end..].trim_start();

                let mut next = String::with_capacity(content.len() + block.len());
                if !before.is_empty() {
                    next.push_str(before);
                    next.push_str("\n\n");
                }
                next.push_str(&block);
                next.push('\n');
                next.push_str(after);

                (next, InstallAction::Replaced)
            }
            None => {
                let before = content.trim_end();

                let mut next = String::with_capacity(content.len() + block.len() + 3);
                if !before.is_empty() {
                    next.push_str(before);
                    next.push_str("\n\n");
                }
                next.push_str(&block);
                next.push('\n');

                (next, InstallAction::Installed)
            }
        }
    }

    /// Splice block out of content.
    ///
    /// Returns `None` if no block exists. Otherwise, the text around the
    /// block is rejoined by a single newline.
    pub fn splice_remove(&self, content: &str) -> Option<String> {
        let span = self.locate(content)?;
        let before = content[..span.start].trim_end();
        let after = content[span.end..].trim_start();

        // INVARIANT: Never leave a dangling newline at the top of the file.
        if before.is_empty() {
            return Some(after.to_owned());
        }

        Some(format!("{before}\n{after}"))
    }
}

impl Default for MarkedBlock {
    /// The cdj hook block.
    fn default() -> Self {
        Self::new(MARK_BEGIN, MARK_END, HOOK_BODY)
    }
}

impl Display for MarkedBlock {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}\n{}\n{}", self.begin, self.body, self.end)
    }
}

/// What installation did to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
    /// Fresh block was appended.
    Installed,

    /// Existing block was upgraded in place.
    Replaced,
}

impl Display for InstallAction {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Installed => fmt.write_str("installed"),
            Self::Replaced => fmt.write_str("replaced"),
        }
    }
}
