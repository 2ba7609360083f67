//! Prompt texts sent to the model
//!
//! The analysis template may reference `{file_index}` and `{code}`; every other
//! brace sequence is copied through untouched. Substitution is a single pass, so
//! placeholder-like text inside a source file is never expanded.

use serde::{Deserialize, Serialize};

pub const FILE_INDEX_PLACEHOLDER: &str = "file_index";
pub const CODE_PLACEHOLDER: &str = "code";

const DEFAULT_SYSTEM: &str = "You are a helpful assistant that analyzes software projects.";

const DEFAULT_ANALYSIS: &str = "\
Analyze the following project:

File index:
{file_index}

Code content:
{code}

Provide a detailed analysis including:
1. Overall project structure
2. Main functionalities
3. Key components and their interactions
4. Potential improvements or issues

Format the analysis as a dictionary with keys: 'structure', 'functionalities', 'components', 'improvements'.
";

const DEFAULT_README: &str = "\
Based on the previous analysis, create a README.md file for this project.

The README should include:
1. Project Overview
2. Installation and Setup
3. Usage Instructions
4. Project Structure
5. Key Components
6. Potential Improvements
7. Contributing Guidelines
8. License (Assume MIT License)

Format the README in Markdown.
";

/// The three prompts of a run
///
/// Loadable from TOML; any key left out keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSet {
    /// System instruction establishing the assistant's role
    pub system: String,
    /// User instruction template for the analysis request
    pub analysis: String,
    /// Follow-up instruction requesting the README
    pub readme: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM.to_string(),
            analysis: DEFAULT_ANALYSIS.to_string(),
            readme: DEFAULT_README.to_string(),
        }
    }
}

impl PromptSet {
    /// Renders the analysis request for a file index and code blob
    pub fn render_analysis(&self, file_index: &[String], code: &str) -> String {
        let index = format!("{:?}", file_index);
        render(
            &self.analysis,
            &[(FILE_INDEX_PLACEHOLDER, index.as_str()), (CODE_PLACEHOLDER, code)],
        )
    }
}

/// Replaces `{name}` placeholders in a single left-to-right pass
///
/// Unknown placeholders and unbalanced braces are kept verbatim.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
