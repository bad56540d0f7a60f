/// Keyword and substitution tables driving header promotion and column-name
/// cleanup. The defaults cover the known PSX closing-rate report variants;
/// both lists are injectable so other report families can extend them
/// without touching the pipeline.
#[derive(Debug, Clone)]
pub struct HeaderRules {
    /// Tokens whose case-insensitive presence in any first-row cell marks
    /// that row as the column header.
    pub header_tokens: Vec<String>,
    /// Literal substring replacements applied to every column label.
    pub replacements: Vec<(String, String)>,
}

impl Default for HeaderRules {
    fn default() -> Self {
        let header_tokens = [
            "Company",
            "Company Name",
            "Turnover",
            "Prv.Rate",
            "Open",
            "Highest",
            "Lowest",
            "Last",
            "Rate",
            "Diff",
        ]
        .iter()
        .map(|token| token.to_string())
        .collect();

        let replacements = [
            ("Prv.", "Prev"),
            ("Last Rate", "Last"),
            ("Open Rate", "Open"),
        ]
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        Self {
            header_tokens,
            replacements,
        }
    }
}

impl HeaderRules {
    /// Canonicalizes one column label: trim, collapse whitespace runs to a
    /// single space, then apply the literal substitutions in order. The
    /// substitutions are unconditional and can over-match inside longer
    /// labels; that is accepted best-effort behavior for the known report
    /// variants, not something to second-guess here.
    pub fn normalize_label(&self, label: &str) -> String {
        let mut cleaned = label.split_whitespace().collect::<Vec<&str>>().join(" ");
        for (from, to) in &self.replacements {
            cleaned = cleaned.replace(from.as_str(), to.as_str());
        }
        cleaned
    }

    /// True when any non-null cell of the row mentions a known header token,
    /// case-insensitively.
    pub fn row_looks_like_header(&self, row: &[Option<String>]) -> bool {
        row.iter().flatten().any(|cell| {
            let lowered = cell.to_lowercase();
            self.header_tokens
                .iter()
                .any(|token| lowered.contains(&token.to_lowercase()))
        })
    }
}
