//! Rendering syntax errors as annotated source snippets.

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use crate::error::SyntaxError;

/// Options for rendering diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub colored: bool,
}

impl RenderOptions {
    pub fn plain() -> Self {
        Self { colored: false }
    }

    pub fn colored() -> Self {
        Self { colored: true }
    }
}

/// Renders a syntax error against its source with the offending span
/// underlined. `path` names the source in the header when given.
pub fn render_syntax_error(
    source: &str,
    path: Option<&str>,
    error: &SyntaxError,
    options: RenderOptions,
) -> String {
    let renderer = if options.colored {
        Renderer::styled()
    } else {
        Renderer::plain()
    };

    let start = error.span.start.min(source.len());
    let end = error.span.end.min(source.len());
    // Zero-width spans (end of input) widen to one character so the caret
    // has something to point at.
    let end = if start == end {
        (start + 1).min(source.len())
    } else {
        end
    };

    let mut snippet = Snippet::source(source).line_start(1).annotation(
        AnnotationKind::Primary
            .span(start..end)
            .label(&error.message),
    );
    if let Some(path) = path {
        snippet = snippet.path(path);
    }

    let report: Vec<Group> = vec![Level::ERROR.primary_title(&error.message).element(snippet)];
    renderer.render(&report).to_string()
}
