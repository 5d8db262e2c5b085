//! # Capabilities
//!
//! Each capability is a trait with default methods over [`DocumentModel`],
//! so an editor type gains an operation by implementing the trait with an
//! empty body. Every operation returns the editor for `?`-chaining:
//!
//! ```rust,ignore
//! editor
//!     .add_import("buildConfig", "import legacy from '@vitejs/plugin-legacy'")?
//!     .add_plugin("buildConfig", "legacy()")?;
//! ```
//!
//! [`DocumentModel`]: crate::DocumentModel

mod alias;
mod imports;
mod jsx;
mod plugins;

pub use alias::AliasInjection;
pub use imports::{ImportInjection, StatementInjection};
pub use jsx::JsxProvider;
pub use plugins::PluginInjection;

use sprout_parser::ast::{Graft, Program, Statement};
use sprout_parser::{parse, ParseResult};

/// Parse `source` and wrap each top-level statement so it prints from `source`
///
/// Comments above a statement travel with it, and so does a comment that
/// ends the statement's line.
pub(crate) fn grafted_statements(source: &str) -> ParseResult<Vec<Statement>> {
    let Program { body, .. } = parse(source)?;
    let mut cursor = 0;
    let mut statements = Vec::with_capacity(body.len());
    for statement in body {
        let span = statement.span();
        let leading = source.get(cursor..span.start).unwrap_or_default().trim();

        let line_end = source[span.end..]
            .find('\n')
            .map_or(source.len(), |i| span.end + i);
        let rest = source[span.end..line_end].trim();
        let trailing = if is_comment(rest) { rest } else { "" };
        cursor = if trailing.is_empty() { span.end } else { line_end };

        let graft = Graft::new(source, statement).with_comments(leading, trailing);
        statements.push(Statement::Graft(graft));
    }
    Ok(statements)
}

fn is_comment(text: &str) -> bool {
    text.starts_with("//") || (text.starts_with("/*") && text.ends_with("*/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grafted_statements_keep_their_source() {
        let statements = grafted_statements("import a from 'a'\nrun(a)").unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].is_import());
        assert!(statements
            .iter()
            .all(|statement| matches!(statement, Statement::Graft(graft) if graft.source.contains("run(a)"))));
    }

    #[test]
    fn test_grafted_statements_carry_comments() {
        let statements =
            grafted_statements("// first\n/* second */\nconst x = 1 // trailing\nrun(x)").unwrap();
        let Statement::Graft(first) = &statements[0] else {
            panic!("expected graft");
        };
        assert_eq!(first.leading_comments, "// first\n/* second */");
        assert_eq!(first.trailing_comment, "// trailing");

        let Statement::Graft(second) = &statements[1] else {
            panic!("expected graft");
        };
        assert!(second.leading_comments.is_empty());
        assert!(second.trailing_comment.is_empty());
    }

    #[test]
    fn test_grafted_statements_of_empty_source() {
        assert!(grafted_statements("").unwrap().is_empty());
        assert!(grafted_statements("  // nothing\n").unwrap().is_empty());
    }
}
