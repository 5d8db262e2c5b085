use super::grafted_statements;
use crate::{DocumentModel, Edit, EditorError};
use tracing::debug;

/// Prepend import declarations
pub trait ImportInjection: DocumentModel {
    /// Insert the first statement of `import` at the top of `slot`
    ///
    /// The newest import always comes first. Text that parses to no
    /// statement at all is accepted and changes nothing.
    fn add_import(&mut self, slot: &str, import: &str) -> Result<&mut Self, EditorError> {
        self.document_mut().edit(slot, |program, _| {
            let Some(statement) = grafted_statements(import)?.into_iter().next() else {
                debug!(slot, "Empty import source");
                return Ok(Edit::Unchanged);
            };
            program.body.insert(0, statement);
            debug!(slot, import, "Added import");
            Ok(Edit::Applied)
        })?;
        Ok(self)
    }
}

/// Insert statements after the import block
pub trait StatementInjection: DocumentModel {
    /// Insert every statement of `code` right after the last import of
    /// `slot`, or at the top when there is none
    fn add_code(&mut self, slot: &str, code: &str) -> Result<&mut Self, EditorError> {
        self.document_mut().edit(slot, |program, _| {
            let statements = grafted_statements(code)?;
            if statements.is_empty() {
                return Ok(Edit::Unchanged);
            }

            let at = program
                .body
                .iter()
                .rposition(|statement| statement.is_import())
                .map_or(0, |last| last + 1);
            debug!(slot, at, count = statements.len(), "Added code");
            program.body.splice(at..at, statements);
            Ok(Edit::Applied)
        })?;
        Ok(self)
    }
}
