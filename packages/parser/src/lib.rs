pub mod ast;
pub mod build;
pub mod error;
pub mod lossless_serializer;
pub mod parser;
pub mod tokenizer;

#[cfg(test)]
mod tests_serializer;

pub use error::{ParseError, ParseResult};
pub use lossless_serializer::{print, LosslessSerializer};
pub use parser::{parse, parse_expression, Parser};
pub use tokenizer::{tokenize, Token};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_basic() {
        let tokens = tokenize("export default defineConfig");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_parse_and_print_roundtrip() {
        let source = "const answer = 42;\n";
        let program = parse(source).unwrap();
        assert_eq!(print(source, &program), source);
    }

    #[test]
    fn test_ast_serializes_to_json() {
        let program = parse("export default defineConfig({ plugins: [vue()] })").unwrap();
        let json = serde_json::to_string(&program).unwrap();
        assert!(json.contains("\"defineConfig\""));

        let restored: ast::Program = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, program);
    }
}
