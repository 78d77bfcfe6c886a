#[cfg(test)]
mod scanner_tests {
    use tern::scanner::*;
    use tern::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_symbols() {
        assert_token_sequence(
            "({*,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_operators() {
        assert_token_sequence(
            "! != = == > >= < <= / -",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::SLASH, "/"),
                (TokenType::MINUS, "-"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_keywords_and_identifiers() {
        assert_token_sequence(
            "var language = tern; while for fun return print if else and or",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "language"),
                (TokenType::EQUAL, "="),
                (TokenType::IDENTIFIER, "tern"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::WHILE, "while"),
                (TokenType::FOR, "for"),
                (TokenType::FUN, "fun"),
                (TokenType::RETURN, "return"),
                (TokenType::PRINT, "print"),
                (TokenType::IF, "if"),
                (TokenType::ELSE, "else"),
                (TokenType::AND, "and"),
                (TokenType::OR, "or"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_literals() {
        let scanner = Scanner::new(b"12 3.14 \"hi there\" true false nil");
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 7);

        match &tokens[0].token_type {
            TokenType::NUMBER(n) => assert_eq!(*n, 12.0),
            other => panic!("Expected NUMBER, got {:?}", other),
        }
        match &tokens[1].token_type {
            TokenType::NUMBER(n) => assert_eq!(*n, 3.14),
            other => panic!("Expected NUMBER, got {:?}", other),
        }
        match &tokens[2].token_type {
            TokenType::STRING(s) => assert_eq!(s, "hi there"),
            other => panic!("Expected STRING, got {:?}", other),
        }
        assert_eq!(tokens[3].token_type, TokenType::TRUE);
        assert_eq!(tokens[4].token_type, TokenType::FALSE);
        assert_eq!(tokens[5].token_type, TokenType::NIL);
        assert_eq!(tokens[6].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_skips_comments_and_tracks_lines() {
        let source = "var a = 1; // trailing comment\nprint a;";
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        let print_token = tokens
            .iter()
            .find(|t| t.token_type == TokenType::PRINT)
            .expect("print token present");

        assert_eq!(print_token.line, 2);
    }

    #[test]
    fn test_unexpected_chars_keep_scanning() {
        // '$', '#', and a bare '.' are not part of the language; the scanner
        // reports each and carries on.
        let source = ",$(.#";
        let scanner = Scanner::new(source.as_bytes());

        let results: Vec<_> = scanner.collect();

        // 2 valid tokens, 3 errors, then EOF.
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert!(matches!(
            &results[0],
            Ok(t) if t.token_type == TokenType::COMMA
        ));
        assert!(matches!(
            &results[2],
            Ok(t) if t.token_type == TokenType::LEFT_PAREN
        ));
        assert!(matches!(
            &results[5],
            Ok(t) if t.token_type == TokenType::EOF
        ));

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 3, "Expected 3 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "Error message should contain 'Unexpected character', got: {}",
                err
            );
        }
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let scanner = Scanner::new(b"\"no closing quote");
        let results: Vec<_> = scanner.collect();

        let err = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("unterminated string should error");

        assert!(err.to_string().contains("Unterminated string"));
    }
}
