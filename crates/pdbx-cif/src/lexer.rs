use logos::Logos;

use crate::error::{CifError, Position, Span};
use crate::token::{classify_word, LexErrorKind, RawToken, Semicolon, Token};

/// A token paired with its source position and raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub position: Position,
    pub text: String,
}

/// Lazy tokenizer over CIF source text.
///
/// Yields tokens in order, then a single [`Token::EndOfInput`], then
/// nothing. After an error it yields nothing further. To start over,
/// build a new tokenizer.
pub struct Tokenizer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, RawToken>,
    line: usize,
    line_start: usize,
    scanned: usize,
    finished: bool,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut inner = RawToken::lexer(source);
        if source.starts_with('\u{feff}') {
            inner.bump('\u{feff}'.len_utf8());
        }
        Self {
            source,
            inner,
            line: 1,
            line_start: 0,
            scanned: 0,
            finished: false,
        }
    }

    /// Position of the end of the source.
    pub(crate) fn end_of_input(&mut self) -> SpannedToken {
        let end = self.source.len();
        SpannedToken {
            token: Token::EndOfInput,
            position: self.position(end, end),
            text: String::new(),
        }
    }

    /// Line and column of `start`. Offsets must not decrease between calls.
    fn position(&mut self, start: usize, end: usize) -> Position {
        let skipped = &self.source[self.scanned..start];
        for (i, byte) in skipped.bytes().enumerate() {
            if byte == b'\n' {
                self.line += 1;
                self.line_start = self.scanned + i + 1;
            }
        }
        self.scanned = start;
        let column = self.source[self.line_start..start].chars().count() + 1;
        Position::new(self.line, column, Span::new(start, end))
    }

    fn lex_error(kind: LexErrorKind, position: Position) -> CifError {
        match kind {
            LexErrorKind::InvalidCharacter => CifError::InvalidCharacter { position },
            LexErrorKind::UnterminatedQuote(quote) => CifError::UnterminatedQuote { quote, position },
            LexErrorKind::UnterminatedTextField => CifError::UnterminatedTextField { position },
        }
    }

    fn token(raw: RawToken, text: &str, position: Position) -> Result<Token, CifError> {
        Ok(match raw {
            RawToken::Tag => {
                let name = &text[1..];
                match name.split_once('.') {
                    Some((category, attribute)) if !category.is_empty() && !attribute.is_empty() => {
                        Token::Tag {
                            category: category.to_string(),
                            attribute: attribute.to_string(),
                        }
                    }
                    _ => {
                        return Err(CifError::InvalidItemName {
                            text: text.to_string(),
                            position,
                        })
                    }
                }
            }
            RawToken::SingleQuoted(text) => Token::QuotedValue { text, quote: '\'' },
            RawToken::DoubleQuoted(text) => Token::QuotedValue { text, quote: '"' },
            RawToken::Semicolon(Semicolon::TextField(text)) => Token::TextField(text),
            RawToken::Semicolon(Semicolon::Bare(text)) => Token::BareValue(text),
            RawToken::Word => classify_word(text),
        })
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<SpannedToken, CifError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let Some(result) = self.inner.next() else {
            self.finished = true;
            return Some(Ok(self.end_of_input()));
        };

        let range = self.inner.span();
        let text = self.source[range.clone()].to_string();
        let position = self.position(range.start, range.end);
        let token = result
            .map_err(|kind| Self::lex_error(kind, position))
            .and_then(|raw| Self::token(raw, &text, position));

        match token {
            Ok(token) => Some(Ok(SpannedToken {
                token,
                position,
                text,
            })),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}

/// Tokenizes a whole source string, including the final `EndOfInput`.
///
/// # Errors
///
/// Returns the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, CifError> {
    Tokenizer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|st| st.token)
            .collect()
    }

    #[test]
    fn tokenize_item() {
        let tokens = kinds("data_TEST\n_cat.a hello\n");
        assert_eq!(
            tokens,
            vec![
                Token::DataKeyword("TEST".into()),
                Token::Tag {
                    category: "cat".into(),
                    attribute: "a".into()
                },
                Token::BareValue("hello".into()),
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn tag_splits_at_first_dot() {
        let tokens = kinds("_pdbx_struct.oper.list 1");
        assert_eq!(
            tokens[0],
            Token::Tag {
                category: "pdbx_struct".into(),
                attribute: "oper.list".into()
            }
        );
    }

    #[test]
    fn tag_case_is_preserved() {
        let tokens = kinds("_Atom_Site.Cartn_X");
        assert_eq!(
            tokens[0],
            Token::Tag {
                category: "Atom_Site".into(),
                attribute: "Cartn_X".into()
            }
        );
    }

    #[test]
    fn invalid_item_names() {
        for source in ["_nodot 1", "_.attr 1", "_cat. 1", "_ 1"] {
            let err = tokenize(source).unwrap_err();
            assert!(
                matches!(err, CifError::InvalidItemName { .. }),
                "expected invalid item name for {source:?}, got {err:?}"
            );
            assert_eq!(err.class(), ErrorClass::Lexical);
        }
    }

    #[test]
    fn values() {
        let tokens = kinds("'a b' \"c d\" ;x plain ? .");
        assert_eq!(
            tokens,
            vec![
                Token::QuotedValue {
                    text: "a b".into(),
                    quote: '\''
                },
                Token::QuotedValue {
                    text: "c d".into(),
                    quote: '"'
                },
                Token::BareValue(";x".into()),
                Token::BareValue("plain".into()),
                Token::BareValue("?".into()),
                Token::BareValue(".".into()),
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn quoted_keywords_are_values() {
        let tokens = kinds("'loop_' \"data_x\"");
        assert!(tokens[..2].iter().all(Token::is_value));
    }

    #[test]
    fn positions_are_one_based() {
        let tokens = tokenize("data_x\n  _cat.a  héllo\n;text\nmore\n;\n_cat.b 1").unwrap();
        let at: Vec<(usize, usize)> = tokens
            .iter()
            .map(|st| (st.position.line, st.position.column))
            .collect();
        assert_eq!(
            at,
            vec![(1, 1), (2, 3), (2, 11), (3, 1), (6, 1), (6, 8), (6, 9)]
        );
        assert_eq!(tokens[2].text, "héllo");
        assert_eq!(tokens[2].position.span.len(), "héllo".len());
    }

    #[test]
    fn end_of_input_once_then_nothing() {
        let mut tokenizer = Tokenizer::new("");
        assert!(matches!(
            tokenizer.next(),
            Some(Ok(SpannedToken {
                token: Token::EndOfInput,
                ..
            }))
        ));
        assert!(tokenizer.next().is_none());
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn comment_only_input() {
        assert_eq!(kinds("# nothing here\n   \n#\n"), vec![Token::EndOfInput]);
    }

    #[test]
    fn errors_stop_the_stream() {
        let mut tokenizer = Tokenizer::new("_a.b 'open\n_c.d 1");
        assert!(tokenizer.next().unwrap().is_ok());
        let err = tokenizer.next().unwrap().unwrap_err();
        assert!(matches!(err, CifError::UnterminatedQuote { quote: '\'', .. }));
        assert_eq!(err.position().unwrap().column, 6);
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn unterminated_text_field_is_lexical() {
        let err = tokenize("data_x\n_a.b\n;never closed\n").unwrap_err();
        assert!(matches!(err, CifError::UnterminatedTextField { .. }));
        assert_eq!(err.class(), ErrorClass::Lexical);
        assert_eq!(err.position().unwrap().line, 3);
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        let tokens = tokenize("\u{feff}data_x").unwrap();
        assert_eq!(tokens[0].token, Token::DataKeyword("x".into()));
        assert_eq!(tokens[0].position.column, 2);
    }
}
