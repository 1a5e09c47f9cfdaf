use std::fmt;

use logos::{Lexer, Logos};

/// Tokens handed from the tokenizer to the parser.
///
/// Whitespace and comments never appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `data_<name>`; holds the name, which may be empty.
    DataKeyword(String),
    /// `save_<name>`; an empty name is the frame terminator.
    SaveKeyword(String),
    LoopKeyword,
    GlobalKeyword,
    StopKeyword,
    /// `_category.attribute`, split at the first `.`.
    Tag { category: String, attribute: String },
    BareValue(String),
    /// A `'...'` or `"..."` value with the quotes removed.
    QuotedValue { text: String, quote: char },
    /// The content of a `;` text field.
    TextField(String),
    EndOfInput,
}

impl Token {
    /// Returns a human-readable description of this token kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::DataKeyword(_) => "data_ block header",
            Self::SaveKeyword(name) if name.is_empty() => "save_ terminator",
            Self::SaveKeyword(_) => "save_ frame header",
            Self::LoopKeyword => "'loop_'",
            Self::GlobalKeyword => "'global_'",
            Self::StopKeyword => "'stop_'",
            Self::Tag { .. } => "tag",
            Self::BareValue(_) => "bare value",
            Self::QuotedValue { .. } => "quoted value",
            Self::TextField(_) => "text field",
            Self::EndOfInput => "end of input",
        }
    }

    /// True for the three value forms.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            Self::BareValue(_) | Self::QuotedValue { .. } | Self::TextField(_)
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Classifies a bare word as a reserved keyword or a plain value.
///
/// Keyword prefixes are matched case-insensitively; the name after
/// `data_` or `save_` keeps its casing.
pub(crate) fn classify_word(word: &str) -> Token {
    match reserved_prefix(word) {
        Some("data_") => Token::DataKeyword(word[5..].to_string()),
        Some("save_") => Token::SaveKeyword(word[5..].to_string()),
        Some("loop_") if word.len() == 5 => Token::LoopKeyword,
        Some("global_") if word.len() == 7 => Token::GlobalKeyword,
        Some("stop_") if word.len() == 5 => Token::StopKeyword,
        _ => Token::BareValue(word.to_string()),
    }
}

const RESERVED_PREFIXES: [&str; 5] = ["data_", "save_", "loop_", "global_", "stop_"];

/// Returns the reserved prefix `word` starts with, ignoring case.
pub(crate) fn reserved_prefix(word: &str) -> Option<&'static str> {
    RESERVED_PREFIXES.into_iter().find(|prefix| {
        word.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Lexer failures; positions are attached by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum LexErrorKind {
    #[default]
    InvalidCharacter,
    UnterminatedQuote(char),
    UnterminatedTextField,
}

/// What a `;` turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Semicolon {
    /// Column 1: a text field with this content.
    TextField(String),
    /// Anywhere else: an ordinary bare value starting with `;`.
    Bare(String),
}

/// Raw lexemes matched by logos. Keywords are told apart from values
/// afterwards by [`classify_word`].
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub(crate) enum RawToken {
    #[regex(r"_[^ \t\r\n\f]*")]
    Tag,

    #[token("'", |lex| quoted(lex, '\''))]
    SingleQuoted(String),

    #[token("\"", |lex| quoted(lex, '"'))]
    DoubleQuoted(String),

    #[token(";", semicolon)]
    Semicolon(Semicolon),

    #[regex(r#"[^ \t\r\n\f'";#_][^ \t\r\n\f]*"#)]
    Word,
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0c')
}

/// Scans for the first `quote` followed by whitespace or end of line.
/// Other occurrences of the quote character are literal.
fn quoted(lex: &mut Lexer<RawToken>, quote: char) -> Result<String, LexErrorKind> {
    let rest = lex.remainder();
    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\n' {
            break;
        }
        if c == quote && chars.peek().map_or(true, |&(_, next)| is_separator(next)) {
            let text = rest[..i].to_string();
            lex.bump(i + c.len_utf8());
            return Ok(text);
        }
    }
    Err(LexErrorKind::UnterminatedQuote(quote))
}

/// A `;` in column 1 opens a text field that runs to the next line
/// starting with `;`. Elsewhere it starts a bare word.
fn semicolon(lex: &mut Lexer<RawToken>) -> Result<Semicolon, LexErrorKind> {
    let start = lex.span().start;
    let at_line_start = start == 0 || lex.source().as_bytes()[start - 1] == b'\n';
    let rest = lex.remainder();

    if !at_line_start {
        let end = rest.find(is_separator).unwrap_or(rest.len());
        let word = format!(";{}", &rest[..end]);
        lex.bump(end);
        return Ok(Semicolon::Bare(word));
    }

    let Some(end) = rest.find("\n;") else {
        return Err(LexErrorKind::UnterminatedTextField);
    };
    let content = rest[..end]
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .collect::<Vec<_>>()
        .join("\n");
    lex.bump(end + 2);
    Ok(Semicolon::TextField(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<RawToken> {
        RawToken::lexer(input)
            .map(|r| r.expect("lex error"))
            .collect()
    }

    #[test]
    fn tags_and_words() {
        let tokens = lex("_cell.length_a 50.0 loop_");
        assert_eq!(tokens, vec![RawToken::Tag, RawToken::Word, RawToken::Word]);
    }

    #[test]
    fn comments_skipped() {
        let tokens = lex("# header comment\n_entry.id 1ABC # trailing\n");
        assert_eq!(tokens, vec![RawToken::Tag, RawToken::Word]);
    }

    #[test]
    fn hash_inside_word_is_literal() {
        let mut lexer = RawToken::lexer("C#1 x");
        assert_eq!(lexer.next(), Some(Ok(RawToken::Word)));
        assert_eq!(lexer.slice(), "C#1");
    }

    #[test]
    fn quote_closes_only_before_whitespace() {
        let tokens = lex("'it's fine' \"say \"hi\"\"");
        assert_eq!(
            tokens,
            vec![
                RawToken::SingleQuoted("it's fine".into()),
                RawToken::DoubleQuoted("say \"hi\"".into()),
            ]
        );
    }

    #[test]
    fn quote_closes_at_end_of_line() {
        let tokens = lex("'O5''\n_a.b");
        assert_eq!(
            tokens,
            vec![RawToken::SingleQuoted("O5'".into()), RawToken::Tag]
        );
    }

    #[test]
    fn unterminated_quote() {
        let mut lexer = RawToken::lexer("'never closed\n'x'");
        assert_eq!(
            lexer.next(),
            Some(Err(LexErrorKind::UnterminatedQuote('\'')))
        );
    }

    #[test]
    fn text_field_in_column_one() {
        let tokens = lex(";line one\nline two\n;\n");
        assert_eq!(
            tokens,
            vec![RawToken::Semicolon(Semicolon::TextField(
                "line one\nline two".into()
            ))]
        );
    }

    #[test]
    fn text_field_with_crlf() {
        let tokens = lex(";a\r\nb\r\n;\r\n");
        assert_eq!(
            tokens,
            vec![RawToken::Semicolon(Semicolon::TextField("a\nb".into()))]
        );
    }

    #[test]
    fn text_field_drops_every_carriage_return_before_a_break() {
        let tokens = lex(";a\r\r\nb\rc\r\r\n;\n");
        assert_eq!(
            tokens,
            vec![RawToken::Semicolon(Semicolon::TextField("a\nb\rc".into()))]
        );
    }

    #[test]
    fn text_field_closing_line_continues() {
        let tokens = lex(";text\n; next");
        assert_eq!(
            tokens,
            vec![
                RawToken::Semicolon(Semicolon::TextField("text".into())),
                RawToken::Word,
            ]
        );
    }

    #[test]
    fn semicolon_mid_line_is_bare() {
        let tokens = lex("a ;b c");
        assert_eq!(
            tokens,
            vec![
                RawToken::Word,
                RawToken::Semicolon(Semicolon::Bare(";b".into())),
                RawToken::Word,
            ]
        );
    }

    #[test]
    fn unterminated_text_field() {
        let mut lexer = RawToken::lexer(";no end\nstill none\n");
        assert_eq!(
            lexer.next(),
            Some(Err(LexErrorKind::UnterminatedTextField))
        );
    }

    #[test]
    fn keyword_classification() {
        assert_eq!(classify_word("loop_"), Token::LoopKeyword);
        assert_eq!(classify_word("LOOP_"), Token::LoopKeyword);
        assert_eq!(classify_word("data_1ABC"), Token::DataKeyword("1ABC".into()));
        assert_eq!(classify_word("Data_x"), Token::DataKeyword("x".into()));
        assert_eq!(classify_word("save_"), Token::SaveKeyword(String::new()));
        assert_eq!(classify_word("save_frame"), Token::SaveKeyword("frame".into()));
        assert_eq!(classify_word("global_"), Token::GlobalKeyword);
        assert_eq!(classify_word("stop_"), Token::StopKeyword);
        assert_eq!(classify_word("loop_x"), Token::BareValue("loop_x".into()));
        assert_eq!(classify_word("dat"), Token::BareValue("dat".into()));
    }

    #[test]
    fn reserved_prefixes() {
        assert_eq!(reserved_prefix("DATA_abc"), Some("data_"));
        assert_eq!(reserved_prefix("stop_it"), Some("stop_"));
        assert_eq!(reserved_prefix("loops"), None);
        assert_eq!(reserved_prefix("é"), None);
    }

    #[test]
    fn description_is_human_readable() {
        assert_eq!(Token::LoopKeyword.description(), "'loop_'");
        assert_eq!(Token::SaveKeyword(String::new()).description(), "save_ terminator");
        assert_eq!(Token::EndOfInput.to_string(), "end of input");
        assert!(Token::TextField(String::new()).is_value());
        assert!(!Token::StopKeyword.is_value());
    }
}
