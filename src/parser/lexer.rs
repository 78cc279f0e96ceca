//! Lexer (tokenizer) for HypnoScript source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! The lexer never fails: unterminated strings and block comments run to the end
//! of input, and characters that start no token are dropped.
//!
//! Hypnotic operator synonyms (`youAreFeelingVerySleepy`, `lookAtTheWatch`, ...)
//! are recognized here as keywords and lexed into dedicated kinds so the parser
//! can fold them onto the canonical operators.

use super::ast::SourceLocation;
use std::fmt;
use tracing::trace;

/// Closed set of token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Number,
    String,
    True,
    False,

    Identifier,

    // Program bracket and top-level
    Focus,
    Relax,
    Entrance,
    MindLink,

    // Declarations
    Induce,
    From,
    External,
    Suggestion,
    Imperative,
    Dominant,
    Session,
    Constructor,
    Expose,
    Conceal,
    Tranceify,

    // Statements
    If,
    Else,
    While,
    Loop,
    Snap,
    Sink,
    SinkTo,
    Label,
    Awaken,
    Observe,
    Assert,

    // Hypnotic operator synonyms
    YouAreFeelingVerySleepy, // ==
    NotSoDeep,               // !=
    LookAtTheWatch,          // >
    FallUnderMySpell,        // <
    DeeplyGreater,           // >=
    DeeplyLess,              // <=

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    Assign,

    // Punctuation
    Dot,
    Colon,
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Eof,
}

impl TokenKind {
    /// Keyword table lookup; `None` means the word stays an identifier.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "Focus" => TokenKind::Focus,
            "Relax" => TokenKind::Relax,
            "entrance" => TokenKind::Entrance,
            "mindLink" => TokenKind::MindLink,
            "induce" => TokenKind::Induce,
            "from" => TokenKind::From,
            "external" => TokenKind::External,
            "suggestion" => TokenKind::Suggestion,
            "imperative" => TokenKind::Imperative,
            "dominant" => TokenKind::Dominant,
            "session" => TokenKind::Session,
            "constructor" => TokenKind::Constructor,
            "expose" => TokenKind::Expose,
            "conceal" => TokenKind::Conceal,
            "tranceify" => TokenKind::Tranceify,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "loop" => TokenKind::Loop,
            "snap" => TokenKind::Snap,
            "sink" => TokenKind::Sink,
            "sinkTo" => TokenKind::SinkTo,
            "label" => TokenKind::Label,
            "awaken" => TokenKind::Awaken,
            "observe" => TokenKind::Observe,
            "assert" => TokenKind::Assert,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "youAreFeelingVerySleepy" => TokenKind::YouAreFeelingVerySleepy,
            "notSoDeep" => TokenKind::NotSoDeep,
            "lookAtTheWatch" => TokenKind::LookAtTheWatch,
            "fallUnderMySpell" => TokenKind::FallUnderMySpell,
            "deeplyGreater" => TokenKind::DeeplyGreater,
            "deeplyLess" => TokenKind::DeeplyLess,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number => "number literal",
            TokenKind::String => "string literal",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Identifier => "identifier",
            TokenKind::Focus => "'Focus'",
            TokenKind::Relax => "'Relax'",
            TokenKind::Entrance => "'entrance'",
            TokenKind::MindLink => "'mindLink'",
            TokenKind::Induce => "'induce'",
            TokenKind::From => "'from'",
            TokenKind::External => "'external'",
            TokenKind::Suggestion => "'suggestion'",
            TokenKind::Imperative => "'imperative'",
            TokenKind::Dominant => "'dominant'",
            TokenKind::Session => "'session'",
            TokenKind::Constructor => "'constructor'",
            TokenKind::Expose => "'expose'",
            TokenKind::Conceal => "'conceal'",
            TokenKind::Tranceify => "'tranceify'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::Loop => "'loop'",
            TokenKind::Snap => "'snap'",
            TokenKind::Sink => "'sink'",
            TokenKind::SinkTo => "'sinkTo'",
            TokenKind::Label => "'label'",
            TokenKind::Awaken => "'awaken'",
            TokenKind::Observe => "'observe'",
            TokenKind::Assert => "'assert'",
            TokenKind::YouAreFeelingVerySleepy => "'youAreFeelingVerySleepy'",
            TokenKind::NotSoDeep => "'notSoDeep'",
            TokenKind::LookAtTheWatch => "'lookAtTheWatch'",
            TokenKind::FallUnderMySpell => "'fallUnderMySpell'",
            TokenKind::DeeplyGreater => "'deeplyGreater'",
            TokenKind::DeeplyLess => "'deeplyLess'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Assign => "'='",
            TokenKind::Dot => "'.'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}

/// A single lexed token.
///
/// `lexeme` holds the literal text for identifiers and numbers, and the
/// unescaped contents for strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier '{}'", self.lexeme),
            TokenKind::Number => write!(f, "number literal {}", self.lexeme),
            TokenKind::String => write!(f, "string literal \"{}\"", self.lexeme),
            kind => write!(f, "{}", kind),
        }
    }
}

/// Lex a whole source buffer.
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

/// Lexer for HypnoScript source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input. The result always ends with [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "", self.current_location()));
                break;
            }

            if let Some(token) = self.next_token() {
                trace!(kind = ?token.kind, lexeme = %token.lexeme, line = token.location.line, "token");
                tokens.push(token);
            }
        }

        tokens
    }

    /// Lex one token starting at the current position, or drop one character.
    fn next_token(&mut self) -> Option<Token> {
        let loc = self.current_location();
        let ch = self.advance()?;

        let simple = |kind: TokenKind| Some(Token::new(kind, ch.to_string(), loc));

        match ch {
            '"' => Some(self.string_literal(loc)),
            '0'..='9' => Some(self.number_literal(ch, loc)),
            c if c.is_alphabetic() || c == '_' => Some(self.identifier_or_keyword(ch, loc)),

            '=' => Some(self.one_or_two('=', TokenKind::Assign, TokenKind::EqEq, loc)),
            '!' => Some(self.one_or_two('!', TokenKind::Bang, TokenKind::NotEq, loc)),
            '<' => Some(self.one_or_two('<', TokenKind::Lt, TokenKind::Le, loc)),
            '>' => Some(self.one_or_two('>', TokenKind::Gt, TokenKind::Ge, loc)),
            '&' => self.doubled('&', TokenKind::AndAnd, loc),
            '|' => self.doubled('|', TokenKind::OrOr, loc),

            '+' => simple(TokenKind::Plus),
            '-' => simple(TokenKind::Minus),
            '*' => simple(TokenKind::Star),
            '/' => simple(TokenKind::Slash),
            '%' => simple(TokenKind::Percent),
            '.' => simple(TokenKind::Dot),
            ':' => simple(TokenKind::Colon),
            ',' => simple(TokenKind::Comma),
            ';' => simple(TokenKind::Semicolon),
            '(' => simple(TokenKind::LParen),
            ')' => simple(TokenKind::RParen),
            '{' => simple(TokenKind::LBrace),
            '}' => simple(TokenKind::RBrace),
            '[' => simple(TokenKind::LBracket),
            ']' => simple(TokenKind::RBracket),

            _ => {
                trace!(character = %ch, line = loc.line, column = loc.column, "dropping character");
                None
            }
        }
    }

    /// `first` already consumed; take a following `=` greedily.
    fn one_or_two(
        &mut self,
        first: char,
        single: TokenKind,
        double: TokenKind,
        loc: SourceLocation,
    ) -> Token {
        if self.peek() == Some('=') {
            self.advance();
            Token::new(double, format!("{}=", first), loc)
        } else {
            Token::new(single, first.to_string(), loc)
        }
    }

    /// `&&` and `||` have no single-character form; a lone one is dropped.
    fn doubled(&mut self, ch: char, kind: TokenKind, loc: SourceLocation) -> Option<Token> {
        if self.peek() == Some(ch) {
            self.advance();
            Some(Token::new(kind, format!("{}{}", ch, ch), loc))
        } else {
            None
        }
    }

    /// Parse string literal; the opening quote is already consumed.
    fn string_literal(&mut self, loc: SourceLocation) -> Token {
        let mut string = String::new();

        while let Some(ch) = self.advance() {
            match ch {
                '"' => break,
                '\\' => match self.advance() {
                    Some('n') => string.push('\n'),
                    Some('t') => string.push('\t'),
                    Some('r') => string.push('\r'),
                    Some('"') => string.push('"'),
                    Some('\\') => string.push('\\'),
                    Some(other) => {
                        string.push('\\');
                        string.push(other);
                    }
                    None => string.push('\\'),
                },
                _ => string.push(ch),
            }
        }

        Token::new(TokenKind::String, string, loc)
    }

    /// Parse numeric literal. At most one decimal point is taken.
    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Token {
        let mut text = String::new();
        text.push(first_digit);
        let mut seen_dot = false;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::new(TokenKind::Number, text, loc)
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword(&ident).unwrap_or(TokenKind::Identifier);
        Token::new(kind, ident, loc)
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek_ahead(1) == Some('*') => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment (/* ... */); unterminated runs to end of input
    fn skip_block_comment(&mut self) {
        self.advance(); // '/'
        self.advance(); // '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return;
            }
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character, tracking line and column
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_program_bracket() {
        let tokens = lex("Focus induce x = 2 + 3; observe x; Relax");

        assert!(matches!(tokens[0].kind, TokenKind::Focus));
        assert!(matches!(tokens[1].kind, TokenKind::Induce));
        assert!(tokens[2].kind == TokenKind::Identifier && tokens[2].lexeme == "x");
        assert!(matches!(tokens[3].kind, TokenKind::Assign));
        assert!(tokens[4].kind == TokenKind::Number && tokens[4].lexeme == "2");
        assert!(matches!(tokens[5].kind, TokenKind::Plus));
        assert!(matches!(tokens[7].kind, TokenKind::Semicolon));
        assert!(matches!(tokens[8].kind, TokenKind::Observe));
        assert!(matches!(tokens[11].kind, TokenKind::Relax));
        assert!(matches!(tokens[12].kind, TokenKind::Eof));
        assert_eq!(tokens.len(), 13);
    }

    #[test]
    fn test_operators_greedy() {
        assert_eq!(
            kinds("== != >= <= && || = ! < >"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Ge,
                TokenKind::Le,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Assign,
                TokenKind::Bang,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_synonyms_are_keywords() {
        assert_eq!(
            kinds("youAreFeelingVerySleepy lookAtTheWatch fallUnderMySpell notSoDeep"),
            vec![
                TokenKind::YouAreFeelingVerySleepy,
                TokenKind::LookAtTheWatch,
                TokenKind::FallUnderMySpell,
                TokenKind::NotSoDeep,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_with_two_dots_truncates() {
        let tokens = lex("1.2.3");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "1.2");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].lexeme, "3");
    }

    #[test]
    fn test_comments() {
        let tokens = lex("induce x; // comment\ninduce y; /* block\ncomment */ induce z;");
        let idents: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(idents, vec!["x", "y", "z"]);
        assert_eq!(tokens[6].location.line, 3);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = lex(r#""hello\n\"world\"""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "hello\n\"world\"");
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let tokens = lex("\"never closed ;");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, "never closed ;");
        assert!(matches!(tokens[1].kind, TokenKind::Eof));
    }

    #[test]
    fn test_unknown_characters_dropped() {
        assert_eq!(
            kinds("a @ # & | b"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_locations() {
        let tokens = lex("Focus\n  induce");
        assert_eq!(tokens[0].location, SourceLocation::new(1, 1));
        assert_eq!(tokens[1].location, SourceLocation::new(2, 3));
    }

    #[test]
    fn test_unicode_identifier() {
        let tokens = lex("induce größe = 1;");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "größe");
    }
}
