//! 画布命令的词法分析器

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// 读取引号包围的字符串字面量
    /// 注意：开始的引号已经被调用者消费；未闭合时读到输入末尾
    fn read_quoted(&mut self, start: usize, quote: char) -> Token<'a> {
        let content_start = self.position;
        while let Some(c) = self.peek() {
            if c == quote {
                break;
            }
            self.bump();
        }
        let content_end = self.position;
        self.bump(); // 消费结束引号

        Token {
            kind: TokenKind::Quoted(&self.input[content_start..content_end]),
            span: Span::new(start, self.position),
        }
    }

    /// 读取一个单词（字段名、值、命令或关键字）
    /// 单词在空白、逗号或比较运算符处结束；单词内部的引号（如 O'Brien）属于单词本身
    fn read_word(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || is_separator(c) {
                break;
            }
            self.bump();
        }
        let literal = &self.input[start..self.position];
        Token {
            kind: match_keyword(literal),
            span: Span::new(start, self.position),
        }
    }

    fn single(&self, kind: TokenKind<'a>, start: usize) -> Token<'a> {
        Token {
            kind,
            span: Span::new(start, self.position),
        }
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | '=' | '!' | '<' | '>')
}

fn match_keyword(s: &str) -> TokenKind {
    match s.to_ascii_lowercase().as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "like" => TokenKind::Like,
        "in" => TokenKind::In,
        "includes" => TokenKind::Includes,
        "excludes" => TokenKind::Excludes,
        "asc" => TokenKind::Asc,
        "desc" => TokenKind::Desc,
        _ => TokenKind::Word(s),
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.position;

        let Some(c) = self.bump() else {
            return None; // 到达输入末尾
        };

        let token = match c {
            ',' => self.single(TokenKind::Comma, start),
            '=' => self.single(TokenKind::Eq, start),
            '<' => {
                if self.peek() == Some('=') {
                    self.bump();
                    self.single(TokenKind::Lte, start)
                } else {
                    self.single(TokenKind::Lt, start)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.bump();
                    self.single(TokenKind::Gte, start)
                } else {
                    self.single(TokenKind::Gt, start)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.bump();
                    self.single(TokenKind::NotEq, start)
                } else {
                    self.single(TokenKind::Illegal, start)
                }
            }
            '"' | '\'' => self.read_quoted(start, c),
            _ => self.read_word(start),
        };
        Some(token)
    }
}
