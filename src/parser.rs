//! 画布命令的语法分析器
//!
//! ## 命令语法
//!
//! ```text
//! objects                                  列出目录中的对象
//! object <Name>                            选择对象（重置画布）
//! fields                                   列出字段及其可用运算符
//! select <f1>, <f2>, ...                   设置查询字段
//! where <field> <op> <value>               添加根条件（非首个时以 AND 连接）
//! and|or|not <field> <op> <value>          以指定逻辑运算符添加根条件
//! group [and|or|not]                       添加空分组
//! into <groupId> [and|or|not] <field> <op> <value>
//! join <id> and|or|not                     修改连接运算符
//! remove <id>                              删除节点
//! order <field> [asc|desc], ... | none     设置 ORDER BY
//! limit <n> | none                         设置 LIMIT
//! clear | show | tree | help | quit
//! save <name>                              输出保存的查询记录
//! ```
//!
//! ## 运算符
//!
//! `=`, `!=`, `>`, `<`, `>=`, `<=`, `LIKE`, `IN`, `NOT IN`, `INCLUDES`, `EXCLUDES`
//!
//! ## 值
//!
//! 运算符之后的整行剩余文本即为原始值，例如 `in Tech, Retail`。
//! 若值仅为一个带引号的字符串（`"O'Brien"`），则先去掉引号。

use crate::ast::{LogicalOperator, Operator, OrderBy, SortDirection};
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};
use thiserror::Error;

/// 一条解析后的画布命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Objects,
    Object(String),
    Fields,
    Select(Vec<String>),
    Add {
        join: LogicalOperator,
        condition: ConditionInput,
    },
    Group(LogicalOperator),
    Into {
        group_id: String,
        join: LogicalOperator,
        condition: ConditionInput,
    },
    Join {
        id: String,
        join: LogicalOperator,
    },
    Remove(String),
    Order(Vec<OrderBy>),
    Limit(Option<u32>),
    Clear,
    Show,
    Tree,
    Save(String),
    Help,
    Quit,
}

/// 用户输入的条件，值尚未格式化
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionInput {
    pub field: String,
    pub operator: Operator,
    pub raw_value: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    fn new(message: String, span: Option<Span>) -> Self {
        Self { message, span }
    }

    fn at_position(message: String, span: Span) -> Self {
        Self {
            message,
            span: Some(span),
        }
    }
}

/// 对一行输入进行分词并解析为命令
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let tokens: Vec<_> = Lexer::new(input).collect();
    Parser::new(input, &tokens).parse()
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token<'a>],
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: &'a [Token<'a>]) -> Self {
        Self {
            source,
            tokens,
            position: 0,
        }
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.position)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&'a Token<'a>> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// 检查当前 token 是否匹配给定类型
    fn match_token(&self, kind: &TokenKind) -> bool {
        if let Some(token) = self.peek() {
            std::mem::discriminant(&token.kind) == std::mem::discriminant(kind)
        } else {
            false
        }
    }

    /// 期望输入已结束
    fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ParseError::at_position(
                format!("Unexpected trailing input: {:?}", token.kind),
                token.span,
            )),
        }
    }

    pub fn parse(&mut self) -> Result<Command, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::new("Empty command".to_string(), None));
        };

        let command = match &token.kind {
            TokenKind::And => self.parse_add(LogicalOperator::And)?,
            TokenKind::Or => self.parse_add(LogicalOperator::Or)?,
            TokenKind::Not => self.parse_add(LogicalOperator::Not)?,
            TokenKind::Word(word) => match word.to_ascii_lowercase().as_str() {
                "objects" => Command::Objects,
                "object" => Command::Object(self.parse_name()?),
                "fields" => Command::Fields,
                "select" => Command::Select(self.parse_name_list()?),
                "where" => self.parse_add(LogicalOperator::And)?,
                "group" => Command::Group(self.parse_optional_join()?.unwrap_or_default()),
                "into" => {
                    let group_id = self.parse_name()?;
                    let join = self.parse_optional_join()?.unwrap_or_default();
                    let condition = self.parse_condition()?;
                    return Ok(Command::Into {
                        group_id,
                        join,
                        condition,
                    });
                }
                "join" => {
                    let id = self.parse_name()?;
                    let join = self.parse_optional_join()?.ok_or_else(|| {
                        ParseError::new("Expected AND, OR or NOT".to_string(), None)
                    })?;
                    Command::Join { id, join }
                }
                "remove" => Command::Remove(self.parse_name()?),
                "order" => Command::Order(self.parse_order()?),
                "limit" => Command::Limit(self.parse_limit()?),
                "clear" => Command::Clear,
                "show" => Command::Show,
                "tree" => Command::Tree,
                "save" => return Ok(Command::Save(self.parse_rest("Expected a name to save under")?)),
                "help" => Command::Help,
                "quit" | "exit" => Command::Quit,
                _ => {
                    return Err(ParseError::at_position(
                        format!("Unknown command: {}", word),
                        token.span,
                    ))
                }
            },
            other => {
                return Err(ParseError::at_position(
                    format!("Unexpected token: {:?}", other),
                    token.span,
                ))
            }
        };

        self.expect_end()?;
        Ok(command)
    }

    /// 条件占据行尾，无需再检查剩余输入
    fn parse_add(&mut self, join: LogicalOperator) -> Result<Command, ParseError> {
        let condition = self.parse_condition()?;
        Ok(Command::Add { join, condition })
    }

    fn parse_name(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Word(name) | TokenKind::Quoted(name),
                ..
            }) => Ok(name.to_string()),
            Some(token) => Err(ParseError::at_position(
                format!("Expected a name, found {:?}", token.kind),
                token.span,
            )),
            None => Err(ParseError::new(
                "Expected a name, but reached end of input".to_string(),
                None,
            )),
        }
    }

    /// 解析逗号分隔的名称列表
    fn parse_name_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.parse_name()?];
        while self.match_token(&TokenKind::Comma) {
            self.advance(); // 消费逗号
            names.push(self.parse_name()?);
        }
        Ok(names)
    }

    fn parse_optional_join(&mut self) -> Result<Option<LogicalOperator>, ParseError> {
        let join = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::And) => LogicalOperator::And,
            Some(TokenKind::Or) => LogicalOperator::Or,
            Some(TokenKind::Not) => LogicalOperator::Not,
            _ => return Ok(None),
        };
        self.advance();
        Ok(Some(join))
    }

    /// 解析 `<field> <op> <value>`
    fn parse_condition(&mut self) -> Result<ConditionInput, ParseError> {
        let field = self.parse_name()?;
        let operator = self.parse_operator()?;
        let raw_value = self.parse_rest("Expected a value")?;
        Ok(ConditionInput {
            field,
            operator,
            raw_value,
        })
    }

    fn parse_operator(&mut self) -> Result<Operator, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::new("Expected comparison operator".to_string(), None));
        };
        let op = match &token.kind {
            TokenKind::Eq => Operator::Eq,
            TokenKind::NotEq => Operator::NotEq,
            TokenKind::Gt => Operator::Gt,
            TokenKind::Lt => Operator::Lt,
            TokenKind::Gte => Operator::Gte,
            TokenKind::Lte => Operator::Lte,
            TokenKind::Like => Operator::Like,
            TokenKind::In => Operator::In,
            TokenKind::Includes => Operator::Includes,
            TokenKind::Excludes => Operator::Excludes,
            TokenKind::Not if self.match_token(&TokenKind::In) => {
                self.advance(); // 消费 IN
                Operator::NotIn
            }
            other => {
                return Err(ParseError::at_position(
                    format!("Expected comparison operator, found {:?}", other),
                    token.span,
                ))
            }
        };
        Ok(op)
    }

    /// 取剩余的原始文本；单个带引号的 token 取其内容
    fn parse_rest(&mut self, missing: &str) -> Result<String, ParseError> {
        let rest = &self.tokens[self.position..];
        self.position = self.tokens.len();
        match rest {
            [] => Err(ParseError::new(missing.to_string(), None)),
            [Token {
                kind: TokenKind::Quoted(content),
                ..
            }] => Ok(content.to_string()),
            [first, ..] => Ok(self.source[first.span.start..].trim_end().to_string()),
        }
    }

    fn parse_order(&mut self) -> Result<Vec<OrderBy>, ParseError> {
        if let Some(Token {
            kind: TokenKind::Word(word),
            ..
        }) = self.peek()
        {
            if word.eq_ignore_ascii_case("none") {
                self.advance();
                return Ok(Vec::new());
            }
        }

        let mut entries = Vec::new();
        loop {
            let field = self.parse_name()?;
            let direction = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Asc) => {
                    self.advance();
                    SortDirection::Asc
                }
                Some(TokenKind::Desc) => {
                    self.advance();
                    SortDirection::Desc
                }
                _ => SortDirection::Asc,
            };
            entries.push(OrderBy { field, direction });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            self.advance(); // 消费逗号
        }
        Ok(entries)
    }

    fn parse_limit(&mut self) -> Result<Option<u32>, ParseError> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Word(word),
                span,
            }) => {
                if word.eq_ignore_ascii_case("none") {
                    return Ok(None);
                }
                word.parse::<u32>().map(Some).map_err(|_| {
                    ParseError::at_position(format!("Expected a number, found {}", word), *span)
                })
            }
            Some(token) => Err(ParseError::at_position(
                format!("Expected a number, found {:?}", token.kind),
                token.span,
            )),
            None => Err(ParseError::new("Expected a number".to_string(), None)),
        }
    }
}
