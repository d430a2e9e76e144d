//! A small C preprocessor, enough to check generated kernel sources on the host.
//!
//! It understands `#define` (object-like and function-like), `#undef`, `#ifdef`, `#ifndef`,
//! `#else`, `#endif`, `#warning`, `#error`, `#pragma` and `#include` of registered headers.
//! Macro arguments are fully expanded before substitution unless they are operands of `##`, and
//! a macro is never expanded inside its own expansion. `#if` and `#elif` are not supported.

use std::collections::HashMap;

use thiserror::Error;

const MAX_INCLUDE_DEPTH: usize = 32;

/// An error raised while preprocessing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreprocessError {
    #[error("line {line}: unterminated conditional")]
    UnterminatedConditional { line: usize },

    #[error("line {line}: #{directive} without a matching #ifdef")]
    UnmatchedConditional { line: usize, directive: String },

    #[error("line {line}: #error {message}")]
    ErrorDirective { line: usize, message: String },

    #[error("line {line}: `{name}` redefined with a different body")]
    Redefinition { line: usize, name: String },

    #[error("line {line}: malformed #{directive}")]
    Malformed { line: usize, directive: String },

    #[error("line {line}: #{directive} is not supported")]
    Unsupported { line: usize, directive: String },

    #[error("unknown include \"{0}\"")]
    UnknownInclude(String),

    #[error("includes nested deeper than 32 levels")]
    IncludeDepth,

    #[error("macro `{name}` expects {expected} arguments, {found} given")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("unterminated invocation of macro `{0}`")]
    UnterminatedInvocation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Literal(String),
    Punct(String),
    /// Whitespace as written, so indentation survives.
    Space(String),
    Newline,
}

impl Token {
    fn text(&self) -> &str {
        match self {
            Token::Ident(text) | Token::Literal(text) | Token::Punct(text) | Token::Space(text) => {
                text
            }
            Token::Newline => "\n",
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Token::Space(_) | Token::Newline)
    }

    fn is_punct(&self, punct: &str) -> bool {
        matches!(self, Token::Punct(text) if text == punct)
    }
}

#[derive(Debug, Clone)]
struct Macro {
    params: Option<Vec<String>>,
    body: Vec<Token>,
}

impl Macro {
    /// Same parameters and same body, whitespace aside.
    fn same_as(&self, other: &Macro) -> bool {
        self.params == other.params && normalize(&self.body) == normalize(&other.body)
    }
}

fn normalize(tokens: &[Token]) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.is_blank() {
            if !out.last().is_some_and(Token::is_blank) {
                out.push(Token::Space(" ".into()));
            }
        } else {
            out.push(token.clone());
        }
    }
    out
}

fn trim(tokens: &[Token]) -> Vec<Token> {
    let start = tokens.iter().position(|token| !token.is_blank());
    let end = tokens.iter().rposition(|token| !token.is_blank());

    match (start, end) {
        (Some(start), Some(end)) => tokens[start..=end].to_vec(),
        _ => Vec::new(),
    }
}

fn render(tokens: &[Token]) -> String {
    tokens.iter().map(Token::text).collect()
}

fn tokenize(text: &str) -> Vec<Token> {
    let chars = text.chars().collect::<Vec<_>>();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c == '\n' {
            tokens.push(Token::Newline);
            i += 1;
        } else if c.is_whitespace() {
            while i < chars.len() && chars[i].is_whitespace() && chars[i] != '\n' {
                i += 1;
            }
            tokens.push(Token::Space(chars[start..i].iter().collect()));
        } else if c.is_ascii_alphabetic() || c == '_' {
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else if c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit))
        {
            i += 1;
            while i < chars.len() {
                let d = chars[i];
                let exponent_sign =
                    (d == '+' || d == '-') && matches!(chars[i - 1], 'e' | 'E' | 'p' | 'P');
                if d.is_ascii_alphanumeric() || d == '.' || d == '_' || exponent_sign {
                    i += 1;
                } else {
                    break;
                }
            }
            tokens.push(Token::Literal(chars[start..i].iter().collect()));
        } else if c == '"' || c == '\'' {
            i += 1;
            while i < chars.len() && chars[i] != c && chars[i] != '\n' {
                if chars[i] == '\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(chars.len());
            tokens.push(Token::Literal(chars[start..i].iter().collect()));
        } else if c == '#' && chars.get(i + 1) == Some(&'#') {
            tokens.push(Token::Punct("##".into()));
            i += 2;
        } else {
            tokens.push(Token::Punct(c.to_string()));
            i += 1;
        }
    }

    tokens
}

/// Replaces comments with a space, keeping the newlines of block comments.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q || c == '\n' {
                quote = None;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('/', Some('/')) => {
                while chars.peek().is_some_and(|c| *c != '\n') {
                    chars.next();
                }
                out.push(' ');
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            ('"' | '\'', _) => {
                quote = Some(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

/// Splits into logical lines, joining backslash continuations, with 1-based line numbers.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (index, line) in text.lines().enumerate() {
        let (number, mut buffer) = current.take().unwrap_or((index + 1, String::new()));

        match line.strip_suffix('\\') {
            Some(continued) => {
                buffer.push_str(continued);
                current = Some((number, buffer));
            }
            None => {
                buffer.push_str(line);
                lines.push((number, buffer));
            }
        }
    }

    if let Some(last) = current {
        lines.push(last);
    }

    lines
}

fn leading_ident(text: &str) -> &str {
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        return "";
    }

    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());

    &text[..end]
}

#[derive(Debug, Clone, Default)]
struct MacroTable {
    macros: HashMap<String, Macro>,
}

impl MacroTable {
    fn expand(
        &self,
        tokens: &[Token],
        disabled: &mut Vec<String>,
    ) -> Result<Vec<Token>, PreprocessError> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            let Token::Ident(name) = token else {
                out.push(token.clone());
                i += 1;
                continue;
            };
            let Some(mac) = self.macros.get(name).filter(|_| !disabled.contains(name)) else {
                out.push(token.clone());
                i += 1;
                continue;
            };

            let (replacement, next) = match &mac.params {
                None => (paste(&mac.body), i + 1),
                Some(params) => {
                    let mut open = i + 1;
                    while open < tokens.len() && tokens[open].is_blank() {
                        open += 1;
                    }
                    if !tokens.get(open).is_some_and(|token| token.is_punct("(")) {
                        // A function-like macro name without arguments stays as is.
                        out.push(token.clone());
                        i += 1;
                        continue;
                    }

                    let (mut args, next) = collect_args(tokens, open, name)?;
                    if params.is_empty() && args.len() == 1 && args[0].is_empty() {
                        args.clear();
                    }
                    if args.len() != params.len() {
                        return Err(PreprocessError::Arity {
                            name: name.clone(),
                            expected: params.len(),
                            found: args.len(),
                        });
                    }

                    let substituted = self.substitute(&mac.body, params, &args, disabled)?;
                    (paste(&substituted), next)
                }
            };

            disabled.push(name.clone());
            let expanded = self.expand(&replacement, disabled);
            disabled.pop();

            out.extend(expanded?);
            i = next;
        }

        Ok(out)
    }

    fn substitute(
        &self,
        body: &[Token],
        params: &[String],
        args: &[Vec<Token>],
        disabled: &mut Vec<String>,
    ) -> Result<Vec<Token>, PreprocessError> {
        let param_index = |token: &Token| match token {
            Token::Ident(name) => params.iter().position(|param| param == name),
            _ => None,
        };
        let mut out = Vec::with_capacity(body.len());
        let mut i = 0;

        while i < body.len() {
            let token = &body[i];

            if token.is_punct("#") {
                let mut next = i + 1;
                while next < body.len() && body[next].is_blank() {
                    next += 1;
                }
                if let Some(index) = body.get(next).and_then(param_index) {
                    let text = render(&normalize(&args[index]));
                    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
                    out.push(Token::Literal(format!("\"{escaped}\"")));
                    i = next + 1;
                    continue;
                }
            }

            match param_index(token) {
                Some(index) if is_paste_operand(body, i) => out.extend(args[index].iter().cloned()),
                Some(index) => out.extend(self.expand(&args[index], disabled)?),
                None => out.push(token.clone()),
            }
            i += 1;
        }

        Ok(out)
    }
}

/// Splits the arguments of the invocation whose `(` is at `open`.
///
/// Returns the trimmed arguments and the index right after the closing `)`.
fn collect_args(
    tokens: &[Token],
    open: usize,
    name: &str,
) -> Result<(Vec<Vec<Token>>, usize), PreprocessError> {
    let mut args = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;

    for (index, token) in tokens.iter().enumerate().skip(open + 1) {
        if token.is_punct("(") {
            depth += 1;
        } else if token.is_punct(")") {
            if depth == 0 {
                args.push(trim(&current));
                return Ok((args, index + 1));
            }
            depth -= 1;
        } else if token.is_punct(",") && depth == 0 {
            args.push(trim(&current));
            current.clear();
            continue;
        }

        current.push(token.clone());
    }

    Err(PreprocessError::UnterminatedInvocation(name.to_string()))
}

fn is_paste_operand(body: &[Token], index: usize) -> bool {
    let before = body[..index].iter().rev().find(|token| !token.is_blank());
    let after = body[index + 1..].iter().find(|token| !token.is_blank());

    let is_paste = |token: &Token| token.is_punct("##");

    before.is_some_and(is_paste) || after.is_some_and(is_paste)
}

/// Applies the `##` operators of a replacement list.
fn paste(tokens: &[Token]) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        if !tokens[i].is_punct("##") {
            out.push(tokens[i].clone());
            i += 1;
            continue;
        }

        while out.last().is_some_and(Token::is_blank) {
            out.pop();
        }
        let left = out.pop();

        i += 1;
        while i < tokens.len() && tokens[i].is_blank() {
            i += 1;
        }
        let right = tokens.get(i).cloned();
        if right.is_some() {
            i += 1;
        }

        let mut text = left.map(|token| token.text().to_string()).unwrap_or_default();
        if let Some(right) = right {
            text.push_str(right.text());
        }
        out.extend(tokenize(&text));
    }

    out
}

#[derive(Debug)]
struct Frame {
    active: bool,
    taken: bool,
    seen_else: bool,
    line: usize,
}

/// The result of preprocessing a source.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// The expanded source, without directives and blank lines, `#pragma` and system
    /// `#include` lines excepted.
    pub output: String,
    /// The `#warning` messages, in order, without their quotes.
    pub warnings: Vec<String>,
    macros: MacroTable,
}

impl Preprocessed {
    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.macros.contains_key(name)
    }

    /// The replacement list of `name` as written, parameters excluded.
    pub fn definition(&self, name: &str) -> Option<String> {
        self.macros
            .macros
            .get(name)
            .map(|mac| render(&normalize(&mac.body)))
    }

    /// Expands `text` with the macros defined at the end of the source.
    pub fn expand(&self, text: &str) -> Result<String, PreprocessError> {
        let expanded = self.macros.expand(&tokenize(text), &mut Vec::new())?;

        Ok(render(&normalize(&expanded)).trim().to_string())
    }
}

/// Preprocesses kernel sources against a set of registered headers.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    headers: HashMap<String, String>,
    defines: Vec<(String, String)>,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `#include "name"` resolve to `content`.
    pub fn with_header(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.headers.insert(name.into(), content.into());
        self
    }

    /// Defines `name` before the source starts, like `-Dname=value`.
    pub fn with_define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.push((name.into(), value.into()));
        self
    }

    pub fn run(&self, source: &str) -> Result<Preprocessed, PreprocessError> {
        let mut state = State {
            headers: &self.headers,
            macros: MacroTable::default(),
            warnings: Vec::new(),
            output: String::new(),
        };

        for (name, value) in self.defines.iter() {
            state.define(&format!("{name} {value}"), 0)?;
        }
        state.process(source, 0)?;

        Ok(Preprocessed {
            output: state.output,
            warnings: state.warnings,
            macros: state.macros,
        })
    }
}

struct State<'a> {
    headers: &'a HashMap<String, String>,
    macros: MacroTable,
    warnings: Vec<String>,
    output: String,
}

impl State<'_> {
    fn process(&mut self, source: &str, depth: usize) -> Result<(), PreprocessError> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(PreprocessError::IncludeDepth);
        }

        let text = strip_comments(source);
        let mut frames: Vec<Frame> = Vec::new();
        let mut pending = String::new();

        for (line, content) in logical_lines(&text) {
            let active = frames.last().is_none_or(|frame| frame.active);
            let Some(directive) = content.trim_start().strip_prefix('#') else {
                if active {
                    pending.push_str(&content);
                    pending.push('\n');
                }
                continue;
            };

            self.flush(&mut pending)?;

            let directive = directive.trim_start();
            let name = leading_ident(directive);
            let rest = directive[name.len()..].trim();

            match name {
                "ifdef" | "ifndef" => {
                    let condition = if active {
                        let symbol = leading_ident(rest);
                        if symbol.is_empty() {
                            return Err(malformed(line, name));
                        }
                        let defined = self.macros.macros.contains_key(symbol);
                        if name == "ifdef" { defined } else { !defined }
                    } else {
                        false
                    };
                    frames.push(Frame {
                        active: condition,
                        // Nothing in a skipped region can become active.
                        taken: condition || !active,
                        seen_else: false,
                        line,
                    });
                }
                "if" => {
                    if active {
                        return Err(unsupported(line, name));
                    }
                    frames.push(Frame {
                        active: false,
                        taken: true,
                        seen_else: false,
                        line,
                    });
                }
                "elif" | "else" => {
                    let Some(frame) = frames.last_mut() else {
                        return Err(PreprocessError::UnmatchedConditional {
                            line,
                            directive: name.to_string(),
                        });
                    };
                    if frame.seen_else {
                        return Err(malformed(line, name));
                    }
                    if name == "elif" {
                        if !frame.taken {
                            return Err(unsupported(line, name));
                        }
                        frame.active = false;
                    } else {
                        frame.seen_else = true;
                        frame.active = !frame.taken;
                        frame.taken = true;
                    }
                }
                "endif" => {
                    if frames.pop().is_none() {
                        return Err(PreprocessError::UnmatchedConditional {
                            line,
                            directive: name.to_string(),
                        });
                    }
                }
                _ if !active => {}
                "" => {}
                "define" => self.define(rest, line)?,
                "undef" => {
                    let symbol = leading_ident(rest);
                    if symbol.is_empty() {
                        return Err(malformed(line, name));
                    }
                    self.macros.macros.remove(symbol);
                }
                "warning" => self.warnings.push(unquote(rest).to_string()),
                "error" => {
                    return Err(PreprocessError::ErrorDirective {
                        line,
                        message: unquote(rest).to_string(),
                    });
                }
                "pragma" => {
                    self.output.push_str("#pragma ");
                    self.output.push_str(rest);
                    self.output.push('\n');
                }
                "include" => self.include(rest, line, depth)?,
                other => return Err(unsupported(line, other)),
            }
        }

        self.flush(&mut pending)?;

        match frames.last() {
            Some(frame) => Err(PreprocessError::UnterminatedConditional { line: frame.line }),
            None => Ok(()),
        }
    }

    fn include(&mut self, target: &str, line: usize, depth: usize) -> Result<(), PreprocessError> {
        if let Some(name) = target.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
            let header = self
                .headers
                .get(name)
                .ok_or_else(|| PreprocessError::UnknownInclude(name.to_string()))?;
            return self.process(header, depth + 1);
        }

        if target.starts_with('<') && target.ends_with('>') {
            self.output.push_str("#include ");
            self.output.push_str(target);
            self.output.push('\n');
            return Ok(());
        }

        Err(malformed(line, "include"))
    }

    fn define(&mut self, rest: &str, line: usize) -> Result<(), PreprocessError> {
        let name = leading_ident(rest);
        if name.is_empty() {
            return Err(malformed(line, "define"));
        }

        let after = &rest[name.len()..];
        let (params, body) = match after.strip_prefix('(') {
            Some(list) => {
                let close = list.find(')').ok_or_else(|| malformed(line, "define"))?;
                let params = list[..close]
                    .split(',')
                    .map(str::trim)
                    .filter(|param| !param.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                if params.iter().any(|param| leading_ident(param) != param) {
                    return Err(malformed(line, "define"));
                }
                (Some(params), &list[close + 1..])
            }
            None => (None, after),
        };

        let mac = Macro {
            params,
            body: normalize(&trim(&tokenize(body))),
        };

        if let Some(previous) = self.macros.macros.get(name) {
            if !previous.same_as(&mac) {
                return Err(PreprocessError::Redefinition {
                    line,
                    name: name.to_string(),
                });
            }
        }

        self.macros.macros.insert(name.to_string(), mac);
        Ok(())
    }

    fn flush(&mut self, pending: &mut String) -> Result<(), PreprocessError> {
        if pending.trim().is_empty() {
            pending.clear();
            return Ok(());
        }

        let expanded = self.macros.expand(&tokenize(pending), &mut Vec::new())?;
        for line in render(&expanded).lines() {
            let line = line.trim_end();
            if !line.trim().is_empty() {
                self.output.push_str(line);
                self.output.push('\n');
            }
        }

        pending.clear();
        Ok(())
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

fn malformed(line: usize, directive: &str) -> PreprocessError {
    PreprocessError::Malformed {
        line,
        directive: directive.to_string(),
    }
}

fn unsupported(line: usize, directive: &str) -> PreprocessError {
    PreprocessError::Unsupported {
        line,
        directive: directive.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Preprocessed {
        Preprocessor::new().run(source).unwrap()
    }

    #[test]
    fn object_like_macros_expand() {
        let out = run("#define TYPE_T float\nTYPE_T x = 1.0f;\n");

        assert_eq!(out.output, "float x = 1.0f;\n");
    }

    #[test]
    fn ifndef_skips_defined_symbols() {
        let out = run("#define A 1\n#ifndef A\n#define A 2\n#endif\nA\n");

        assert_eq!(out.output, "1\n");
    }

    #[test]
    fn else_branch() {
        let out = run("#ifdef MISSING\nyes\n#else\nno\n#endif\n");

        assert_eq!(out.output, "no\n");
    }

    #[test]
    fn nested_skipped_conditionals() {
        let out = run(
            "#ifdef MISSING\n#ifndef OTHER\nskipped\n#else\nskipped too\n#endif\n#endif\nkept\n",
        );

        assert_eq!(out.output, "kept\n");
    }

    #[test]
    fn paste_needs_two_stages() {
        let out = run(
            "#define A foo\n#define B bar\n#define CAT_(a, b) a##b\n#define CAT(a, b) CAT_(a, b)\n",
        );

        assert_eq!(out.expand("CAT(A, B)").unwrap(), "foobar");
        assert_eq!(out.expand("CAT_(A, B)").unwrap(), "AB");
    }

    #[test]
    fn self_reference_does_not_loop() {
        let out = run("#define X X + 1\nX\n");

        assert_eq!(out.output, "X + 1\n");
    }

    #[test]
    fn stringify() {
        let out = run("#define STR(x) #x\nSTR(a + b)\n");

        assert_eq!(out.output, "\"a + b\"\n");
    }

    #[test]
    fn invocation_across_lines() {
        let out = run("#define ADD(a, b) ((a) + (b))\nADD(1,\n  2)\n");

        assert_eq!(out.expand("ADD(x, y)").unwrap(), "((x) + (y))");
        assert_eq!(out.output, "((1) + (2))\n");
    }

    #[test]
    fn comments_and_continuations() {
        let out = run("#define LONG a \\\n b // trailing\n/* block\n comment */ LONG\n");

        assert_eq!(out.definition("LONG").unwrap(), "a b");
        assert_eq!(out.output.trim(), "a b");
    }

    #[test]
    fn indentation_is_kept() {
        let out = run("x\n    y\n#ifdef NOPE\n#else\n\tz\n#endif\n");

        assert_eq!(out.output, "x\n    y\n\tz\n");
    }

    #[test]
    fn identical_redefinition_is_allowed() {
        assert!(Preprocessor::new().run("#define A 1\n#define A  1\n").is_ok());
    }

    #[test]
    fn different_redefinition_is_an_error() {
        let err = Preprocessor::new()
            .run("#define A 1\n#define A 2\n")
            .unwrap_err();

        assert_eq!(
            err,
            PreprocessError::Redefinition {
                line: 2,
                name: "A".into()
            }
        );
    }

    #[test]
    fn warnings_are_collected() {
        let out =
            run("#warning \"first\"\n#ifdef NOPE\n#warning skipped\n#endif\n#warning second\n");

        assert_eq!(out.warnings, vec!["first", "second"]);
    }

    #[test]
    fn error_directive_fails() {
        let err = Preprocessor::new().run("#error \"stop\"\n").unwrap_err();

        assert_eq!(
            err,
            PreprocessError::ErrorDirective {
                line: 1,
                message: "stop".into()
            }
        );
    }

    #[test]
    fn unbalanced_conditionals() {
        assert!(matches!(
            Preprocessor::new().run("#ifdef A\n"),
            Err(PreprocessError::UnterminatedConditional { line: 1 })
        ));
        assert!(matches!(
            Preprocessor::new().run("#endif\n"),
            Err(PreprocessError::UnmatchedConditional { line: 1, .. })
        ));
    }

    #[test]
    fn includes_registered_headers() {
        let out = Preprocessor::new()
            .with_header("a.h", "#define A 42\n")
            .run("#include \"a.h\"\n#include <stdio.h>\nA\n")
            .unwrap();

        assert_eq!(out.output, "#include <stdio.h>\n42\n");
        assert!(matches!(
            Preprocessor::new().run("#include \"b.h\"\n"),
            Err(PreprocessError::UnknownInclude(name)) if name == "b.h"
        ));
    }

    #[test]
    fn predefined_symbols() {
        let out = Preprocessor::new()
            .with_define("DEBUG", "")
            .run("#ifdef DEBUG\ndebug\n#endif\n")
            .unwrap();

        assert_eq!(out.output, "debug\n");
        assert_eq!(out.definition("DEBUG").unwrap(), "");
    }

    #[test]
    fn arity_is_checked() {
        assert!(matches!(
            Preprocessor::new().run("#define F(a, b) a\nF(1)\n"),
            Err(PreprocessError::Arity { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn if_is_unsupported_when_active() {
        assert!(matches!(
            Preprocessor::new().run("#if 1\n#endif\n"),
            Err(PreprocessError::Unsupported { .. })
        ));
        assert!(Preprocessor::new().run("#ifdef NOPE\n#if 1\n#endif\n#endif\n").is_ok());
    }
}
