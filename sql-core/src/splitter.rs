//! Streaming statement tokenizer (C6).
//!
//! Splits a raw SQL migration file into discrete, executable statements.
//! This is a line-oriented state machine, not the token-level `Lexer` in
//! `crate::lexer`: it never needs to know what a `SELECT` list looks like,
//! only where one statement ends and the next begins, and it must get that
//! right even when the statement body itself contains string literals,
//! comments, or a dialect-specific escape hatch (MySQL `DELIMITER`,
//! PostgreSQL dollar-quoting, an Oracle `/` block terminator).

use crate::error::TokenizeError;

/// Coarse statement classification, derived from the first keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
    CreateTrigger,
    AlterTable,
    DropTable,
    Other,
}

fn classify(text: &str) -> StatementKind {
    // A leading `DELIMITER xxx` prologue (folded into the statement text so
    // the host can replay the whole bracketed block) isn't the SQL verb;
    // classify from the line after it when present.
    let text = text
        .strip_prefix("DELIMITER")
        .and_then(|rest| rest.split_once('\n'))
        .map_or(text, |(_, rest)| rest);
    let mut words = text.split_whitespace();
    let first = words.next().unwrap_or("").to_ascii_uppercase();
    match first.as_str() {
        "SELECT" => StatementKind::Select,
        "INSERT" => StatementKind::Insert,
        "UPDATE" => StatementKind::Update,
        "DELETE" => StatementKind::Delete,
        "CREATE" => match words.next().map(str::to_ascii_uppercase).as_deref() {
            Some("TABLE") => StatementKind::CreateTable,
            Some("TRIGGER") => StatementKind::CreateTrigger,
            _ => StatementKind::Other,
        },
        "ALTER" => {
            if words.next().is_some_and(|w| w.eq_ignore_ascii_case("TABLE")) {
                StatementKind::AlterTable
            } else {
                StatementKind::Other
            }
        }
        "DROP" => {
            if words.next().is_some_and(|w| w.eq_ignore_ascii_case("TABLE")) {
                StatementKind::DropTable
            } else {
                StatementKind::Other
            }
        }
        _ => StatementKind::Other,
    }
}

/// A single statement recovered from a larger script, with the 1-based
/// source line it started on for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub kind: StatementKind,
    pub line_number: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    LineComment,
    BlockComment,
    SingleQuoted,
    DoubleQuoted,
    DollarQuoted,
}

struct SplitterState {
    mode: Mode,
    delimiter: Vec<char>,
    /// Set while inside a MySQL `DELIMITER xxx ... DELIMITER ;` bracketed
    /// block, so the block terminator is folded into the statement text
    /// instead of ending it early.
    custom_block: bool,
    dollar_tag: String,
    buffer: String,
    line: usize,
    statement_start_line: usize,
}

impl SplitterState {
    fn new() -> Self {
        Self {
            mode: Mode::Normal,
            delimiter: vec![';'],
            custom_block: false,
            dollar_tag: String::new(),
            buffer: String::new(),
            line: 1,
            statement_start_line: 1,
        }
    }

    fn flush(&mut self, out: &mut Vec<Statement>) {
        let trimmed = self.buffer.trim();
        if !trimmed.is_empty() {
            out.push(Statement { text: trimmed.to_string(), kind: classify(trimmed), line_number: self.statement_start_line });
        }
        self.buffer.clear();
        self.statement_start_line = self.line;
    }
}

fn parse_delimiter_directive(line: &str) -> Option<&str> {
    let rest = line.trim_start();
    let rest = rest.strip_prefix("DELIMITER").or_else(|| rest.strip_prefix("delimiter"))?;
    let arg = rest.trim();
    if arg.is_empty() {
        None
    } else {
        Some(arg)
    }
}

/// Splits `input` into executable statements, honoring string/comment
/// masking, MySQL `DELIMITER` directives, PostgreSQL `$tag$` dollar
/// quoting, and a bare `/` line as an Oracle SQL*Plus block terminator.
pub fn split_statements(input: &str) -> Result<Vec<Statement>, TokenizeError> {
    let mut state = SplitterState::new();
    let mut out = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // A DELIMITER directive only makes sense at the start of a line.
        if state.mode == Mode::Normal && is_line_start(&chars, i) {
            let line_end = chars[i..].iter().position(|&c| c == '\n').map_or(chars.len(), |p| i + p);
            let line_text: String = chars[i..line_end].iter().collect();
            if line_text.trim_start().to_ascii_uppercase().starts_with("DELIMITER") {
                match parse_delimiter_directive(&line_text) {
                    Some(new_delim) => {
                        let entering_custom_block = !state.custom_block && new_delim != ";";
                        let closing_custom_block = state.custom_block && new_delim == ";";
                        // The DELIMITER line itself is folded into the
                        // statement it brackets, so the host can replay the
                        // whole `DELIMITER //` ... `END//` ... `DELIMITER ;`
                        // sequence as one driver call.
                        if entering_custom_block || closing_custom_block {
                            state.buffer.push_str(&line_text);
                            state.buffer.push('\n');
                        }
                        state.delimiter = new_delim.chars().collect();
                        state.custom_block = entering_custom_block || (state.custom_block && !closing_custom_block);
                        state.line += line_text.chars().filter(|&c| c == '\n').count() + 1;
                        i = line_end + 1;
                        if closing_custom_block {
                            state.flush(&mut out);
                        }
                        continue;
                    }
                    None => return Err(TokenizeError::MissingDelimiterArgument { line_number: state.line }),
                }
            }

            // A lone `/` on its own line is the Oracle SQL*Plus terminator:
            // it ends whatever statement has been buffered so far without
            // itself becoming part of any statement.
            if !state.buffer.trim().is_empty() && line_text.trim() == "/" {
                state.flush(&mut out);
                state.line += 1;
                i = line_end + 1;
                continue;
            }
        }

        match state.mode {
            Mode::Normal => {
                if c == '-' && chars.get(i + 1) == Some(&'-') {
                    state.mode = Mode::LineComment;
                    state.buffer.push(c);
                    i += 1;
                } else if c == '/' && chars.get(i + 1) == Some(&'*') {
                    state.mode = Mode::BlockComment;
                    state.buffer.push(c);
                    i += 1;
                } else if c == '\'' {
                    state.mode = Mode::SingleQuoted;
                } else if c == '"' {
                    state.mode = Mode::DoubleQuoted;
                } else if c == '$' {
                    if let Some((tag, consumed)) = scan_dollar_tag(&chars, i) {
                        state.dollar_tag = tag;
                        state.mode = Mode::DollarQuoted;
                        state.buffer.extend(chars[i..i + consumed].iter());
                        i += consumed;
                        continue;
                    }
                } else if matches_delimiter(&chars, i, &state.delimiter) {
                    if state.custom_block {
                        // Inside a bracketed DELIMITER block the terminator
                        // text stays part of the statement; only the
                        // closing `DELIMITER ;` line ends it.
                        let delim: String = state.delimiter.iter().collect();
                        state.buffer.push_str(&delim);
                        i += state.delimiter.len();
                    } else {
                        i += state.delimiter.len();
                        state.flush(&mut out);
                    }
                    continue;
                }
                state.buffer.push(c);
            }
            Mode::LineComment => {
                state.buffer.push(c);
                if c == '\n' {
                    state.mode = Mode::Normal;
                }
            }
            Mode::BlockComment => {
                state.buffer.push(c);
                if c == '*' && chars.get(i + 1) == Some(&'/') {
                    state.buffer.push('/');
                    i += 1;
                    state.mode = Mode::Normal;
                }
            }
            Mode::SingleQuoted => {
                state.buffer.push(c);
                if c == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        state.buffer.push('\'');
                        i += 1;
                    } else {
                        state.mode = Mode::Normal;
                    }
                }
            }
            Mode::DoubleQuoted => {
                state.buffer.push(c);
                if c == '"' {
                    if chars.get(i + 1) == Some(&'"') {
                        state.buffer.push('"');
                        i += 1;
                    } else {
                        state.mode = Mode::Normal;
                    }
                }
            }
            Mode::DollarQuoted => {
                if c == '$' {
                    if let Some((tag, consumed)) = scan_dollar_tag(&chars, i) {
                        if tag == state.dollar_tag {
                            state.buffer.extend(chars[i..i + consumed].iter());
                            i += consumed;
                            state.mode = Mode::Normal;
                            continue;
                        }
                    }
                }
                state.buffer.push(c);
            }
        }

        if c == '\n' {
            state.line += 1;
        }
        i += 1;
    }

    match state.mode {
        Mode::SingleQuoted | Mode::DoubleQuoted => {
            return Err(TokenizeError::UnterminatedString { line_number: state.statement_start_line, column: 0 });
        }
        Mode::BlockComment => return Err(TokenizeError::UnterminatedComment { line_number: state.statement_start_line }),
        Mode::DollarQuoted => {
            return Err(TokenizeError::UnterminatedDollarQuote {
                line_number: state.statement_start_line,
                tag: state.dollar_tag.clone(),
            });
        }
        Mode::Normal | Mode::LineComment => {}
    }

    state.flush(&mut out);
    Ok(out)
}

fn is_line_start(chars: &[char], i: usize) -> bool {
    i == 0 || chars[i - 1] == '\n'
}

fn matches_delimiter(chars: &[char], i: usize, delimiter: &[char]) -> bool {
    if i + delimiter.len() > chars.len() {
        return false;
    }
    chars[i..i + delimiter.len()] == *delimiter
}

/// Scans a PostgreSQL dollar-quote tag (`$`, `$tag$`) starting at `chars[i]`
/// (which must be `$`). Returns the tag content and the number of
/// characters consumed, including both `$` delimiters.
fn scan_dollar_tag(chars: &[char], i: usize) -> Option<(String, usize)> {
    let mut j = i + 1;
    let start = j;
    while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
        j += 1;
    }
    if chars.get(j) == Some(&'$') {
        let tag: String = chars[start..j].iter().collect();
        Some((tag, j + 1 - i))
    } else {
        None
    }
}

/// Splits a migration file's text into an `up` and `down` section using the
/// `-- +migrate Up` / `-- +migrate Down` marker convention. A file with
/// neither marker is treated entirely as the `up` section.
#[must_use]
pub fn split_migration_sections(input: &str) -> (Option<String>, Option<String>) {
    let mut up = String::new();
    let mut down = String::new();
    let mut current: Option<bool> = None; // Some(true) = up, Some(false) = down

    for line in input.lines() {
        let marker = line.trim().to_ascii_lowercase();
        if marker.starts_with("-- +migrate up") {
            current = Some(true);
            continue;
        } else if marker.starts_with("-- +migrate down") {
            current = Some(false);
            continue;
        }

        match current {
            Some(true) => {
                up.push_str(line);
                up.push('\n');
            }
            Some(false) => {
                down.push_str(line);
                down.push('\n');
            }
            None => {
                up.push_str(line);
                up.push('\n');
            }
        }
    }

    let up = if up.trim().is_empty() { None } else { Some(up) };
    let down = if down.trim().is_empty() { None } else { Some(down) };
    (up, down)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons() {
        let stmts = split_statements("SELECT 1; SELECT 2;").unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].text, "SELECT 1;");
        assert_eq!(stmts[1].text, "SELECT 2;");
    }

    #[test]
    fn ignores_semicolon_inside_string() {
        let stmts = split_statements("INSERT INTO t VALUES ('a;b');").unwrap();
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].text, "INSERT INTO t VALUES ('a;b');");
    }

    #[test]
    fn ignores_semicolon_inside_line_comment() {
        let stmts = split_statements("SELECT 1; -- trailing ; comment\nSELECT 2;").unwrap();
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn delimiter_directive_changes_terminator() {
        let input = "DELIMITER $$\nCREATE TRIGGER t BEFORE INSERT ON a BEGIN SELECT 1; END$$\nDELIMITER ;\nSELECT 2;";
        let stmts = split_statements(input).unwrap();
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].text.contains("CREATE TRIGGER"));
        assert_eq!(stmts[1].text, "SELECT 2;");
    }

    #[test]
    fn mysql_delimiter_prologue_trigger_emits_single_statement() {
        let input = "DELIMITER //\nCREATE TRIGGER trg_audit BEFORE UPDATE ON accounts\nFOR EACH ROW\nBEGIN\n  INSERT INTO audit_log (account_id) VALUES (OLD.id);\nEND//\nDELIMITER ;\n";
        let stmts = split_statements(input).unwrap();
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].kind, StatementKind::CreateTrigger);
        assert!(stmts[0].text.starts_with("DELIMITER //"));
        assert!(stmts[0].text.contains("CREATE TRIGGER"));
        assert!(stmts[0].text.contains("END//"));
        assert!(stmts[0].text.ends_with("DELIMITER ;"));
    }

    #[test]
    fn dollar_quoted_body_is_not_split() {
        let input = "CREATE FUNCTION f() RETURNS int AS $body$ BEGIN RETURN 1; END; $body$ LANGUAGE plpgsql;";
        let stmts = split_statements(input).unwrap();
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn unterminated_string_errors() {
        let err = split_statements("SELECT 'abc").unwrap_err();
        assert!(matches!(err, TokenizeError::UnterminatedString { .. }));
    }

    #[test]
    fn classifies_statement_kinds() {
        let stmts = split_statements("SELECT 1; INSERT INTO t VALUES (1); CREATE TABLE t (id int);").unwrap();
        assert_eq!(stmts[0].kind, StatementKind::Select);
        assert_eq!(stmts[1].kind, StatementKind::Insert);
        assert_eq!(stmts[2].kind, StatementKind::CreateTable);
    }

    #[test]
    fn migrate_sections_split_up_and_down() {
        let input = "-- +migrate Up\nCREATE TABLE t (id int);\n-- +migrate Down\nDROP TABLE t;\n";
        let (up, down) = split_migration_sections(input);
        assert!(up.unwrap().contains("CREATE TABLE"));
        assert!(down.unwrap().contains("DROP TABLE"));
    }

    #[test]
    fn no_markers_is_entirely_up() {
        let (up, down) = split_migration_sections("CREATE TABLE t (id int);\n");
        assert!(up.is_some());
        assert!(down.is_none());
    }
}
