use super::value::find_value;
use crate::task::{Field, RawTask, Task, TaskId};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{error, warn};

/// Something the reader could not accept. Record-level problems skip a
/// single record; the others end the parse early.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseProblem {
    #[error("invalid task document (missing or misplaced array brackets)")]
    MissingArray,
    #[error("invalid task document (nested object at offset {offset}); remaining tasks ignored")]
    NestedObject { offset: usize },
    #[error("invalid task document (object brace extends beyond array); remaining tasks ignored")]
    UnterminatedObject,
    #[error(
        "skipping task{} due to missing or invalid {field}",
        .id.map(|id| format!(" ID {id}")).unwrap_or_default()
    )]
    InvalidRecord { id: Option<TaskId>, field: Field },
    #[error("skipping task ID {0}, the ID is already in use")]
    DuplicateId(TaskId),
}

/// The tasks recovered from a document plus everything that was skipped.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    pub tasks: Vec<Task>,
    pub problems: Vec<ParseProblem>,
}

/// Parses a task document. Never fails: malformed records are dropped and
/// reported in [`ParsedDocument::problems`].
pub fn parse_document(text: &str) -> ParsedDocument {
    let mut parsed = ParsedDocument::default();
    let content = text.trim();
    if content.is_empty() || content == "[]" {
        return parsed;
    }

    let (open, close) = match (content.find('['), content.rfind(']')) {
        (Some(open), Some(close)) if open < close => (open, close),
        _ => {
            parsed.report_fatal(ParseProblem::MissingArray);
            return parsed;
        }
    };

    let leading = text.len() - text.trim_start().len();
    let base = leading + open + 1;
    let mut seen = HashSet::new();
    for segment in ObjectScanner::new(&content[open + 1..close]) {
        match segment {
            Ok(body) => match read_record(body) {
                Ok(task) if !seen.insert(task.id()) => {
                    parsed.report_skipped(ParseProblem::DuplicateId(task.id()));
                }
                Ok(task) => parsed.tasks.push(task),
                Err(problem) => parsed.report_skipped(problem),
            },
            Err(ScanError::Nested(offset)) => {
                parsed.report_fatal(ParseProblem::NestedObject {
                    offset: base + offset,
                });
            }
            Err(ScanError::Unterminated) => parsed.report_fatal(ParseProblem::UnterminatedObject),
        }
    }
    parsed
}

impl ParsedDocument {
    fn report_skipped(&mut self, problem: ParseProblem) {
        warn!("{problem}");
        self.problems.push(problem);
    }

    fn report_fatal(&mut self, problem: ParseProblem) {
        error!("{problem}");
        self.problems.push(problem);
    }
}

fn read_record(body: &str) -> Result<Task, ParseProblem> {
    let field = |field: Field| find_value(body, field.key());
    Task::from_fields(RawTask {
        id: field(Field::Id),
        description: field(Field::Description),
        status: field(Field::Status),
        created_at: field(Field::CreatedAt),
        updated_at: field(Field::UpdatedAt),
    })
    .map_err(|e| ParseProblem::InvalidRecord {
        id: e.id,
        field: e.field,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InObject,
    InString,
    EscapePending,
}

#[derive(Debug, PartialEq, Eq)]
enum ScanError {
    Nested(usize),
    Unterminated,
}

/// Splits the inside of the top-level array into flat object bodies.
///
/// Braces inside string values are ignored. A `{` inside an object or an
/// object that is still open at the end of the input yields an error, after
/// which the scanner is exhausted.
struct ObjectScanner<'a> {
    text: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> ObjectScanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for ObjectScanner<'a> {
    type Item = Result<&'a str, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut state = ScanState::Outside;
        let mut start = self.pos;
        for (i, b) in self.text.bytes().enumerate().skip(self.pos) {
            state = match (state, b) {
                (ScanState::Outside, b'{') => {
                    start = i + 1;
                    ScanState::InObject
                }
                (ScanState::Outside, _) => ScanState::Outside,
                (ScanState::InObject, b'"') => ScanState::InString,
                (ScanState::InObject, b'{') => {
                    self.done = true;
                    return Some(Err(ScanError::Nested(i)));
                }
                (ScanState::InObject, b'}') => {
                    self.pos = i + 1;
                    return Some(Ok(&self.text[start..i]));
                }
                (ScanState::InObject, _) => ScanState::InObject,
                (ScanState::InString, b'\\') => ScanState::EscapePending,
                (ScanState::InString, b'"') => ScanState::InObject,
                (ScanState::InString, _) => ScanState::InString,
                (ScanState::EscapePending, _) => ScanState::InString,
            };
        }
        self.done = true;
        match state {
            ScanState::Outside => None,
            _ => Some(Err(ScanError::Unterminated)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Status;

    fn object(id: u32, description: &str, status: &str) -> String {
        format!(
            r#"{{"id": {id}, "description": "{description}", "status": "{status}", "createdAt": "t0", "updatedAt": "t1"}}"#
        )
    }

    #[test]
    fn empty_states_yield_nothing_without_problems() {
        for text in ["", "   \n\t", "[]", "  []\n", "[\n]\n"] {
            let parsed = parse_document(text);
            assert!(parsed.tasks.is_empty(), "{text:?}");
            assert!(parsed.problems.is_empty(), "{text:?}");
        }
    }

    #[test]
    fn parses_well_formed_records_in_order() {
        // Arrange
        let text = format!(
            "[\n{},\n{}\n]",
            object(2, "Walk dog", "done"),
            object(1, "Buy milk", "in-progress")
        );

        // Act
        let parsed = parse_document(&text);

        // Assert
        let ids: Vec<_> = parsed.tasks.iter().map(Task::id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(parsed.tasks[0].status(), Status::Done);
        assert_eq!(parsed.tasks[1].description(), "Buy milk");
        assert_eq!(parsed.tasks[1].created_at(), "t0");
        assert_eq!(parsed.tasks[1].updated_at(), "t1");
    }

    #[test]
    fn missing_brackets_discard_everything() {
        for text in [object(1, "a", "todo"), format!("]{}[", object(1, "a", "todo"))] {
            let parsed = parse_document(&text);
            assert!(parsed.tasks.is_empty());
            assert_eq!(parsed.problems, vec![ParseProblem::MissingArray]);
        }
    }

    #[test]
    fn record_missing_status_is_skipped_and_parsing_continues() {
        // Arrange
        let broken = r#"{"id": 2, "description": "No status", "createdAt": "t0", "updatedAt": "t0"}"#;
        let text = format!(
            "[{}, {}, {}]",
            object(1, "First", "todo"),
            broken,
            object(3, "Third", "done")
        );

        // Act
        let parsed = parse_document(&text);

        // Assert
        let ids: Vec<_> = parsed.tasks.iter().map(Task::id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(
            parsed.problems,
            vec![ParseProblem::InvalidRecord {
                id: Some(2),
                field: Field::Status
            }]
        );
    }

    #[test]
    fn record_with_invalid_id_is_skipped() {
        let text = format!(
            r#"[{{"id": "one", "description": "x", "status": "todo", "createdAt": "t", "updatedAt": "t"}}, {}]"#,
            object(5, "ok", "todo")
        );

        let parsed = parse_document(&text);

        assert_eq!(parsed.tasks.len(), 1);
        assert_eq!(
            parsed.problems,
            vec![ParseProblem::InvalidRecord {
                id: None,
                field: Field::Id
            }]
        );
        assert_eq!(
            parsed.problems[0].to_string(),
            "skipping task due to missing or invalid id"
        );
    }

    #[test]
    fn nested_object_stops_parsing() {
        // Arrange
        let text = format!(
            r#"[{}, {{"id": 2, "meta": {{"a": 1}}}}, {}]"#,
            object(1, "kept", "todo"),
            object(3, "never reached", "todo")
        );

        // Act
        let parsed = parse_document(&text);

        // Assert
        assert_eq!(parsed.tasks.len(), 1);
        assert_eq!(parsed.tasks[0].id(), 1);
        assert!(matches!(
            parsed.problems.as_slice(),
            [ParseProblem::NestedObject { offset }] if text.as_bytes()[*offset] == b'{'
        ));
    }

    #[test]
    fn unclosed_object_stops_parsing() {
        let text = format!(r#"[{}, {{"id": 2, "description": "x"]"#, object(1, "kept", "todo"));

        let parsed = parse_document(&text);

        assert_eq!(parsed.tasks.len(), 1);
        assert_eq!(parsed.problems, vec![ParseProblem::UnterminatedObject]);
    }

    #[test]
    fn braces_and_quotes_inside_strings_do_not_split_objects() {
        let text = format!(
            "[{}, {}]",
            object(1, r#"use {braces} and \"quotes\" here"#, "todo"),
            object(2, r#"ends with backslash \\"#, "done")
        );

        let parsed = parse_document(&text);

        assert!(parsed.problems.is_empty());
        assert_eq!(parsed.tasks[0].description(), r#"use {braces} and "quotes" here"#);
        assert_eq!(parsed.tasks[1].description(), r"ends with backslash \");
    }

    #[test]
    fn duplicate_ids_keep_first_record() {
        let text = format!(
            "[{}, {}]",
            object(4, "first", "todo"),
            object(4, "second", "done")
        );

        let parsed = parse_document(&text);

        assert_eq!(parsed.tasks.len(), 1);
        assert_eq!(parsed.tasks[0].description(), "first");
        assert_eq!(parsed.problems, vec![ParseProblem::DuplicateId(4)]);
    }

    #[test]
    fn scanner_reports_states_explicitly() {
        let mut scanner = ObjectScanner::new(r#" {"a": "}"} , {"b": 1} {"#);

        assert_eq!(scanner.next(), Some(Ok(r#""a": "}""#)));
        assert_eq!(scanner.next(), Some(Ok(r#""b": 1"#)));
        assert_eq!(scanner.next(), Some(Err(ScanError::Unterminated)));
        assert_eq!(scanner.next(), None);
    }
}
