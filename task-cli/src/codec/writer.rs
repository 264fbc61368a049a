use super::escape::escape;
use crate::task::{Field, Task};
use std::fmt::{Display, Formatter};

/// Display adapter rendering tasks as the pretty-printed task document.
pub struct Document<'a>(pub &'a [Task]);

impl Display for Document<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[")?;
        for (i, task) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f, ",")?;
            }
            writeln!(f, "  {{")?;
            writeln!(f, "    \"{}\": {},", Field::Id, task.id())?;
            write_string(f, Field::Description, task.description(), true)?;
            write_string(f, Field::Status, task.status().as_str(), true)?;
            write_string(f, Field::CreatedAt, task.created_at(), true)?;
            write_string(f, Field::UpdatedAt, task.updated_at(), false)?;
            write!(f, "  }}")?;
        }
        if !self.0.is_empty() {
            writeln!(f)?;
        }
        writeln!(f, "]")
    }
}

fn write_string(f: &mut Formatter<'_>, field: Field, value: &str, more: bool) -> std::fmt::Result {
    let separator = if more { "," } else { "" };
    writeln!(f, "    \"{field}\": \"{}\"{separator}", escape(value))
}

/// Renders tasks, in order, as the task document text.
pub fn render_document(tasks: &[Task]) -> String {
    Document(tasks).to_string()
}
