//! Rendering primitives for CLI output.

use comfy_table::{Attribute, Cell, ContentArrangement, Table as ComfyTable};

use notelock_core::Note;

use super::context::UiContext;
use super::theme::{styled, styles, Badge};

/// Render a badge with optional message.
pub fn badge(ctx: &UiContext, kind: Badge, message: &str) -> String {
    let badge_text = styled(kind.display(ctx.unicode), kind.style(), ctx.color);
    if message.is_empty() {
        badge_text
    } else {
        format!("{} {}", badge_text, message)
    }
}

/// Render a key-value pair.
///
/// Pretty mode: "Key: value" with dim key
/// Plain mode: "key=value"
pub fn kv(ctx: &UiContext, key: &str, value: &str) -> String {
    if ctx.is_pretty() {
        let styled_key = styled(&format!("{}:", key), styles::dim(), ctx.color);
        format!("{} {}", styled_key, value)
    } else {
        format!("{}={}", key.to_lowercase().replace(' ', "_"), value)
    }
}

pub fn hint(ctx: &UiContext, text: &str) -> String {
    if ctx.is_pretty() {
        let label = styled("Hint:", styles::dim(), ctx.color);
        format!("{} {}", label, text)
    } else {
        format!("hint={}", text)
    }
}

/// The note list, numbered from 1 in display order.
///
/// Plain mode prints one tab-separated line per note.
pub fn note_table(ctx: &UiContext, notes: &[Note]) -> String {
    let rows: Vec<[String; 5]> = notes
        .iter()
        .enumerate()
        .map(|(index, note)| {
            [
                (index + 1).to_string(),
                note.display_title().to_string(),
                format!("{:?}", note.kind).to_lowercase(),
                if note.is_locked() { "locked" } else { "" }.to_string(),
                note.updated_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            ]
        })
        .collect();

    if !ctx.is_pretty() {
        return rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut table = ComfyTable::new();
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let headers = ["#", "Title", "Type", "", "Updated"].map(|header| {
        let cell = Cell::new(header);
        if ctx.color {
            cell.add_attribute(Attribute::Dim)
        } else {
            cell
        }
    });
    table.set_header(headers);
    for i in 0..5 {
        if let Some(column) = table.column_mut(i) {
            column.set_padding((0, 2));
        }
    }
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

pub fn print(message: &str) {
    println!("{}", message);
}

/// Format an error message with optional hint.
///
/// Pretty mode: "[ERR] message" with optional "Hint: ..." on next line
/// Plain mode: "error=message" with optional "hint=suggestion"
pub fn error_message(ctx: &UiContext, message: &str, error_hint: Option<&str>) -> String {
    let mut lines = Vec::new();
    if ctx.is_pretty() {
        lines.push(badge(ctx, Badge::Err, message));
        if let Some(h) = error_hint {
            lines.push(hint(ctx, h));
        }
    } else {
        lines.push(format!("error={}", message));
        if let Some(h) = error_hint {
            lines.push(format!("hint={}", h));
        }
    }
    lines.join("\n")
}

pub fn print_error(ctx: &UiContext, message: &str, error_hint: Option<&str>) {
    eprintln!("{}", error_message(ctx, message, error_hint));
}

#[cfg(test)]
mod tests {
    use super::*;
    use notelock_core::NoteKind;

    fn plain_ctx() -> UiContext {
        UiContext {
            is_tty: false,
            color: false,
            unicode: false,
        }
    }

    #[test]
    fn test_plain_kv_and_hint() {
        let ctx = plain_ctx();
        assert_eq!(kv(&ctx, "Auto lock", "2m"), "auto_lock=2m");
        assert_eq!(hint(&ctx, "run list"), "hint=run list");
    }

    #[test]
    fn test_plain_error_message() {
        let ctx = plain_ctx();
        let msg = error_message(&ctx, "Incorrect PIN", Some("try again"));
        assert_eq!(msg, "error=Incorrect PIN\nhint=try again");
    }

    #[test]
    fn test_plain_note_table() {
        let ctx = plain_ctx();
        let mut note = Note::new(NoteKind::Checklist);
        note.title = "Groceries".into();

        let out = note_table(&ctx, &[note, Note::new(NoteKind::Text)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1\tGroceries\tchecklist"));
        assert!(lines[1].starts_with("2\t(untitled)\ttext"));
    }
}
