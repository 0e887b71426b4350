mod common;

use std::ops::ControlFlow;

use common::ScriptedKeys;
use tagwright::term::{Highlight, ListKey, ReorderableList};

fn names(list: &ReorderableList<Vec<String>>) -> Vec<&str> {
    list.rows().iter().map(|row| row[0].as_str()).collect()
}

fn list(rows: &[&str]) -> ReorderableList<Vec<String>> {
    ReorderableList::new(
        "Tracks",
        vec!["Name".to_string()],
        rows.iter().map(|name| vec![name.to_string()]).collect(),
    )
}

#[test]
fn grabbed_row_is_carried_to_the_bottom() {
    let mut table = list(&["A", "B", "C"]);

    for key in [ListKey::Select, ListKey::Down, ListKey::Down, ListKey::Select] {
        assert_eq!(table.handle_key(key), ControlFlow::Continue(()));
    }

    assert_eq!(names(&table), vec!["B", "C", "A"]);
    assert_eq!(table.cursor(), 2);
    assert!(!table.is_grabbed());
}

#[test]
fn moving_up_at_the_top_changes_nothing() {
    let mut table = list(&["A", "B"]);

    let _ = table.handle_key(ListKey::Select);
    let _ = table.handle_key(ListKey::Up);

    assert_eq!(names(&table), vec!["A", "B"]);
    assert_eq!(table.cursor(), 0);
    assert!(table.is_grabbed());
}

#[test]
fn moving_without_a_grab_only_moves_the_cursor() {
    let mut table = list(&["A", "B", "C"]);

    let _ = table.handle_key(ListKey::Down);
    let _ = table.handle_key(ListKey::Down);
    let _ = table.handle_key(ListKey::Down);

    assert_eq!(names(&table), vec!["A", "B", "C"]);
    assert_eq!(table.cursor(), 2);
}

#[test]
fn highlight_follows_cursor_and_grab_state() {
    let mut table = list(&["A", "B"]);
    assert_eq!(table.highlight(0), Highlight::Cursor);
    assert_eq!(table.highlight(1), Highlight::None);

    let _ = table.handle_key(ListKey::Select);
    assert_eq!(table.highlight(0), Highlight::Grabbed);

    let _ = table.handle_key(ListKey::Down);
    assert_eq!(table.highlight(0), Highlight::None);
    assert_eq!(table.highlight(1), Highlight::Grabbed);
}

#[test]
fn interrupt_breaks() {
    let mut table = list(&["A"]);
    assert_eq!(table.handle_key(ListKey::Interrupt), ControlFlow::Break(()));
}

#[test]
fn empty_table_renders_and_ignores_movement() -> anyhow::Result<()> {
    let mut table = list(&[]);

    let _ = table.handle_key(ListKey::Down);
    let _ = table.handle_key(ListKey::Select);
    let _ = table.handle_key(ListKey::Up);
    assert_eq!(table.cursor(), 0);
    assert_eq!(table.highlight(0), Highlight::None);

    let mut out = Vec::new();
    assert_eq!(table.render(&mut out)?, 5);
    let text = String::from_utf8(out)?;
    assert!(text.contains(table.title()));
    assert!(text.contains("Name"));
    Ok(())
}

#[test]
fn render_draws_every_row_and_right_aligns_the_first_column() -> anyhow::Result<()> {
    let table = ReorderableList::new(
        "Demo",
        vec!["#".to_string(), "Title".to_string()],
        vec![
            vec!["1".to_string(), "Intro".to_string()],
            vec!["10".to_string(), "Outro".to_string()],
        ],
    );

    let mut out = Vec::new();
    assert_eq!(table.render(&mut out)?, 7);

    let text = String::from_utf8(out)?;
    assert!(text.contains("  1  Intro"));
    assert!(text.contains(" 10  Outro"));
    Ok(())
}

#[test]
fn interact_applies_scripted_keys_and_redraws_in_place() -> anyhow::Result<()> {
    let mut table = list(&["A", "B", "C"]);
    let mut keys = ScriptedKeys::with_timeouts([ListKey::Select, ListKey::Down, ListKey::Select]);
    let mut out = Vec::new();

    table.interact(&mut keys, &mut out)?;

    assert_eq!(names(&table), vec!["B", "A", "C"]);

    let text = String::from_utf8(out)?;
    // Four draws: the first plus one per handled key; timeouts do not redraw.
    assert_eq!(text.matches("Tracks").count(), 4);
    // Erase sequence (cursor up) before every redraw.
    assert!(text.contains("\u{1b}[1A"));
    Ok(())
}
