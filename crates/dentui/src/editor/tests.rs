use super::*;

fn typed(rows: usize, cols: usize, text: &str) -> EditBuffer {
    let mut buffer = EditBuffer::new(rows, cols);
    assert!(buffer.insert_str(text));
    buffer
}

fn rows(buffer: &EditBuffer) -> Vec<String> {
    (0..buffer.rows()).map(|row| buffer.row_text(row)).collect()
}

struct Sources {
    users: Vec<String>,
    commands: Vec<String>,
    shortened: Vec<String>,
}

impl Sources {
    fn new(users: &[&str]) -> Self {
        Self {
            users: users.iter().map(|u| u.to_string()).collect(),
            commands: vec!["/favourite".into(), "/favourites".into(), "/follow".into()],
            shortened: Vec::new(),
        }
    }
}

impl CompletionContext for Sources {
    fn candidates(&self, source: Source) -> Option<Vec<String>> {
        match source {
            Source::Users => Some(self.users.clone()),
            Source::Commands => Some(self.commands.clone()),
            Source::Groups | Source::Tags => None,
        }
    }

    fn shorten_url(&mut self, url: &str) -> Option<String> {
        self.shortened.push(url.to_string());
        Some("http://is.gd/x".to_string())
    }
}

fn press(editor: &mut LineEditor, ctx: &mut Sources, keys: &[Key]) -> Vec<Progress> {
    let mut seen = Vec::new();
    for key in keys {
        editor.handle_key(*key, ctx, &mut |p| seen.push(p));
    }
    seen
}

fn type_text(editor: &mut LineEditor, ctx: &mut Sources, text: &str) {
    let keys: Vec<Key> = text.chars().map(Key::Char).collect();
    press(editor, ctx, &keys);
}

#[test]
fn insert_wraps_cursor_to_next_row() {
    let buffer = typed(2, 4, "abcde");
    assert_eq!(rows(&buffer), vec!["abcd", "e   "]);
    assert_eq!(buffer.cursor(), (1, 1));
}

#[test]
fn insert_into_full_row_carries_last_char_down() {
    let mut buffer = typed(3, 4, "abcdef");
    buffer.move_to(0, 1);
    assert!(buffer.insert('X'));
    assert_eq!(rows(&buffer), vec!["aXbc", "def ", "    "]);
    assert_eq!(buffer.cursor(), (0, 2));
}

#[test]
fn carry_recurses_through_full_rows() {
    let mut buffer = typed(3, 2, "abcde");
    buffer.move_to(0, 0);
    assert!(buffer.insert('X'));
    assert_eq!(rows(&buffer), vec!["Xa", "bc", "de"]);
}

#[test]
fn insert_rejected_when_buffer_full() {
    let mut buffer = typed(2, 2, "abcd");
    buffer.move_to(0, 0);
    assert!(!buffer.insert('X'));
    assert_eq!(rows(&buffer), vec!["ab", "cd"]);
}

#[test]
fn delete_reflows_following_rows() {
    let mut buffer = typed(3, 3, "abcdefg");
    buffer.move_to(0, 1);
    buffer.delete();
    assert_eq!(rows(&buffer), vec!["acd", "efg", "   "]);
    assert_eq!(buffer.cursor(), (0, 1));
}

#[test]
fn delete_then_insert_restores_content() {
    let mut buffer = typed(3, 4, "hello world");
    let before = buffer.clone();
    for index in 0..11 {
        buffer.move_to(index / 4, index % 4);
        let ch = buffer.cell(index / 4, index % 4);
        buffer.delete();
        buffer.move_to(index / 4, index % 4);
        assert!(buffer.insert(ch));
        assert_eq!(rows(&buffer), rows(&before), "cell {index}");
    }
}

#[test]
fn delete_then_insert_restores_blank_at_wrap_column() {
    for (rows_n, cols, text) in [(3, 3, "abc de"), (3, 5, "abcd efgh"), (4, 3, "ab cd ef g")] {
        let mut buffer = typed(rows_n, cols, text);
        let before = rows(&buffer);
        for index in 0..text.chars().count() {
            let (row, col) = (index / cols, index % cols);
            buffer.move_to(row, col);
            let ch = buffer.cell(row, col);
            buffer.delete();
            buffer.move_to(row, col);
            assert!(buffer.insert(ch));
            assert_eq!(rows(&buffer), before, "{text:?} cell {index}");
        }
        assert_eq!(buffer.gather(), text);
    }
}

#[test]
fn blank_in_last_column_is_carried_down() {
    let mut buffer = typed(3, 5, "abcd efgh");
    assert_eq!(rows(&buffer), vec!["abcd ", "efgh ", "     "]);
    buffer.move_to(0, 0);
    assert!(buffer.insert('X'));
    assert_eq!(rows(&buffer), vec!["Xabcd", " efgh", "     "]);
    assert_eq!(buffer.gather(), "Xabcd efgh");
}

#[test]
fn trailing_blank_row_end_is_dropped_not_carried() {
    let mut buffer = typed(2, 3, "ab");
    buffer.move_to(0, 0);
    assert!(buffer.insert('X'));
    assert_eq!(rows(&buffer), vec!["Xab", "   "]);
}

#[test]
fn cursor_stays_in_bounds() {
    let mut buffer = EditBuffer::new(2, 3);
    for _ in 0..10 {
        buffer.insert('x');
        buffer.move_right();
        buffer.move_down();
    }
    let (row, col) = buffer.cursor();
    assert!(row < 2 && col < 3);
    for _ in 0..10 {
        buffer.backspace();
        buffer.move_up();
        buffer.move_left();
    }
    assert_eq!(buffer.cursor(), (0, 0));
}

#[test]
fn backspace_crosses_row_start() {
    let mut buffer = typed(2, 3, "abcd");
    buffer.move_to(1, 0);
    buffer.backspace();
    assert_eq!(rows(&buffer), vec!["abd", "   "]);
    assert_eq!(buffer.cursor(), (0, 2));
}

#[test]
fn word_delete_skips_trailing_blanks() {
    let mut buffer = typed(1, 20, "one two  ");
    buffer.delete_word_back();
    assert_eq!(buffer.gather(), "one");
    assert_eq!(buffer.cursor(), (0, 4));
}

#[test]
fn word_delete_crosses_wrap_point() {
    let mut buffer = typed(2, 5, "ab wordy");
    // "ab wo" / "rdy  ", cursor after "rdy".
    assert_eq!(buffer.cursor(), (1, 3));
    buffer.delete_word_back();
    assert_eq!(rows(&buffer), vec!["ab   ", "     "]);
    assert_eq!(buffer.cursor(), (0, 3));
}

#[test]
fn word_delete_at_origin_is_noop() {
    let mut buffer = EditBuffer::new(1, 5);
    buffer.delete_word_back();
    assert_eq!(buffer.cursor(), (0, 0));
}

#[test]
fn delete_to_row_start_only_touches_current_row() {
    let mut buffer = typed(2, 4, "abcdefg");
    buffer.delete_to_row_start();
    assert_eq!(rows(&buffer), vec!["abcd", "    "]);
    assert_eq!(buffer.cursor(), (1, 0));
}

#[test]
fn end_moves_past_text() {
    let mut buffer = typed(3, 4, "abcdef");
    buffer.home();
    buffer.end();
    assert_eq!(buffer.cursor(), (1, 2));
}

#[test]
fn gather_collapses_blanks() {
    let mut buffer = EditBuffer::new(2, 6);
    buffer.insert_str("  hi ");
    buffer.move_to(1, 0);
    buffer.insert_str("there");
    assert_eq!(buffer.gather(), "hi there");
}

#[test]
fn count_tracks_cursor_and_content() {
    let mut buffer = typed(2, 5, "abc  ");
    assert_eq!(buffer.count(), 5);
    buffer.home();
    assert_eq!(buffer.count(), 3);
}

#[test]
fn editor_submits_gathered_text() {
    let mut editor = LineEditor::new(2, 10, CompletionMode::Exact);
    let mut ctx = Sources::new(&[]);
    type_text(&mut editor, &mut ctx, " hello  you ");
    let outcome = editor.handle_key(Key::Enter, &mut ctx, &mut |_| {});
    assert_eq!(outcome, EditOutcome::Submit("hello you".to_string()));
    assert!(editor.buffer().is_empty());
}

#[test]
fn editor_abort_clears_buffer() {
    let mut editor = LineEditor::new(1, 10, CompletionMode::Exact);
    let mut ctx = Sources::new(&[]);
    type_text(&mut editor, &mut ctx, "draft");
    let outcome = editor.handle_key(Key::Esc, &mut ctx, &mut |_| {});
    assert_eq!(outcome, EditOutcome::Abort);
    assert!(editor.buffer().is_empty());
}

#[test]
fn editor_reports_count_after_each_key() {
    let mut editor = LineEditor::new(1, 10, CompletionMode::Exact);
    let mut ctx = Sources::new(&[]);
    let seen = press(&mut editor, &mut ctx, &[Key::Char('a'), Key::Char('b')]);
    assert_eq!(seen, vec![Progress::Count(1), Progress::Count(2)]);
}

#[test]
fn tab_completes_user_after_sigil() {
    let mut editor = LineEditor::new(1, 30, CompletionMode::Exact);
    let mut ctx = Sources::new(&["alice", "bob"]);
    type_text(&mut editor, &mut ctx, "hi @al");
    press(&mut editor, &mut ctx, &[Key::Tab]);
    assert_eq!(editor.buffer().gather(), "hi @alice");
}

#[test]
fn tab_without_sigil_uses_users() {
    let mut editor = LineEditor::new(1, 30, CompletionMode::Exact);
    let mut ctx = Sources::new(&["alice", "bob"]);
    type_text(&mut editor, &mut ctx, "bo");
    press(&mut editor, &mut ctx, &[Key::Tab]);
    assert_eq!(editor.buffer().gather(), "bob");
}

#[test]
fn ambiguous_completion_reports_candidates() {
    let mut editor = LineEditor::new(1, 30, CompletionMode::Exact);
    let mut ctx = Sources::new(&[]);
    type_text(&mut editor, &mut ctx, "/favourite");
    let seen = press(&mut editor, &mut ctx, &[Key::Tab]);
    assert_eq!(
        seen,
        vec![Progress::Candidates(vec![
            "/favourite".to_string(),
            "/favourites".to_string()
        ])]
    );
    assert_eq!(editor.buffer().gather(), "/favourite");
}

#[test]
fn missing_source_leaves_token_alone() {
    let mut editor = LineEditor::new(1, 30, CompletionMode::Exact);
    let mut ctx = Sources::new(&["alice"]);
    type_text(&mut editor, &mut ctx, "#al");
    press(&mut editor, &mut ctx, &[Key::Tab]);
    assert_eq!(editor.buffer().gather(), "#al");
}

#[test]
fn fuzzy_completion_replaces_token() {
    let mut editor = LineEditor::new(1, 30, CompletionMode::Fuzzy);
    let mut ctx = Sources::new(&["bobby", "carol"]);
    type_text(&mut editor, &mut ctx, "@bb");
    press(&mut editor, &mut ctx, &[Key::Tab]);
    assert_eq!(editor.buffer().gather(), "@bobby");
}

#[test]
fn url_token_is_shortened_in_place() {
    let mut editor = LineEditor::new(2, 30, CompletionMode::Exact);
    let mut ctx = Sources::new(&[]);
    type_text(&mut editor, &mut ctx, "see http://example.com/very/long");
    press(&mut editor, &mut ctx, &[Key::Tab]);
    assert_eq!(editor.buffer().gather(), "see http://is.gd/x");
    assert_eq!(ctx.shortened, vec!["http://example.com/very/long"]);
}

#[test]
fn start_seeds_initial_text() {
    let mut editor = LineEditor::new(1, 20, CompletionMode::Exact);
    assert_eq!(editor.start("/reply 3 "), 9);
    assert_eq!(editor.buffer().cursor(), (0, 9));
}
