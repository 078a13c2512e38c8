use cursor_core::{
    CursorConfig, CursorController, CursorIntent, Position, Selection, TextModel,
};

fn caret(line: usize, column: usize) -> Selection {
    Selection::caret(Position::new(line, column))
}

#[test]
fn test_multicursor_type_inserts_at_every_cursor() {
    let mut model = TextModel::from_lines(&["foo", "bar"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(1, 4), caret(2, 4)] },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::Type { text: "X".into() })
        .unwrap();

    assert_eq!(model.get_lines(), vec!["fooX", "barX"]);
    assert_eq!(
        controller.selections(),
        vec![caret(1, 5), caret(2, 5)]
    );
}

#[test]
fn test_multicursor_type_is_one_undo_step() {
    let mut model = TextModel::from_lines(&["foo", "bar"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(1, 4), caret(2, 4)] },
        )
        .unwrap();
    controller
        .trigger(&mut model, "test", CursorIntent::Type { text: "X".into() })
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::Undo)
        .unwrap();

    assert_eq!(model.get_lines(), vec!["foo", "bar"]);
    // Undo restores the selections recorded before the edit, verbatim.
    assert_eq!(controller.selections(), vec![caret(1, 4), caret(2, 4)]);
    assert!(!model.can_undo());
}

#[test]
fn test_type_over_selection_replaces_it() {
    let mut model = TextModel::new("hello world");
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections {
                selections: vec![Selection::from_anchor_active(
                    Position::new(1, 1),
                    Position::new(1, 6),
                )],
            },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::Type { text: "bye".into() })
        .unwrap();

    assert_eq!(model.get_text(), "bye world");
    assert_eq!(controller.selections(), vec![caret(1, 4)]);
}

#[test]
fn test_delete_left_merges_lines_at_column_one() {
    let mut model = TextModel::from_lines(&["ab", "cd"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(2, 1)] },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::DeleteLeft)
        .unwrap();

    assert_eq!(model.get_text(), "abcd");
    assert_eq!(controller.position(), Position::new(1, 3));
}

#[test]
fn test_delete_left_at_buffer_start_is_a_no_op() {
    let mut model = TextModel::new("abc");
    let mut controller = CursorController::new(&model, CursorConfig::default());

    controller
        .trigger(&mut model, "test", CursorIntent::DeleteLeft)
        .unwrap();

    assert_eq!(model.get_text(), "abc");
    assert_eq!(controller.position(), Position::new(1, 1));
}

#[test]
fn test_delete_right_merges_with_next_line() {
    let mut model = TextModel::from_lines(&["ab", "cd"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(1, 3)] },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::DeleteRight)
        .unwrap();

    assert_eq!(model.get_text(), "abcd");
    assert_eq!(controller.position(), Position::new(1, 3));
}

#[test]
fn test_multicursor_delete_left() {
    let mut model = TextModel::from_lines(&["foo", "bar"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(1, 4), caret(2, 4)] },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::DeleteLeft)
        .unwrap();

    assert_eq!(model.get_lines(), vec!["fo", "ba"]);
    assert_eq!(controller.selections(), vec![caret(1, 3), caret(2, 3)]);
}

#[test]
fn test_delete_left_removes_whole_astral_character() {
    let mut model = TextModel::new("a\u{1F600}b");
    let mut controller = CursorController::new(&model, CursorConfig::default());
    // Column 4 sits right after the emoji (columns 2..4).
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(1, 4)] },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::DeleteLeft)
        .unwrap();

    assert_eq!(model.get_text(), "ab");
    assert_eq!(controller.position(), Position::new(1, 2));
}

#[test]
fn test_insert_line_break() {
    let mut model = TextModel::new("ab");
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(1, 2)] },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::InsertLineBreak)
        .unwrap();

    assert_eq!(model.get_lines(), vec!["a", "b"]);
    assert_eq!(controller.position(), Position::new(2, 1));
}

#[test]
fn test_tab_inserts_tab_character_by_default() {
    let mut model = TextModel::new("x");
    let mut controller = CursorController::new(&model, CursorConfig::default());

    controller
        .trigger(&mut model, "test", CursorIntent::Tab)
        .unwrap();

    assert_eq!(model.get_text(), "\tx");
    assert_eq!(controller.position(), Position::new(1, 2));
}

#[test]
fn test_tab_inserts_spaces_to_next_tab_stop() {
    let mut model = TextModel::new("ab");
    let config = CursorConfig { insert_spaces: true, ..CursorConfig::default() };
    let mut controller = CursorController::new(&model, config);
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(1, 3)] },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::Tab)
        .unwrap();

    // Caret at visible column 2, tab size 4: two spaces reach the stop.
    assert_eq!(model.get_text(), "ab  ");
    assert_eq!(controller.position(), Position::new(1, 5));
}

#[test]
fn test_tab_with_multiline_selection_indents() {
    let mut model = TextModel::from_lines(&["one", "two", "three"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections {
                selections: vec![Selection::from_anchor_active(
                    Position::new(1, 2),
                    Position::new(2, 2),
                )],
            },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::Tab)
        .unwrap();

    assert_eq!(model.get_lines(), vec!["\tone", "\ttwo", "three"]);
}

#[test]
fn test_indent_and_outdent_round_trip() {
    let mut model = TextModel::from_lines(&["one", "two"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections {
                selections: vec![Selection::from_anchor_active(
                    Position::new(1, 1),
                    Position::new(2, 4),
                )],
            },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::Indent)
        .unwrap();
    assert_eq!(model.get_lines(), vec!["\tone", "\ttwo"]);

    controller
        .trigger(&mut model, "test", CursorIntent::Outdent)
        .unwrap();
    assert_eq!(model.get_lines(), vec!["one", "two"]);
}

#[test]
fn test_cut_empty_selection_removes_whole_line() {
    let mut model = TextModel::from_lines(&["one", "two", "three"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(2, 2)] },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::Cut)
        .unwrap();

    assert_eq!(model.get_lines(), vec!["one", "three"]);
    assert_eq!(controller.position(), Position::new(2, 1));
}

#[test]
fn test_cut_empty_selection_disabled_by_config() {
    let mut model = TextModel::from_lines(&["one", "two"]);
    let config = CursorConfig { empty_selection_clipboard: false, ..CursorConfig::default() };
    let mut controller = CursorController::new(&model, config);

    controller
        .trigger(&mut model, "test", CursorIntent::Cut)
        .unwrap();

    assert_eq!(model.get_lines(), vec!["one", "two"]);
}

#[test]
fn test_cut_on_last_line_takes_preceding_break() {
    let mut model = TextModel::from_lines(&["one", "two"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(2, 2)] },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::Cut)
        .unwrap();

    assert_eq!(model.get_text(), "one");
}

#[test]
fn test_compose_replaces_code_points_around_caret() {
    let mut model = TextModel::new("ka");
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(1, 3)] },
        )
        .unwrap();

    // IME replaces the two composed ASCII letters with one kana.
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::Compose { text: "\u{304B}".into(), replace_prev: 2, replace_next: 0 },
        )
        .unwrap();

    assert_eq!(model.get_text(), "\u{304B}");
    assert_eq!(controller.position(), Position::new(1, 2));
}

#[test]
fn test_select_all_is_single_cursor() {
    let mut model = TextModel::from_lines(&["one", "two"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: vec![caret(1, 1), caret(2, 1)] },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::SelectAll)
        .unwrap();

    assert_eq!(controller.cursor_count(), 1);
    assert_eq!(
        controller.selections(),
        vec![Selection::from_anchor_active(Position::new(1, 1), Position::new(2, 4))]
    );
}

#[test]
fn test_kill_secondary_cursors() {
    let mut model = TextModel::from_lines(&["one", "two", "three"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());
    controller
        .trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections {
                selections: vec![caret(1, 2), caret(2, 2), caret(3, 2)],
            },
        )
        .unwrap();

    controller
        .trigger(&mut model, "test", CursorIntent::KillSecondaryCursors)
        .unwrap();

    assert_eq!(controller.cursor_count(), 1);
    assert_eq!(controller.position(), Position::new(1, 2));
}
