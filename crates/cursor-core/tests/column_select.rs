use cursor_core::{
    CursorConfig, CursorController, CursorIntent, Position, Selection, TextModel,
};

#[test]
fn test_column_select_one_selection_per_line() {
    let mut model = TextModel::from_lines(&["alpha", "beta", "gamma"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());

    controller
        .trigger(
            &mut model,
            "mouse",
            CursorIntent::ColumnSelect {
                anchor: Position::new(1, 2),
                to_line: 3,
                to_visible_column: 4,
            },
        )
        .unwrap();

    assert_eq!(
        controller.selections(),
        vec![
            Selection::from_anchor_active(Position::new(1, 2), Position::new(1, 5)),
            Selection::from_anchor_active(Position::new(2, 2), Position::new(2, 5)),
            Selection::from_anchor_active(Position::new(3, 2), Position::new(3, 5)),
        ]
    );
}

#[test]
fn test_column_select_upward_keeps_anchor_line_primary() {
    let mut model = TextModel::from_lines(&["alpha", "beta", "gamma"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());

    controller
        .trigger(
            &mut model,
            "mouse",
            CursorIntent::ColumnSelect {
                anchor: Position::new(3, 1),
                to_line: 1,
                to_visible_column: 2,
            },
        )
        .unwrap();

    assert_eq!(controller.cursor_count(), 3);
    // The anchor's line stays primary; the extension grows upward.
    assert_eq!(controller.selections()[0].anchor(), Position::new(3, 1));
    assert_eq!(controller.selections()[2].anchor(), Position::new(1, 1));
}

#[test]
fn test_column_select_clamps_on_short_lines() {
    let mut model = TextModel::from_lines(&["alpha", "x", "gamma"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());

    controller
        .trigger(
            &mut model,
            "mouse",
            CursorIntent::ColumnSelect {
                anchor: Position::new(1, 1),
                to_line: 3,
                to_visible_column: 4,
            },
        )
        .unwrap();

    let selections = controller.selections();
    assert_eq!(selections.len(), 3);
    // The short line contributes what it has.
    assert_eq!(selections[1].active(), Position::new(2, 2));
    assert_eq!(selections[2].active(), Position::new(3, 5));
}

#[test]
fn test_column_select_typing_edits_every_line() {
    let mut model = TextModel::from_lines(&["aa", "bb", "cc"]);
    let mut controller = CursorController::new(&model, CursorConfig::default());

    controller
        .trigger(
            &mut model,
            "mouse",
            CursorIntent::ColumnSelect {
                anchor: Position::new(1, 2),
                to_line: 3,
                to_visible_column: 1,
            },
        )
        .unwrap();
    controller
        .trigger(&mut model, "keyboard", CursorIntent::Type { text: "X".into() })
        .unwrap();

    assert_eq!(model.get_lines(), vec!["aXa", "bXb", "cXc"]);
}

#[test]
fn test_column_select_respects_cursor_cap() {
    let lines: Vec<String> = (0..10).map(|i| format!("line {i}")).collect();
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut model = TextModel::from_lines(&line_refs);
    let config = CursorConfig { max_cursor_count: 4, ..CursorConfig::default() };
    let mut controller = CursorController::new(&model, config);

    controller
        .trigger(
            &mut model,
            "mouse",
            CursorIntent::ColumnSelect {
                anchor: Position::new(1, 1),
                to_line: 10,
                to_visible_column: 0,
            },
        )
        .unwrap();

    assert_eq!(controller.cursor_count(), 4);
}
