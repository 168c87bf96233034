/// Navigator behaviour driven through a recording board.

mod common;

use chessblock::{Cursor, LineId, MoveOutcome, Navigator, ParseError, PromotionPiece};
use common::{navigator, parse, sans, RecordingBoard, START_FEN};

#[test]
fn test_go_to_move_is_idempotent() {
    let mut nav = navigator("1. e4 e5 2. Nf3 Nc6 3. Bb5");
    for requested in [0, 2, 5, 17] {
        let reached = nav.go_to_move(requested);
        let cursor = nav.cursor();
        let fen = nav.current_fen();
        let renders = nav.board().updates.len();

        nav.go_to_move(reached);
        assert_eq!(nav.cursor(), cursor);
        assert_eq!(nav.current_fen(), fen);
        assert_eq!(nav.board().updates.len(), renders + 1);
        assert_eq!(nav.board().last().fen, fen);
    }
}

#[test]
fn test_new_variation_on_deviation() {
    let mut nav = navigator("1. e4 e5 2. Nc3");
    nav.go_to_move(2);

    let outcome = nav.handle_user_move("g1", "f3", None);
    let MoveOutcome::CreatedVariation(line) = outcome else {
        panic!("expected a variation, got {outcome:?}");
    };

    let tree = nav.tree();
    assert_eq!(sans(nav.result(), LineId::ROOT), ["e4", "e5", "Nc3"]);
    assert_eq!(sans(nav.result(), line), ["Nf3"]);
    let nc3 = tree.node_at(LineId::ROOT, 2).unwrap();
    assert_eq!(nc3.variations, vec![line]);
    assert!(tree.node_at(LineId::ROOT, 1).unwrap().variations.is_empty());
    assert_eq!(nav.cursor(), Cursor { line, index: 1, depth: 1 });

    // The same move again follows the variation instead of duplicating it.
    nav.go_back();
    assert_eq!(nav.cursor().line, LineId::ROOT);
    nav.go_to_move(2);
    assert_eq!(nav.handle_user_move("g1", "f3", None), MoveOutcome::EnteredVariation(line));
    assert_eq!(nav.tree().node_at(LineId::ROOT, 2).unwrap().variations.len(), 1);
}

#[test]
fn test_continuing_inside_a_variation_extends_it() {
    let mut nav = navigator("1. e4 e5 (1... c5) 2. Nf3");
    nav.go_to_move(1);
    let c5 = nav.tree().node_at(LineId::ROOT, 1).unwrap().variations[0];
    nav.go_to_variation(LineId::ROOT, 1, 0);
    nav.go_to_end();

    assert_eq!(nav.handle_user_move("g1", "f3", None), MoveOutcome::Extended);
    assert_eq!(sans(nav.result(), c5), ["c5", "Nf3"]);
    assert_eq!(nav.cursor(), Cursor { line: c5, index: 2, depth: 1 });
    assert!(nav.export_text().starts_with("1. e4 e5 (1... c5 2. Nf3) 2. Nf3"));
}

#[test]
fn test_back_out_of_variation_to_branch_point() {
    let mut nav = navigator("1. d4 d5 2. c4 (2. Nf3 Nf6 3. c4) 2... e6");
    let nf3_line = nav.tree().node_at(LineId::ROOT, 2).unwrap().variations[0];
    nav.go_to_move_in_line(nf3_line, 3);
    assert_eq!(nav.current_node().unwrap().san, "c4");

    nav.go_to_start();
    assert_eq!(nav.cursor(), Cursor { line: nf3_line, index: 0, depth: 1 });
    nav.go_to_start();
    assert_eq!(nav.cursor(), Cursor { line: LineId::ROOT, index: 3, depth: 0 });
    assert_eq!(nav.current_node().unwrap().san, "c4");

    nav.go_to_start();
    assert_eq!(nav.current_fen(), START_FEN);
    assert_eq!(nav.board().last().last_move, None);
}

#[test]
fn test_forward_stops_at_end() {
    let mut nav = navigator("1. e4");
    assert_eq!(nav.go_forward(), 1);
    assert_eq!(nav.go_forward(), 1);
    assert!(nav.is_at_end());
    assert_eq!(nav.go_back(), 0);
    assert_eq!(nav.go_back(), 0);
}

#[test]
fn test_check_is_reported() {
    let mut nav = navigator("1. e4 f5 2. Qh5+");
    nav.go_to_end();
    assert!(nav.board().last().check);
    assert_eq!(
        nav.board().last().last_move,
        Some(("d1".to_string(), "h5".to_string()))
    );
}

#[test]
fn test_block_overlays_only_at_initial_position() {
    let mut nav = navigator("[ply: 1]\n[circle: e4 yellow]\n1. e4 e5");
    assert_eq!(nav.board().last().shapes.circles.len(), 1);
    nav.go_forward();
    assert!(nav.board().last().shapes.is_empty());
    nav.go_back();
    assert_eq!(nav.board().last().shapes.circles[0].color, "#e68f00");
}

#[test]
fn test_noedit_board_rejects_moves() {
    let mut nav = navigator("[noedit]\n1. e4 e5");
    assert_eq!(nav.board().last().legal_destinations, None);
    assert_eq!(nav.handle_user_move("e2", "e4", None), MoveOutcome::Rejected);
    assert_eq!(nav.cursor().index, 0);
}

#[test]
fn test_legal_destinations_at_start() {
    let nav = navigator("1. e4");
    let dests = nav.board().last().legal_destinations.clone().unwrap();
    assert_eq!(dests.values().map(Vec::len).sum::<usize>(), 20);
    assert_eq!(dests["g1"], ["f3", "h3"]);
}

#[test]
fn test_underpromotion_from_board() {
    let mut nav = navigator("[FEN \"8/1P6/8/8/8/8/6k1/4K3 w - - 0 1\"]\n\n1. Kd1");
    assert_eq!(nav.handle_user_move("b7", "b8", None), MoveOutcome::PromotionRequired);
    assert_eq!(
        nav.board().promotion_requests,
        [("b7".to_string(), "b8".to_string())]
    );
    let outcome = nav.resolve_promotion(Some(PromotionPiece::Rook));
    assert!(matches!(outcome, MoveOutcome::CreatedVariation(_)));
    assert_eq!(nav.current_node().unwrap().san, "b8=R");
}

#[test]
fn test_failed_parse_is_not_navigable() {
    let refused = Navigator::new(parse("[FEN \"8/8/8\"]\n1. e4"), RecordingBoard::default());
    assert!(matches!(refused, Err(ParseError::InvalidFen { .. })));
}

#[test]
fn test_jump_to_missing_line_keeps_position() {
    let mut nav = navigator("1. e4 e5 (1... c5) 2. Nf3");
    nav.go_to_move(2);
    let before = nav.cursor();
    let renders = nav.board().updates.len();

    assert_eq!(nav.go_to_variation(LineId(5), 0, 1), None);
    assert_eq!(nav.go_to_move_in_line(LineId(5), 1), None);
    assert_eq!(nav.cursor(), before);
    assert_eq!(nav.board().updates.len(), renders);
}
