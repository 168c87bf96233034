/// End-to-end block parsing: markers, classification, tree building and
/// fatal errors.

mod common;

use chessblock::fen::normalize_fen;
use chessblock::tokenizer::{tokenize, Token};
use chessblock::{BlockKind, LineId, Nag, ParseError, Side};
use common::{parse, sans, START_FEN};

#[test]
fn test_marker_orientation_last_wins() {
    let result = parse("[white]\n[black]\n1. e4");
    assert_eq!(result.orientation, Side::Black);
}

#[test]
fn test_arrow_markers_with_and_without_color() {
    let result = parse("[arrow: e2e4]\n[arrow: d2d4 blue]\n1. e4");
    let arrows = &result.overlays.arrows;
    assert_eq!(arrows.len(), 2);
    assert_eq!((arrows[0].from.as_str(), arrows[0].to.as_str()), ("e2", "e4"));
    assert_eq!(arrows[0].color, "#15781B");
    assert_eq!(arrows[1].color, "#003088");
}

#[test]
fn test_separator_splits_markers_from_data() {
    let result = parse("[noedit]\n[ply: 2]\n---\n[Event \"Club\"]\n\n1. d4 d5 2. c4");
    assert!(result.is_ok());
    assert!(!result.editable);
    assert_eq!(result.ply_offset, 2);
    assert_eq!(result.headers.get("Event"), Some("Club"));
    assert_eq!(sans(&result, LineId::ROOT), ["d4", "d5", "c4"]);
}

#[test]
fn test_normalize_fills_defaults() {
    assert_eq!(normalize_fen("8/8/8/8/8/8/8/8"), "8/8/8/8/8/8/8/8 w - - 0 1");
    assert_eq!(
        normalize_fen("4k3/8/8/8/8/8/8/4K3 b -"),
        "4k3/8/8/8/8/8/8/4K3 b - - 0 1"
    );
}

#[test]
fn test_malformed_move_is_skipped_with_warning() {
    let result = parse("1. e4 Xyz e5");
    assert!(result.is_ok());
    assert_eq!(sans(&result, LineId::ROOT), ["e4", "e5"]);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("\"Xyz\""));
    assert!(result.warnings[0].contains("after 1 parsed moves"));
}

#[test]
fn test_tokenizer_stream() {
    let tokens = tokenize("1. e4 {good} (1... d5 2. exd5) e5");
    assert_eq!(
        tokens,
        vec![
            Token::Move("e4".into()),
            Token::Comment("good".into()),
            Token::OpenVariation,
            Token::Move("d5".into()),
            Token::Move("exd5".into()),
            Token::CloseVariation,
            Token::Move("e5".into()),
        ]
    );
}

#[test]
fn test_full_game_block() {
    let input = "\
[title: Scandinavian]
[arrow: d7d5 red]
[Event \"Casual\"]
[White \"Anna\"]
[Black \"Ben\"]
[Result \"0-1\"]

1. e4 d5!? {The Scandinavian [%csl Rd5]} 2. exd5 Qxd5 (2... Nf6 $10 3. d4) 3. Nc3 Qa5 0-1";
    let result = parse(input);
    assert!(result.is_ok(), "{:?}", result.error);
    assert_eq!(result.kind, BlockKind::Game);
    assert_eq!(result.headers.len(), 4);
    assert_eq!(result.overlays.arrows[0].color, "#882020");
    assert_eq!(sans(&result, LineId::ROOT), ["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5"]);

    let d5 = result.tree.node_at(LineId::ROOT, 1).unwrap();
    assert_eq!(d5.nag, Some(Nag::SPECULATIVE_MOVE));
    assert_eq!(d5.comment.as_deref(), Some("The Scandinavian"));
    assert_eq!(d5.annotations.circles[0].square, "d5");

    let qxd5 = result.tree.node_at(LineId::ROOT, 3).unwrap();
    let alternative = qxd5.variations[0];
    assert_eq!(sans(&result, alternative), ["Nf6", "d4"]);
    assert_eq!(result.tree.node_at(alternative, 0).unwrap().nag, Some(Nag(10)));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_castling_reports_king_squares() {
    let result = parse("1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O");
    let castle = result.tree.node_at(LineId::ROOT, 6).unwrap();
    assert_eq!(castle.san, "O-O");
    assert_eq!((castle.from.as_str(), castle.to.as_str()), ("e1", "g1"));
}

#[test]
fn test_sloppy_notation_is_accepted() {
    let result = parse("1. e2-e4 e7e5 2. Ng1f3 0-0-0");
    assert_eq!(sans(&result, LineId::ROOT), ["e4", "e5", "Nf3"]);
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_fatal_errors() {
    assert_eq!(parse("   ").error, Some(ParseError::NoData));
    assert!(matches!(
        parse("[FEN \"not a fen\"]\n1. e4").error,
        Some(ParseError::InvalidFen { .. })
    ));
    assert_eq!(
        parse("[puzzle]\n4k3/8/8/8/8/8/8/4K3 w").error,
        Some(ParseError::PuzzleIsPosition)
    );
}

#[test]
fn test_tag_pairs_alone_carry_no_game() {
    let result = parse("[Event \"Casual\"]\n[White \"Anna\"]\n[Result \"*\"]");
    assert_eq!(result.error, Some(ParseError::NoData));
    assert_eq!(result.headers.len(), 3);
}

#[test]
fn test_result_serializes_to_json() {
    let result = parse("[black]\n1. e4 {hi} e5");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["kind"], "game");
    assert_eq!(json["orientation"], "black");
    assert_eq!(json["tree"]["nodes"][0]["comment"], "hi");
    assert_ne!(json["tree"]["nodes"][0]["fen"], START_FEN);
    assert_eq!(json["tree"]["lines"][0], serde_json::json!([0, 1]));
}
