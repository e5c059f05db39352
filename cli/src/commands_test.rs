use super::*;

#[test]
fn blank_lines_are_skipped() {
    assert_eq!(parse_line("   "), Ok(None));
}

#[test]
fn note_and_zone_take_optional_color() {
    assert_eq!(parse_line("note"), Ok(Some(LineCommand::Note(None))));
    assert_eq!(parse_line("note Pink"), Ok(Some(LineCommand::Note(Some(Color::Pink)))));
    assert_eq!(parse_line("zone green"), Ok(Some(LineCommand::Zone(Some(Color::Green)))));
    assert!(matches!(parse_line("note teal"), Err(ParseError::Color(_))));
    assert_eq!(parse_line("zone a b"), Err(ParseError::Usage("zone [color]")));
}

#[test]
fn geometry_commands_parse_numbers() {
    assert_eq!(
        parse_line("move abc 10 20.5"),
        Ok(Some(LineCommand::Move { id: "abc".into(), x: 10.0, y: 20.5 }))
    );
    assert_eq!(
        parse_line("resize z1 400 250"),
        Ok(Some(LineCommand::Resize { id: "z1".into(), width: 400.0, height: 250.0 }))
    );
    assert_eq!(parse_line("move abc ten 20"), Err(ParseError::Number("ten".into())));
    assert_eq!(parse_line("move abc 1 NaN"), Err(ParseError::Number("NaN".into())));
    assert_eq!(parse_line("move abc"), Err(ParseError::Usage("move <id> <x> <y>")));
}

#[test]
fn text_keeps_inner_spacing() {
    assert_eq!(
        parse_line("text n1   buy  milk "),
        Ok(Some(LineCommand::Text { id: "n1".into(), text: "buy  milk".into() }))
    );
    assert_eq!(parse_line("text n1"), Ok(Some(LineCommand::Text { id: "n1".into(), text: String::new() })));
    assert_eq!(parse_line("text"), Err(ParseError::Usage("text <id> <text...>")));
}

#[test]
fn aliases_and_unknowns() {
    assert_eq!(parse_line("rm n1"), Ok(Some(LineCommand::Delete { id: "n1".into() })));
    assert_eq!(parse_line("LS"), Ok(Some(LineCommand::List)));
    assert_eq!(parse_line("quit"), Ok(Some(LineCommand::Leave)));
    assert_eq!(parse_line("color n1 orange"), Ok(Some(LineCommand::Recolor { id: "n1".into(), color: Color::Orange })));
    assert_eq!(parse_line("fly n1"), Err(ParseError::Unknown("fly".into())));
}
