use std::{fs, sync::Arc};

use cucumber_lens::{
    scanner::{
        EditorInfo, Lexer, State, Token, TokenColor, TokenInfo, TokenKind,
        TokenTriggers, TokenType,
    },
    step::{Declaration, Location, Point},
    LineScanner, StepIndex,
};

fn index(patterns: &[&str]) -> Arc<StepIndex> {
    let index = StepIndex::new();
    _ = index.reprocess_literals(
        "Steps",
        patterns.iter().zip(1..).map(|(p, line)| {
            Declaration::new("TechTalk.SpecFlow.GivenAttribute", format!("@\"{p}\""))
                .at(Location::new("Steps.cs", Point::new(line, 1), Point::new(line, 9)))
                .owned_by(format!("Steps.M{line}"))
        }),
    );
    Arc::new(index)
}

/// Scans the whole `text` line by line, as an editor host does.
fn scan_document(
    scanner: &mut LineScanner,
    text: &str,
) -> Vec<(usize, String, TokenInfo)> {
    let mut state = State::default();
    let mut offset = 0;
    let mut out = vec![];
    for (n, line) in text.lines().enumerate() {
        let chars = line.chars().collect::<Vec<_>>();
        scanner.set_source(line, offset);
        let mut info = TokenInfo::default();
        while scanner.scan_token(&mut info, &mut state) {
            let token = chars[info.start_index - offset..=info.end_index - offset]
                .iter()
                .collect();
            out.push((n + 1, token, info));
        }
        offset += chars.len() + 1;
    }
    out
}

#[test]
fn highlights_recognized_steps_of_feature_file() {
    let text = fs::read_to_string("tests/features/cart.feature").unwrap();
    let mut scanner = LineScanner::new();
    scanner.attach_step_index(index(&[r"I have (\d+) items in my cart", "the cart is empty"]));

    let tokens = scan_document(&mut scanner, &text);

    let recognized = tokens
        .iter()
        .filter(|(_, _, i)| i.color == TokenColor::RecognizedStep)
        .map(|(line, text, _)| (*line, text.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        recognized,
        [(5, "I have 3 items in my cart"), (10, "the cart is empty")],
    );

    let unrecognized = tokens
        .iter()
        .find(|(_, text, _)| text == "I pay with a coupon")
        .unwrap();
    assert_eq!(unrecognized.2.ty, TokenType::Identifier);
    assert_eq!(unrecognized.2.color, TokenColor::Text);
}

#[test]
fn doc_string_lines_are_never_steps() {
    let text = fs::read_to_string("tests/features/cart.feature").unwrap();
    let mut scanner = LineScanner::new();
    scanner.attach_step_index(index(&["this doc string is never a step"]));

    let tokens = scan_document(&mut scanner, &text);

    let doc_line = tokens.iter().find(|(line, _, _)| *line == 8).unwrap();
    assert_eq!(doc_line.1, "Given this doc string is never a step");
    assert_eq!(doc_line.2.ty, TokenType::String);
    assert!(tokens
        .iter()
        .all(|(_, _, i)| i.color != TokenColor::RecognizedStep));
}

#[test]
fn token_spans_are_document_offsets() {
    let mut scanner = LineScanner::new();
    let mut state = State::default();

    let first = scanner.scan_line("Feature: Café", 0, &mut state);
    let second = scanner.scan_line("  Scenario: a", 14, &mut state);

    assert_eq!((first[1].start_index, first[1].end_index), (9, 12));
    assert_eq!((second[0].start_index, second[0].end_index), (16, 24));
}

#[test]
fn table_row_triggers() {
    let mut scanner = LineScanner::new();
    let infos = scanner.scan_line("| <start> | 12 |", 0, &mut State::default());

    assert_eq!(infos.len(), 5);
    assert_eq!(infos[0].trigger, TokenTriggers::PARAMETER_NEXT);
    assert_eq!(
        infos[1].trigger,
        TokenTriggers::PARAMETER_START | TokenTriggers::PARAMETER_END,
    );
    assert_eq!(infos[1].color, TokenColor::Number);
    assert!(infos[3].trigger.is_empty());
}

#[test]
fn error_token_ends_line() {
    let mut scanner = LineScanner::new();
    let mut info = TokenInfo::default();
    let mut state = State::default();
    scanner.set_source("| <broken | 1 |", 0);

    assert!(scanner.scan_token(&mut info, &mut state));
    assert!(!scanner.scan_token(&mut info, &mut state));
    assert_eq!((info.start_index, info.end_index), (0, 0));
}

#[test]
fn index_updates_are_seen_by_attached_scanner() {
    let index = index(&[]);
    let mut scanner = LineScanner::new();
    scanner.attach_step_index(Arc::clone(&index));

    let before = scanner.scan_line("When I wait", 0, &mut State::default());
    assert_eq!(before[1].color, TokenColor::Text);

    _ = index.reprocess_literals(
        "Late",
        [Declaration::new("TechTalk.SpecFlow.WhenAttribute", "\"I wait\"")
            .at(Location::new("Late.cs", Point::new(1, 1), Point::new(1, 5)))
            .owned_by("Late.Wait")],
    );

    let after = scanner.scan_line("When I wait", 0, &mut State::default());
    assert_eq!(after[1].color, TokenColor::RecognizedStep);
}

/// Grammar whose every word is an identifier, keyed as a keyword.
#[derive(Debug, Default)]
struct Words {
    words: Vec<(usize, String)>,
}

impl Lexer for Words {
    fn set_source(&mut self, text: &str, offset: usize) {
        let mut pos = offset;
        self.words = text
            .split(' ')
            .map(|w| {
                let word = (pos, w.to_owned());
                pos += w.chars().count() + 1;
                word
            })
            .rev()
            .collect();
    }

    fn read_token(&mut self, _: &mut State) -> Option<Token> {
        let (pos, word) = self.words.pop()?;
        Some(
            Token::new(TokenKind::Identifier, pos, word).with_key_info(
                EditorInfo::new(TokenType::Keyword, TokenColor::Keyword),
            ),
        )
    }
}

#[test]
fn reattached_index_applies_from_next_token() {
    let mut scanner = LineScanner::new();
    let mut state = State::default();
    scanner.attach_step_index(index(&["I log in"]));

    scanner.set_source("Given I log in", 0);
    assert_eq!(scanner.next_token(&mut state).map(|i| i.ty), Some(TokenType::Keyword));
    scanner.attach_step_index(index(&["I log out"]));
    let text = scanner.next_token(&mut state).unwrap();
    assert_eq!(text.color, TokenColor::Text);

    let infos = scanner.scan_line("When I log out", 15, &mut state);
    assert_eq!(infos[1].color, TokenColor::RecognizedStep);
    assert_eq!(scanner.step_index().map(|i| i.len()), Some(1));
}

#[test]
fn custom_grammar() {
    let mut scanner = LineScanner::with_lexer(Words::default());
    scanner.attach_step_index(index(&["go"]));

    let infos = scanner.scan_line("stop go  run", 0, &mut State::default());

    assert_eq!(infos.len(), 2, "empty word ends the line");
    assert_eq!(infos[0].color, TokenColor::Keyword);
    assert_eq!(infos[1].color, TokenColor::RecognizedStep);
    assert_eq!((infos[1].start_index, infos[1].end_index), (5, 6));
}
