use pretty_assertions::assert_eq;

use super::*;

const VAR: Expect = Expect::VARIABLE;

#[test]
fn navigation_and_lookaround() {
	let mut tokens = Tokens::new("$a + $b");
	assert!(tokens.previous().is_none());
	assert_eq!(tokens.text(), Some("$a"));
	assert_eq!(tokens.peek().map(|t| t.text.as_str()), Some("+"));

	tokens.advance();
	assert!(tokens.is_prev(&[VAR]));
	assert!(tokens.is(&[Expect::Class(ClassSet::BINARY)]));
	assert!(tokens.is_next(&[VAR]));

	tokens.advance().advance();
	assert!(tokens.is_end());
	assert!(tokens.current().is_none());
	tokens.advance();
	assert_eq!(tokens.position(), 3);

	tokens.back();
	assert!(tokens.is_last());
	tokens.end();
	assert!(tokens.is_end());
}

#[test]
fn expect_one_of_moves_then_checks() {
	let mut tokens = Tokens::new("foreach $list as $item");
	let token = tokens.expect_one_of(&[VAR]).expect("variable after foreach");
	assert_eq!(token.text, "$list");

	let err = tokens.expect_one_of(&[VAR]).unwrap_err();
	assert_eq!(err.found.as_deref(), Some("as"));
	assert_eq!(err.message, "unexpected token 'as', expected 'variable'");
}

#[test]
fn expect_and_consume_returns_text() {
	let mut tokens = Tokens::new("foreach $list as $item");
	assert_eq!(tokens.expect_and_consume(&[VAR]).unwrap(), "$list");
	assert_eq!(tokens.text(), Some("as"));
}

#[test]
fn expecting_past_the_end_fails() {
	let mut tokens = Tokens::new("$x");
	let err = tokens.expect_one_of(&[Expect::punct(")")]).unwrap_err();
	assert_eq!(err.found, None);
	assert_eq!(err.message, "unexpected end of expression, expected ')'");
	assert_eq!(err.line, 1);
}

#[test]
fn class_expectations_carry_no_label() {
	let tokens = Tokens::new("(");
	let err = tokens.need(&[Expect::from(Class::Scalar)]).unwrap_err();
	assert_eq!(err.expected, None);
	assert_eq!(err.message, "unexpected token '('");
}

#[test]
fn advance_if_one_of_is_a_noop_on_mismatch() {
	let mut tokens = Tokens::new("as $item");
	assert!(!tokens.advance_if_one_of(&[VAR]));
	assert_eq!(tokens.position(), 0);
	assert!(tokens.advance_if_one_of(&[Expect::NAME]));
	assert_eq!(tokens.text(), Some("$item"));
}

#[test]
fn collect_until_stops_on_stop_token() {
	let mut tokens = Tokens::new("page . header -top | upper");
	let raw = tokens.collect_until(&[Expect::punct("|")]);
	assert_eq!(raw, "page . header -top ");
	assert_eq!(tokens.text(), Some("|"));
}

#[test]
fn collect_until_runs_to_end_without_stop() {
	let mut tokens = Tokens::new("a b  c");
	assert_eq!(tokens.collect_until(&[]), "a b  c");
	assert!(tokens.is_end());
}

#[test]
fn filter_drops_comments() {
	let mut tokens = Tokens::new("$a /* why */ + 1");
	tokens.filter(|t| t.kind != TokenKind::Comment);
	let texts: Vec<&str> = tokens.as_slice().iter().map(|t| t.text.as_str()).collect();
	assert_eq!(texts, vec!["$a", "+", "1"]);
}

#[test]
fn splice_relexes_tail_with_appended_text() {
	let mut tokens = Tokens::new("$i = 1 to 10");
	tokens.end();
	let len = tokens.len();
	tokens.splice(len, " step 1");
	assert_eq!(tokens.substr(0, None), "$i = 1 to 10 step 1");
	assert_eq!(tokens.position(), len);
	assert_eq!(tokens.text(), Some("step"));
}

#[test]
fn splice_merges_with_remaining_text() {
	let mut tokens = Tokens::new("$a + 1");
	tokens.splice(2, "0 * 2");
	let texts: Vec<&str> = tokens.as_slice().iter().map(|t| t.text.as_str()).collect();
	assert_eq!(texts, vec!["$a", "+", "10", "*", "2"]);
	assert_eq!(tokens.position(), 0);
}

#[test]
fn splice_moves_a_cursor_past_the_offset_back() {
	let mut tokens = Tokens::new("$a + 1 * 2");
	tokens.advance().advance().advance();
	assert_eq!(tokens.text(), Some("*"));

	tokens.splice(1, " - 4");
	assert_eq!(tokens.position(), 1);
	assert_eq!(tokens.text(), Some("+"));
	assert_eq!(tokens.substr(0, None), "$a + 1 * 2 - 4");
	assert_eq!(tokens.len(), 7);
}

#[test]
fn splice_keeps_line_numbers() {
	let mut tokens = Tokens::with_line("$a\n+ 1", 4);
	tokens.splice(1, "\n* 2");
	let lines: Vec<u32> = tokens.as_slice().iter().map(|t| t.line).collect();
	assert_eq!(lines, vec![4, 5, 5, 6, 6]);
}

#[test]
fn describe_covers_end_and_tokens() {
	let mut tokens = Tokens::new("$a");
	assert_eq!(tokens.describe(None), "unexpected token '$a'");
	tokens.end();
	assert_eq!(tokens.describe(Some("}")), "unexpected end of expression, expected '}'");
}

#[test]
fn describe_names_the_token_after_a_line_break() {
	let mut tokens = Tokens::new("$a\n   )");
	tokens.advance();
	assert_eq!(tokens.describe(None), "unexpected token ')'");
}

#[test]
fn snippet_is_bounded_and_marks_newlines() {
	let mut tokens = Tokens::new("a b\nc d e f");
	tokens.advance().advance();
	let texts: Vec<&str> = tokens.snippet(1, 1).iter().map(|t| t.text.as_str()).collect();
	assert_eq!(texts, vec!["b", "c", "d"]);
	assert_eq!(tokens.snippet_string(2, 0), "a b↵c");
	assert_eq!(tokens.snippet_string(0, 100), "c d e f");
}

#[test]
fn snippet_of_empty_stream_is_empty() {
	let tokens = Tokens::new("");
	assert!(tokens.snippet(3, 3).is_empty());
	assert_eq!(tokens.snippet_string(3, 3), "");
}

#[test]
fn unexpected_carries_snippet_and_line() {
	let mut tokens = Tokens::with_line("if $x >\n)", 3);
	tokens.advance().advance().advance();
	let err = tokens.unexpected(&[Expect::VARIABLE]);
	assert_eq!(err.line, 4);
	assert_eq!(err.snippet, "if $x >↵)");
}

#[test]
fn take_keyword_names_the_missing_word() {
	let mut tokens = Tokens::new("$list as $item");
	let err = tokens.take_keyword("as").unwrap_err();
	assert_eq!(err.message, "unexpected token '$list', expected 'as'");
	tokens.advance();
	tokens.take_keyword("as").expect("keyword present");
	assert_eq!(tokens.text(), Some("$item"));
}
