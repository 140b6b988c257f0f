use crate::lexer::TokenStream;
use crate::token::TokenKind;

fn dump(source: &str) -> String {
    TokenStream::new(source)
        .map(|token| format!("{token} | line {}", token.line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn keywords() {
    insta::assert_snapshot!(
        dump("func while if else return break continue par seq c_channel s_channel"),
        @r"
    {func, FUNC} | line 1
    {while, WHILE} | line 1
    {if, IF} | line 1
    {else, ELSE} | line 1
    {return, RETURN} | line 1
    {break, BREAK} | line 1
    {continue, CONTINUE} | line 1
    {par, PAR} | line 1
    {seq, SEQ} | line 1
    {c_channel, C_CHANNEL} | line 1
    {s_channel, S_CHANNEL} | line 1
    ");
}

#[test]
fn type_words_and_booleans() {
    insta::assert_snapshot!(dump("number bool string void true false neither"), @r"
    {number, TYPE} | line 1
    {bool, TYPE} | line 1
    {string, TYPE} | line 1
    {void, TYPE} | line 1
    {true, TRUE} | line 1
    {false, FALSE} | line 1
    {neither, ID} | line 1
    ");
}

#[test]
fn declaration_statement() {
    insta::assert_snapshot!(dump("x : number = 42"), @r"
    {x, ID} | line 1
    {:, :} | line 1
    {number, TYPE} | line 1
    {=, =} | line 1
    {42, NUMBER} | line 1
    ");
}

#[test]
fn number_literals() {
    insta::assert_snapshot!(dump("12 3.14 .5 0"), @r"
    {12, NUMBER} | line 1
    {3.14, NUMBER} | line 1
    {.5, NUMBER} | line 1
    {0, NUMBER} | line 1
    ");
}

#[test]
fn string_literals_drop_quotes() {
    insta::assert_snapshot!(dump(r#""hello" "two words""#), @r"
    {hello, STRING} | line 1
    {two words, STRING} | line 1
    ");
}

#[test]
fn operators() {
    insta::assert_snapshot!(dump("-> || && == != <= >= < > = + - * / %"), @r"
    {->, ->} | line 1
    {||, ||} | line 1
    {&&, &&} | line 1
    {==, ==} | line 1
    {!=, !=} | line 1
    {<=, <=} | line 1
    {>=, >=} | line 1
    {<, <} | line 1
    {>, >} | line 1
    {=, =} | line 1
    {+, +} | line 1
    {-, -} | line 1
    {*, *} | line 1
    {/, /} | line 1
    {%, %} | line 1
    ");
}

#[test]
fn two_char_operators_win_over_single() {
    let kinds: Vec<TokenKind> = TokenStream::new("a>=b").map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Ident, TokenKind::GtEq, TokenKind::Ident]
    );
}

#[test]
fn comments_are_skipped_and_lines_tracked() {
    let source = "a : number = 1 # trailing\nb : number = 2\n/* multi\nline */\nc : number = 3";
    insta::assert_snapshot!(dump(source), @r"
    {a, ID} | line 1
    {:, :} | line 1
    {number, TYPE} | line 1
    {=, =} | line 1
    {1, NUMBER} | line 1
    {b, ID} | line 2
    {:, :} | line 2
    {number, TYPE} | line 2
    {=, =} | line 2
    {2, NUMBER} | line 2
    {c, ID} | line 5
    {:, :} | line 5
    {number, TYPE} | line 5
    {=, =} | line 5
    {3, NUMBER} | line 5
    ");
}

#[test]
fn unknown_characters_become_their_own_tag() {
    insta::assert_snapshot!(dump("x = 1 ; @"), @r"
    {x, ID} | line 1
    {=, =} | line 1
    {1, NUMBER} | line 1
    {;, ;} | line 1
    {@, @} | line 1
    ");
}

#[test]
fn keyword_prefixes_stay_identifiers() {
    let kinds: Vec<TokenKind> = TokenStream::new("func_name iffy returns").map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Ident]
    );
}

#[test]
fn empty_source_yields_no_tokens() {
    assert_eq!(TokenStream::new("").count(), 0);
    assert_eq!(TokenStream::new("  # only a comment\n").count(), 0);
}

#[test]
fn eof_token_sits_past_the_source() {
    let mut stream = TokenStream::new("x\ny");
    while stream.next().is_some() {}
    let eof = stream.eof();
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(eof.span, 3..3);
    assert_eq!(eof.line, 2);
}
