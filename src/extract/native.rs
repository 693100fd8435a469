//! Native-text alignment.
//!
//! A page from a digital-text source yields two independent extractions:
//! the flowing page text (whitespace-normalized lines of words) and a list
//! of positioned word tokens in reading order. The two extractors do not
//! segment text identically: a token may cover only part of a text word,
//! or span what the text extraction split into several words. This module
//! reconciles the two streams into one block tree: LINE blocks carrying the
//! flowing line text, WORD blocks carrying the tokens and their geometry.
//!
//! The merge is a deterministic single pass with two cursors, one per
//! stream. It is a best-effort heuristic: downstream annotation geometry
//! depends on the exact alignment it produces, so its documented behavior
//! is preserved as-is rather than extended to handle every theoretically
//! possible tokenization divergence.

use crate::model::{Block, BlockType, BoundingBox, Geometry, IdGenerator, Relationship};
use crate::source::WordToken;

/// Cursor state for the two-stream merge.
///
/// `word_sub` and `token_sub` are byte offsets already consumed within the
/// current line word and token text respectively.
#[derive(Debug, Default)]
struct AlignCursor {
    line_idx: usize,
    word_idx: usize,
    word_sub: usize,
    token_idx: usize,
    token_sub: usize,
}

/// Tokens accumulated for one output line, tagged with the source line they
/// were matched against. Holds indices into the caller's token slice.
#[derive(Debug)]
struct LineTokens {
    line_idx: usize,
    tokens: Vec<usize>,
}

/// Align the flowing page text with the positioned word tokens and build
/// the block tree for one page.
///
/// Returns the ordered flat block sequence: each LINE immediately followed
/// by its WORD children. Empty page text, or no tokens, yields an empty
/// list. Lines that never accumulate a token are dropped.
pub fn align_page(
    text: &str,
    tokens: &[WordToken],
    page_number: u32,
    page_width: f64,
    page_height: f64,
    ids: &mut dyn IdGenerator,
) -> Vec<Block> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() || tokens.is_empty() {
        return Vec::new();
    }

    let line_words: Vec<Vec<&str>> = lines
        .iter()
        .map(|line| line.split_whitespace().collect())
        .collect();

    let grouped = group_tokens(&line_words, tokens);
    build_blocks(&line_words, tokens, &grouped, page_number, page_width, page_height, ids)
}

/// Run the two-cursor merge, grouping token indices by output line.
fn group_tokens(line_words: &[Vec<&str>], tokens: &[WordToken]) -> Vec<LineTokens> {
    let mut cursor = AlignCursor::default();
    let mut finished: Vec<LineTokens> = Vec::new();
    let mut current = LineTokens {
        line_idx: 0,
        tokens: Vec::new(),
    };

    while cursor.token_idx < tokens.len() {
        let word = line_words[cursor.line_idx][cursor.word_idx];
        let token_text = tokens[cursor.token_idx].text.as_str();
        let word_rest = tail(word, cursor.word_sub);
        let token_rest = tail(token_text, cursor.token_sub);

        if let Some(found) = word_rest.find(token_rest) {
            // The token fragment fits within the remaining line word.
            if word_rest == head(token_text, cursor.token_sub) {
                // The word remainder is exactly the token's already-consumed
                // prefix; the whole word is spoken for.
                cursor.word_sub = word.len();
            } else {
                cursor.word_sub += found + token_rest.len();
            }
            current.tokens.push(cursor.token_idx);
            if cursor.word_sub == word.len() {
                advance_word(&mut cursor, line_words, &mut finished, &mut current);
            }
            cursor.token_idx += 1;
            cursor.token_sub = 0;
        } else {
            // The line word is shorter than what the token represents:
            // consume the word remainder against the token and re-examine
            // the same token at the next word.
            cursor.token_sub += word_rest.len();
            advance_word(&mut cursor, line_words, &mut finished, &mut current);
        }
    }

    if !current.tokens.is_empty() {
        finished.push(current);
    }
    finished
}

/// Advance the word cursor, rolling to the next line when the current one is
/// exhausted. A line roll flushes the accumulated tokens. At the very end of
/// the text the cursor stays on the last word so any remaining tokens keep
/// matching against it.
fn advance_word(
    cursor: &mut AlignCursor,
    line_words: &[Vec<&str>],
    finished: &mut Vec<LineTokens>,
    current: &mut LineTokens,
) {
    if cursor.word_idx + 1 < line_words[cursor.line_idx].len() {
        cursor.word_idx += 1;
    } else if cursor.line_idx + 1 < line_words.len() {
        cursor.line_idx += 1;
        cursor.word_idx = 0;
        if current.tokens.is_empty() {
            current.line_idx = cursor.line_idx;
        } else {
            let next = LineTokens {
                line_idx: cursor.line_idx,
                tokens: Vec::new(),
            };
            finished.push(std::mem::replace(current, next));
        }
    }
    cursor.word_sub = 0;
}

/// Build the LINE and WORD blocks for the grouped tokens.
///
/// Per line, in order: the LINE block takes the next local index and the
/// space-joined word list of its source line; each token then becomes a
/// WORD block with its own normalized geometry and a parent index pointing
/// at the LINE. The LINE geometry is extended over every child in order.
fn build_blocks(
    line_words: &[Vec<&str>],
    tokens: &[WordToken],
    grouped: &[LineTokens],
    page_number: u32,
    page_width: f64,
    page_height: f64,
    ids: &mut dyn IdGenerator,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut index = 0usize;

    for group in grouped {
        let line_index = index;
        let line_text = line_words[group.line_idx].join(" ");
        let mut line = Block::new(ids.next_id(), BlockType::Line, line_text, page_number, line_index);
        index += 1;

        let mut child_ids = Vec::with_capacity(group.tokens.len());
        let mut words = Vec::with_capacity(group.tokens.len());
        for &token_idx in &group.tokens {
            let token = &tokens[token_idx];
            let geometry = token_geometry(token, page_width, page_height);
            line.extend_geometry(&geometry);
            let word = Block::new(
                ids.next_id(),
                BlockType::Word,
                token.text.clone(),
                page_number,
                index,
            )
            .with_geometry(geometry)
            .with_parent(line_index);
            index += 1;
            child_ids.push(word.id.clone());
            words.push(word);
        }

        line.relationships.push(Relationship::child(child_ids));
        blocks.push(line);
        blocks.append(&mut words);
    }

    blocks
}

/// Normalize a token's pixel geometry by the page dimensions.
fn token_geometry(token: &WordToken, page_width: f64, page_height: f64) -> Geometry {
    Geometry::new(BoundingBox::new(
        token.x0 / page_width,
        token.top / page_height,
        (token.x0 - token.x1).abs() / page_width,
        (token.top - token.bottom).abs() / page_height,
    ))
}

/// Byte-offset tail of `s`. Offsets come from length arithmetic over two
/// independently tokenized streams, so an offset past the end or off a
/// character boundary yields an empty remainder instead of panicking.
fn tail(s: &str, from: usize) -> &str {
    s.get(from..).unwrap_or("")
}

/// Byte-offset head of `s`, clamped to the whole string when the offset is
/// past the end or off a character boundary.
fn head(s: &str, to: usize) -> &str {
    s.get(..to).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SequentialIdGenerator;

    fn token(text: &str, x0: f64, x1: f64, top: f64, bottom: f64) -> WordToken {
        WordToken::new(text, x0, x1, top, bottom)
    }

    fn align(text: &str, tokens: &[WordToken]) -> Vec<Block> {
        let mut ids = SequentialIdGenerator::default();
        align_page(text, tokens, 1, 100.0, 100.0, &mut ids)
    }

    fn texts(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn test_exact_match_single_line() {
        let tokens = [
            token("Hello", 10.0, 40.0, 20.0, 30.0),
            token("world", 50.0, 80.0, 20.0, 30.0),
        ];
        let blocks = align("Hello world", &tokens);

        assert_eq!(texts(&blocks), ["Hello world", "Hello", "world"]);
        assert_eq!(blocks[0].block_type, BlockType::Line);
        assert_eq!(blocks[1].block_type, BlockType::Word);
        assert_eq!(blocks[1].meta.parent_index, Some(0));
        assert_eq!(blocks[2].meta.parent_index, Some(0));
        assert_eq!(
            blocks[0].relationships[0].ids,
            vec![blocks[1].id.clone(), blocks[2].id.clone()]
        );
    }

    #[test]
    fn test_single_word_line_parent_linkage() {
        let tokens = [token("Solo", 10.0, 30.0, 10.0, 20.0)];
        let blocks = align("Solo", &tokens);

        assert_eq!(blocks.len(), 2);
        let line = &blocks[0];
        let word = &blocks[1];
        assert_eq!(word.meta.parent_index, Some(line.meta.index));
        assert_eq!(line.relationships.len(), 1);
        assert_eq!(line.relationships[0].ids, vec![word.id.clone()]);
    }

    #[test]
    fn test_token_is_fragment_of_line_word() {
        // The token stream split "twopart" into two fragments; both belong
        // to the same line and line word.
        let tokens = [
            token("two", 10.0, 25.0, 10.0, 20.0),
            token("part", 25.0, 45.0, 10.0, 20.0),
        ];
        let blocks = align("twopart", &tokens);

        assert_eq!(texts(&blocks), ["twopart", "two", "part"]);
        assert_eq!(blocks[1].meta.parent_index, Some(0));
        assert_eq!(blocks[2].meta.parent_index, Some(0));
    }

    #[test]
    fn test_line_word_is_fragment_of_token() {
        // The text extraction split what the token stream kept whole.
        let tokens = [token("ab", 10.0, 30.0, 10.0, 20.0)];
        let blocks = align("a b", &tokens);

        assert_eq!(texts(&blocks), ["a b", "ab"]);
        assert_eq!(blocks[0].block_type, BlockType::Line);
        assert_eq!(blocks[1].meta.parent_index, Some(0));
    }

    #[test]
    fn test_multi_line_grouping() {
        let tokens = [
            token("first", 10.0, 30.0, 10.0, 20.0),
            token("line", 35.0, 50.0, 10.0, 20.0),
            token("second", 10.0, 40.0, 30.0, 40.0),
        ];
        let blocks = align("first line\nsecond", &tokens);

        assert_eq!(texts(&blocks), ["first line", "first", "line", "second", "second"]);
        // Second LINE sits after the first line's words; its WORD points at it.
        assert_eq!(blocks[3].block_type, BlockType::Line);
        assert_eq!(blocks[3].meta.index, 3);
        assert_eq!(blocks[4].meta.parent_index, Some(3));
    }

    #[test]
    fn test_line_geometry_is_union_of_children() {
        let tokens = [
            token("Hello", 10.0, 40.0, 40.0, 90.0),
            token("world", 60.0, 100.0, 40.0, 90.0),
        ];
        let blocks = align("Hello world", &tokens);

        let line_box = blocks[0].geometry.as_ref().unwrap().bounding_box;
        let a = blocks[1].geometry.as_ref().unwrap().bounding_box;
        let b = blocks[2].geometry.as_ref().unwrap().bounding_box;
        assert_eq!(line_box, a.union(&b));
    }

    #[test]
    fn test_empty_text_yields_no_blocks() {
        let tokens = [token("stray", 10.0, 30.0, 10.0, 20.0)];
        assert!(align("", &tokens).is_empty());
        assert!(align("   \n  \n", &tokens).is_empty());
    }

    #[test]
    fn test_no_tokens_yields_no_blocks() {
        assert!(align("some text", &[]).is_empty());
    }

    #[test]
    fn test_trailing_line_without_tokens_is_dropped() {
        let tokens = [token("only", 10.0, 30.0, 10.0, 20.0)];
        let blocks = align("only\nnever matched", &tokens);

        assert_eq!(texts(&blocks), ["only", "only"]);
    }

    #[test]
    fn test_token_spanning_multiple_line_words() {
        // One token covering three line words; the next token aligns to the
        // following line normally.
        let tokens = [
            token("abc", 10.0, 40.0, 10.0, 20.0),
            token("next", 10.0, 40.0, 30.0, 40.0),
        ];
        let blocks = align("a b c\nnext", &tokens);

        assert_eq!(texts(&blocks), ["a b c", "abc", "next", "next"]);
        assert_eq!(blocks[2].block_type, BlockType::Line);
        assert_eq!(blocks[3].meta.parent_index, Some(2));
    }

    #[test]
    fn test_extra_tokens_stick_to_last_line() {
        // More tokens than line words: the cursor stays on the last word
        // and the surplus tokens accumulate on the final line.
        let tokens = [
            token("word", 10.0, 30.0, 10.0, 20.0),
            token("word", 35.0, 55.0, 10.0, 20.0),
        ];
        let blocks = align("word", &tokens);

        assert_eq!(texts(&blocks), ["word", "word", "word"]);
        assert_eq!(blocks[0].relationships[0].ids.len(), 2);
    }

    #[test]
    fn test_word_geometry_normalization() {
        let tokens = [token("Hi", 10.0, 30.0, 40.0, 90.0)];
        let blocks = align("Hi", &tokens);

        let bbox = blocks[1].geometry.as_ref().unwrap().bounding_box;
        assert!((bbox.left - 0.1).abs() < 1e-9);
        assert!((bbox.top - 0.4).abs() < 1e-9);
        assert!((bbox.width - 0.2).abs() < 1e-9);
        assert!((bbox.height - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_ids_in_output_order() {
        let tokens = [
            token("Hello", 10.0, 40.0, 20.0, 30.0),
            token("world", 50.0, 80.0, 20.0, 30.0),
        ];
        let blocks = align("Hello world", &tokens);
        let ids: Vec<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["block-0", "block-1", "block-2"]);
    }
}
