//! Helpers over flat token lists.
//!
//! BEGIN/END pairing is never stored as links between tokens. It is
//! recovered from `component_token_count`: the END partner of the BEGIN
//! token at `i` sits at `i + count - 1`.

use crate::enums::Signal;
use crate::error::TypeError;
use crate::token::Token;

/// Fill in `component_token_count` for every token by pairing BEGIN and
/// END signals with a stack. Leaves get 1.
///
/// # Errors
///
/// [`TypeError::UnbalancedTokens`] if an END does not close the most
/// recent BEGIN, or a BEGIN is never closed.
pub fn compute_component_token_counts(tokens: &mut [Token]) -> Result<(), TypeError> {
    let mut open: Vec<usize> = Vec::new();

    for i in 0..tokens.len() {
        let signal = tokens[i].signal;
        if signal.is_begin() {
            open.push(i);
        } else if signal.is_end() {
            let begin = open.pop().ok_or(TypeError::UnbalancedTokens {
                index: i,
                reason: "END without BEGIN",
            })?;
            if tokens[begin].signal.matching_end() != Some(signal) {
                return Err(TypeError::UnbalancedTokens {
                    index: i,
                    reason: "END does not match innermost BEGIN",
                });
            }
            let count = count_between(begin, i)?;
            tokens[begin].component_token_count = count;
            tokens[i].component_token_count = count;
        } else {
            tokens[i].component_token_count = 1;
        }
    }

    match open.pop() {
        Some(index) => Err(TypeError::UnbalancedTokens {
            index,
            reason: "BEGIN never closed",
        }),
        None => Ok(()),
    }
}

/// Verify pairing and that every stored `component_token_count` agrees
/// with it. Used on token lists that arrive from outside the generator.
///
/// # Errors
///
/// [`TypeError::UnbalancedTokens`] naming the first offending index.
pub fn check_balanced(tokens: &[Token]) -> Result<(), TypeError> {
    let mut expected = tokens.to_vec();
    compute_component_token_counts(&mut expected)?;
    match tokens
        .iter()
        .zip(&expected)
        .position(|(a, b)| a.component_token_count != b.component_token_count)
    {
        Some(index) => Err(TypeError::UnbalancedTokens {
            index,
            reason: "component token count disagrees with nesting",
        }),
        None => Ok(()),
    }
}

/// Index of the END token that closes the BEGIN token at `begin`, or
/// `begin` itself for leaves.
///
/// Assumes the list has passed [`check_balanced`]; callers decoding
/// untrusted IR must check first.
pub fn end_index(tokens: &[Token], begin: usize) -> usize {
    let count = usize::try_from(tokens[begin].component_token_count).unwrap_or(1);
    begin + count.max(1) - 1
}

/// Iterate the direct children of the BEGIN token at `begin`, yielding
/// the index of each child's first token.
pub fn children(tokens: &[Token], begin: usize) -> impl Iterator<Item = usize> + '_ {
    let end = end_index(tokens, begin);
    let mut next = begin + 1;
    std::iter::from_fn(move || {
        if next >= end {
            return None;
        }
        let current = next;
        next = end_index(tokens, current) + 1;
        Some(current)
    })
}

/// Find a direct child of the composite at `begin` by name and signal.
pub fn find_child(tokens: &[Token], begin: usize, signal: Signal, name: &str) -> Option<usize> {
    children(tokens, begin).find(|&i| tokens[i].signal == signal && tokens[i].name == name)
}

/// Render a token list one token per line, indented two spaces per
/// level of BEGIN/END nesting.
///
/// ```text
/// BEGIN_MESSAGE name=Car id=1 ...
///   BEGIN_FIELD name=serialNumber id=1 ...
///     ENCODING name=uint64 ...
///   END_FIELD name=serialNumber ...
/// END_MESSAGE name=Car ...
/// ```
pub fn dump(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for token in tokens {
        if token.signal.is_end() {
            depth = depth.saturating_sub(1);
        }
        out.push_str(&"  ".repeat(depth));
        out.push_str(&token.to_string());
        out.push('\n');
        if token.signal.is_begin() {
            depth += 1;
        }
    }
    out
}

fn count_between(begin: usize, end: usize) -> Result<i32, TypeError> {
    i32::try_from(end - begin + 1).map_err(|_| TypeError::UnbalancedTokens {
        index: end,
        reason: "region too large",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(signal: Signal, name: &str) -> Token {
        Token::builder(signal, name).build()
    }

    fn group_list() -> Vec<Token> {
        vec![
            t(Signal::BeginMessage, "m"),
            t(Signal::BeginGroup, "g"),
            t(Signal::BeginComposite, "dim"),
            t(Signal::Encoding, "blockLength"),
            t(Signal::Encoding, "numInGroup"),
            t(Signal::EndComposite, "dim"),
            t(Signal::EndGroup, "g"),
            t(Signal::EndMessage, "m"),
        ]
    }

    #[test]
    fn counts_span_to_matching_end() {
        let mut tokens = group_list();
        compute_component_token_counts(&mut tokens).unwrap();
        let counts: Vec<i32> = tokens.iter().map(|t| t.component_token_count).collect();
        assert_eq!(counts, vec![8, 6, 4, 1, 1, 4, 6, 8]);
        assert_eq!(end_index(&tokens, 1), 6);
    }

    #[test]
    fn mismatched_end_rejected() {
        let mut tokens = vec![t(Signal::BeginGroup, "g"), t(Signal::EndComposite, "g")];
        assert!(matches!(
            compute_component_token_counts(&mut tokens),
            Err(TypeError::UnbalancedTokens { index: 1, .. })
        ));
    }

    #[test]
    fn unclosed_begin_rejected() {
        let mut tokens = vec![t(Signal::BeginMessage, "m"), t(Signal::BeginField, "f")];
        assert!(matches!(
            compute_component_token_counts(&mut tokens),
            Err(TypeError::UnbalancedTokens { index: 1, .. })
        ));
    }

    #[test]
    fn stale_counts_detected() {
        let mut tokens = group_list();
        compute_component_token_counts(&mut tokens).unwrap();
        tokens[2].component_token_count = 2;
        assert!(matches!(
            check_balanced(&tokens),
            Err(TypeError::UnbalancedTokens { index: 2, .. })
        ));
    }

    #[test]
    fn children_skip_nested_regions() {
        let mut tokens = group_list();
        compute_component_token_counts(&mut tokens).unwrap();
        let kids: Vec<usize> = children(&tokens, 1).collect();
        assert_eq!(kids, vec![2]);
        assert_eq!(find_child(&tokens, 2, Signal::Encoding, "numInGroup"), Some(4));
        assert_eq!(find_child(&tokens, 2, Signal::Encoding, "missing"), None);
    }

    #[test]
    fn dump_indents_by_nesting() {
        let mut tokens = group_list();
        compute_component_token_counts(&mut tokens).unwrap();
        let text = dump(&tokens);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("BEGIN_MESSAGE name=m"));
        assert!(lines[3].starts_with("      ENCODING name=blockLength"));
        assert!(lines[6].starts_with("  END_GROUP name=g"));
        assert!(lines[7].starts_with("END_MESSAGE"));
    }
}
