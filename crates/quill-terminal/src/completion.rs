//! Prefix completion over the command tree.

use crate::tree::CommandTree;

/// Outcome of a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    NoMatch,
    /// Exactly one candidate; carries its full name.
    SingleMatch(String),
    /// Several candidates in tree order, with their longest common prefix.
    MultipleMatches {
        names: Vec<String>,
        common_prefix: String,
    },
}

/// Complete the last of `tokens` against the tree.
///
/// Every token before the last descends into the first child whose name
/// starts with it, even when several siblings match. The last token (empty
/// when the cursor follows a space) is matched against the children of the
/// node reached.
pub fn complete(tree: &CommandTree, tokens: &[String]) -> CompletionResult {
    let Some((last, path)) = tokens.split_last() else {
        return CompletionResult::NoMatch;
    };

    let mut node = tree.root();
    for token in path {
        let next = tree
            .children(node)
            .iter()
            .copied()
            .find(|&c| tree.name(c).starts_with(token.as_str()));
        match next {
            Some(child) => node = child,
            None => return CompletionResult::NoMatch,
        }
    }

    let names: Vec<String> = tree
        .children(node)
        .iter()
        .map(|&c| tree.name(c))
        .filter(|name| name.starts_with(last.as_str()))
        .map(str::to_string)
        .collect();

    match names.len() {
        0 => CompletionResult::NoMatch,
        1 => CompletionResult::SingleMatch(names.into_iter().next().unwrap_or_default()),
        _ => {
            let common_prefix = lcp(&names);
            CompletionResult::MultipleMatches {
                names,
                common_prefix,
            }
        },
    }
}

/// Longest common prefix of `strings`, compared character by character.
pub fn lcp<S: AsRef<str>>(strings: &[S]) -> String {
    let Some((first, rest)) = strings.split_first() else {
        return String::new();
    };
    let mut prefix: Vec<char> = first.as_ref().chars().collect();
    for s in rest {
        let shared = prefix
            .iter()
            .zip(s.as_ref().chars())
            .take_while(|(a, b)| **a == *b)
            .count();
        prefix.truncate(shared);
        if prefix.is_empty() {
            break;
        }
    }
    prefix.into_iter().collect()
}
