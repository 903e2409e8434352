//! Field tokenizer for list-valued CSV cells
//!
//! Cells such as `[Infantry, Projectile, Red Cap]` or
//! `Dispel (BLK, BLK), Scout` hold several tokens. Commas inside
//! parentheses belong to the token they appear in.

/// Split a list-valued field into trimmed, non-empty tokens
pub fn parse_field(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let inner = strip_brackets(trimmed);

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;

    for ch in inner.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                // A stray ')' never takes depth below zero
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                push_token(&mut tokens, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_token(&mut tokens, &current);

    tokens
}

/// Join tokens back into a single field value
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Remove one enclosing `[...]` pair, if the whole value is wrapped in it
///
/// The `]` that closes the leading `[` must be the last character, so
/// `[A], [B]` is left alone.
fn strip_brackets(s: &str) -> &str {
    if !s.starts_with('[') {
        return s;
    }

    let mut depth: usize = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return if i == s.len() - 1 { &s[1..i] } else { s };
                }
            }
            _ => {}
        }
    }
    s
}

fn push_token(tokens: &mut Vec<String>, segment: &str) {
    let token = segment.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
}
