//! Query operator parsing (spec.md §4.4 "Operator parsing").

use codelens_domain::value_objects::{ParsedQuery, QueryOperator};

/// Parse `op:value` / `op:"quoted value"` tokens off the first logical line of
/// `raw_query`. Unknown operators are ignored; duplicates accumulate in
/// encounter order. The remainder (or the whole string, if the first line has
/// no recognized operator) becomes the semantic query.
pub fn parse_query(raw_query: &str) -> ParsedQuery {
    let mut lines = raw_query.splitn(2, '\n');
    let first_line = lines.next().unwrap_or("");
    let rest = lines.next();

    let (operators, leftover) = parse_operator_tokens(first_line);

    if operators.is_empty() {
        return ParsedQuery {
            semantic_query: raw_query.trim().to_string(),
            operators: Vec::new(),
        };
    }

    let mut semantic_query = leftover;
    if let Some(rest) = rest {
        if !semantic_query.is_empty() {
            semantic_query.push('\n');
        }
        semantic_query.push_str(rest);
    }

    ParsedQuery {
        semantic_query: semantic_query.trim().to_string(),
        operators,
    }
}

fn parse_operator_tokens(line: &str) -> (Vec<QueryOperator>, String) {
    let mut operators = Vec::new();
    let mut leftover_tokens = Vec::new();

    let push_token = |token: &str, operators: &mut Vec<QueryOperator>, leftover: &mut Vec<String>| {
        if let Some((op, value)) = split_operator(token) {
            match op {
                "lang" => operators.push(QueryOperator::Lang(value)),
                "path" => operators.push(QueryOperator::Path(value)),
                "must" => operators.push(QueryOperator::Must(value)),
                "exclude" => operators.push(QueryOperator::Exclude(value)),
                _ => leftover.push(token.to_string()),
            }
        } else if !token.is_empty() {
            leftover.push(token.to_string());
        }
    };

    // Tokenize on whitespace, but keep `op:"quoted value"` spans intact.
    let bytes: Vec<char> = line.chars().collect();
    let mut i = 0usize;
    let mut buf = String::new();
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_whitespace() {
            if !buf.is_empty() {
                push_token(&buf, &mut operators, &mut leftover_tokens);
                buf.clear();
            }
            i += 1;
            continue;
        }
        if c == '"' && buf.ends_with(':') {
            // consume quoted value
            buf.push(c);
            i += 1;
            while i < bytes.len() && bytes[i] != '"' {
                buf.push(bytes[i]);
                i += 1;
            }
            if i < bytes.len() {
                buf.push('"');
                i += 1;
            }
            continue;
        }
        buf.push(c);
        i += 1;
    }
    if !buf.is_empty() {
        push_token(&buf, &mut operators, &mut leftover_tokens);
    }

    (operators, leftover_tokens.join(" "))
}

fn split_operator(token: &str) -> Option<(&str, String)> {
    let (op, value) = token.split_once(':')?;
    if op.is_empty() || !op.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let value = value.trim();
    let unquoted = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    if unquoted.is_empty() {
        return None;
    }
    Some((op, unquoted.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_query_has_no_operators() {
        let parsed = parse_query("find the retry loop");
        assert!(parsed.operators.is_empty());
        assert_eq!(parsed.semantic_query, "find the retry loop");
    }

    #[test]
    fn operators_stripped_from_first_line() {
        let parsed = parse_query("lang:rust must:retry exclude:tests/**\nfind the retry loop");
        assert_eq!(parsed.lang_filters(), vec!["rust"]);
        assert_eq!(parsed.must_tokens(), vec!["retry"]);
        assert_eq!(parsed.exclude_globs(), vec!["tests/**"]);
        assert_eq!(parsed.semantic_query, "find the retry loop");
    }

    #[test]
    fn quoted_values_keep_spaces() {
        let parsed = parse_query(r#"path:"src/my dir/**" retry logic"#);
        assert_eq!(parsed.path_filters(), vec!["src/my dir/**"]);
        assert_eq!(parsed.semantic_query, "retry logic");
    }

    #[test]
    fn unknown_operator_is_ignored_and_kept_in_query() {
        let parsed = parse_query("foo:bar retry logic");
        assert!(parsed.operators.is_empty());
        assert_eq!(parsed.semantic_query, "foo:bar retry logic");
    }

    #[test]
    fn duplicate_operators_accumulate() {
        let parsed = parse_query("must:a must:b query");
        assert_eq!(parsed.must_tokens(), vec!["a", "b"]);
    }
}
